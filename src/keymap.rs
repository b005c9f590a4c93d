use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::catalog::ChordType;
use crate::session::{Action, Phase, Snapshot};
use crate::settings::{GameMode, SelectionMode, Settings, SettingsUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCommand {
    Session(Action),
    Quit,
}

/// Maps a key press to a command given what is on screen. Keys that reshape
/// the chord pool or the mode are only honoured while idle.
pub fn action_for(key: &KeyEvent, snapshot: &Snapshot, settings: &Settings) -> Option<KeyCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyCommand::Quit);
    }

    let idle = snapshot.phase == Phase::Idle;
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return Some(KeyCommand::Quit),
        KeyCode::Enter | KeyCode::Char(' ') => primary(snapshot, settings),
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Reveal,
        KeyCode::Char('n') => Action::Next,
        KeyCode::Char('s') | KeyCode::Backspace => Action::Stop,
        KeyCode::Char('a') => Action::Update(SettingsUpdate {
            sound_enabled: Some(!settings.sound_enabled),
            ..Default::default()
        }),
        KeyCode::Char('l') => Action::Update(SettingsUpdate {
            language: Some(settings.language.toggled()),
            ..Default::default()
        }),
        KeyCode::Char('k') => Action::Update(match settings.game_mode {
            GameMode::Speed => SettingsUpdate {
                show_on_keyboard: Some(!settings.speed.show_on_keyboard),
                ..Default::default()
            },
            GameMode::Beginner => SettingsUpdate {
                auto_reveal: Some(!settings.beginner.auto_reveal),
                ..Default::default()
            },
        }),
        KeyCode::Char('m') if idle => Action::Update(SettingsUpdate {
            game_mode: Some(settings.game_mode.toggled()),
            ..Default::default()
        }),
        KeyCode::Char('+') | KeyCode::Char('=') if idle => Action::Update(SettingsUpdate {
            countdown_secs: Some(settings.speed.countdown_secs().saturating_add(1)),
            ..Default::default()
        }),
        KeyCode::Char('-') if idle => Action::Update(SettingsUpdate {
            countdown_secs: Some(settings.speed.countdown_secs().saturating_sub(1)),
            ..Default::default()
        }),
        KeyCode::Char('t') if idle => Action::Update(SettingsUpdate {
            chord_types: Some(next_type_filter(&settings.chord_types)),
            ..Default::default()
        }),
        KeyCode::Char('d') if idle => Action::Update(SettingsUpdate {
            difficulty: Some(settings.difficulty.next()),
            ..Default::default()
        }),
        KeyCode::Char('c') if idle => Action::Update(SettingsUpdate {
            selection_mode: Some(match settings.selection_mode {
                SelectionMode::All => SelectionMode::Selected,
                SelectionMode::Selected => SelectionMode::All,
            }),
            ..Default::default()
        }),
        _ => return None,
    };

    Some(KeyCommand::Session(action))
}

fn primary(snapshot: &Snapshot, settings: &Settings) -> Action {
    match (snapshot.phase, settings.game_mode) {
        (Phase::Idle, _) => Action::Start,
        (_, GameMode::Speed) => Action::Pause,
        (_, GameMode::Beginner) if snapshot.is_revealed => Action::Next,
        (_, GameMode::Beginner) => Action::Reveal,
    }
}

/// both -> major -> minor -> both
fn next_type_filter(current: &BTreeSet<ChordType>) -> BTreeSet<ChordType> {
    let major = current.contains(&ChordType::Major);
    let minor = current.contains(&ChordType::Minor);
    let next: &[ChordType] = match (major, minor) {
        (true, true) | (false, false) => &[ChordType::Major],
        (true, false) => &[ChordType::Minor],
        (false, true) => &[ChordType::Major, ChordType::Minor],
    };
    next.iter().copied().collect()
}
