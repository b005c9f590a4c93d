use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::catalog::{ChordType, DifficultyFilter};

pub const MIN_COUNTDOWN_SECS: u8 = 1;
pub const MAX_COUNTDOWN_SECS: u8 = 10;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Fr,
            Language::Fr => Language::En,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameMode {
    /// chords advance on a countdown
    #[default]
    Speed,
    /// the learner reveals and advances by hand
    Beginner,
}

impl GameMode {
    pub fn toggled(self) -> Self {
        match self {
            GameMode::Speed => GameMode::Beginner,
            GameMode::Beginner => GameMode::Speed,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    All,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedSettings {
    countdown_secs: u8,
    /// keep the chord highlighted on the keyboard while the countdown runs
    pub show_on_keyboard: bool,
}

impl SpeedSettings {
    pub fn new(countdown_secs: u8, show_on_keyboard: bool) -> Self {
        Self {
            countdown_secs: clamp_countdown(countdown_secs),
            show_on_keyboard,
        }
    }

    pub fn countdown_secs(&self) -> u8 {
        self.countdown_secs
    }

    pub fn countdown(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.countdown_secs))
    }
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self::new(3, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BeginnerSettings {
    /// reveal each new chord as soon as it is dealt
    pub auto_reveal: bool,
}

/// The configuration of the active game mode, tagged so callers never have to
/// remember which mode a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSettings {
    Speed(SpeedSettings),
    Beginner(BeginnerSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub language: Language,
    pub game_mode: GameMode,
    pub speed: SpeedSettings,
    pub beginner: BeginnerSettings,
    pub sound_enabled: bool,
    /// empty means every chord type is allowed
    pub chord_types: BTreeSet<ChordType>,
    pub difficulty: DifficultyFilter,
    pub selection_mode: SelectionMode,
    pub selected_chord_ids: BTreeSet<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            game_mode: GameMode::default(),
            speed: SpeedSettings::default(),
            beginner: BeginnerSettings::default(),
            sound_enabled: true,
            chord_types: [ChordType::Major, ChordType::Minor].into_iter().collect(),
            difficulty: DifficultyFilter::All,
            selection_mode: SelectionMode::All,
            selected_chord_ids: BTreeSet::new(),
        }
    }
}

impl Settings {
    pub fn mode(&self) -> ModeSettings {
        match self.game_mode {
            GameMode::Speed => ModeSettings::Speed(self.speed),
            GameMode::Beginner => ModeSettings::Beginner(self.beginner),
        }
    }

    /// Applies a partial update, returning whether any field changed.
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        let before = self.clone();

        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(game_mode) = update.game_mode {
            self.game_mode = game_mode;
        }
        if let Some(secs) = update.countdown_secs {
            self.speed.countdown_secs = clamp_countdown(secs);
        }
        if let Some(show) = update.show_on_keyboard {
            self.speed.show_on_keyboard = show;
        }
        if let Some(auto_reveal) = update.auto_reveal {
            self.beginner.auto_reveal = auto_reveal;
        }
        if let Some(sound) = update.sound_enabled {
            self.sound_enabled = sound;
        }
        if let Some(types) = update.chord_types {
            self.chord_types = types;
        }
        if let Some(difficulty) = update.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(selection_mode) = update.selection_mode {
            self.selection_mode = selection_mode;
        }
        if let Some(ids) = update.selected_chord_ids {
            self.selected_chord_ids = ids;
        }

        *self != before
    }
}

/// Partial settings change; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub language: Option<Language>,
    pub game_mode: Option<GameMode>,
    pub countdown_secs: Option<u8>,
    pub show_on_keyboard: Option<bool>,
    pub auto_reveal: Option<bool>,
    pub sound_enabled: Option<bool>,
    pub chord_types: Option<BTreeSet<ChordType>>,
    pub difficulty: Option<DifficultyFilter>,
    pub selection_mode: Option<SelectionMode>,
    pub selected_chord_ids: Option<BTreeSet<String>>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the update touches anything that changes how a session runs,
    /// as opposed to display or sound preferences.
    pub fn reshapes_session(&self) -> bool {
        self.game_mode.is_some()
            || self.chord_types.is_some()
            || self.difficulty.is_some()
            || self.selection_mode.is_some()
            || self.selected_chord_ids.is_some()
    }
}

fn clamp_countdown(secs: u8) -> u8 {
    secs.clamp(MIN_COUNTDOWN_SECS, MAX_COUNTDOWN_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert_eq!(settings.game_mode, GameMode::Speed);
        assert_eq!(settings.speed.countdown_secs(), 3);
        assert!(settings.sound_enabled);
        assert_eq!(settings.chord_types.len(), 2);
        assert_eq!(settings.difficulty, DifficultyFilter::All);
        assert_eq!(settings.selection_mode, SelectionMode::All);
    }

    #[test]
    fn test_mode_is_tagged_by_game_mode() {
        let mut settings = Settings::default();
        settings.speed.show_on_keyboard = false;
        settings.beginner.auto_reveal = true;

        assert_eq!(
            settings.mode(),
            ModeSettings::Speed(SpeedSettings::new(3, false))
        );

        settings.game_mode = GameMode::Beginner;
        assert_eq!(
            settings.mode(),
            ModeSettings::Beginner(BeginnerSettings { auto_reveal: true })
        );
    }

    #[test]
    fn test_countdown_is_clamped() {
        assert_eq!(SpeedSettings::new(0, true).countdown_secs(), 1);
        assert_eq!(SpeedSettings::new(42, true).countdown_secs(), 10);

        let mut settings = Settings::default();
        settings.apply(SettingsUpdate {
            countdown_secs: Some(200),
            ..Default::default()
        });
        assert_eq!(settings.speed.countdown_secs(), MAX_COUNTDOWN_SECS);
    }

    #[test]
    fn test_apply_reports_change() {
        let mut settings = Settings::default();

        let changed = settings.apply(SettingsUpdate {
            game_mode: Some(GameMode::Beginner),
            auto_reveal: Some(true),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(settings.game_mode, GameMode::Beginner);
        assert!(settings.beginner.auto_reveal);
    }

    #[test]
    fn test_apply_same_values_is_idempotent() {
        let mut settings = Settings::default();
        let before = settings.clone();

        let changed = settings.apply(SettingsUpdate {
            language: Some(Language::En),
            countdown_secs: Some(3),
            sound_enabled: Some(true),
            ..Default::default()
        });

        assert!(!changed);
        assert_eq!(settings, before);
    }

    #[test]
    fn test_update_classification() {
        assert!(SettingsUpdate::default().is_empty());

        let display_only = SettingsUpdate {
            language: Some(Language::Fr),
            sound_enabled: Some(false),
            ..Default::default()
        };
        assert!(!display_only.is_empty());
        assert!(!display_only.reshapes_session());

        let filter = SettingsUpdate {
            difficulty: Some(DifficultyFilter::Advanced),
            ..Default::default()
        };
        assert!(filter.reshapes_session());
    }

    #[test]
    fn test_enum_display_and_toggle() {
        assert_eq!(Language::Fr.to_string(), "fr");
        assert_eq!(GameMode::Beginner.to_string(), "beginner");
        assert_eq!(SelectionMode::Selected.to_string(), "selected");
        assert_eq!(Language::En.toggled(), Language::Fr);
        assert_eq!(GameMode::Speed.toggled(), GameMode::Beginner);
    }
}
