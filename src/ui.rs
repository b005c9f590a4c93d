pub mod keyboard;

use itertools::{EitherOrBoth, Itertools};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use triads::{
    catalog::Catalog,
    selector::available_chords,
    settings::{GameMode, Language},
    ChordRecord, Phase, Snapshot,
};

use crate::{ui::keyboard::Keyboard, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

struct Labels {
    speed: &'static str,
    beginner: &'static str,
    paused: &'static str,
    start_hint: &'static str,
    reveal_hint: &'static str,
    no_chords: &'static str,
    sound_on: &'static str,
    sound_off: &'static str,
    pool: &'static str,
    help_idle: &'static str,
    help_speed: &'static str,
    help_beginner: &'static str,
}

fn labels(language: Language) -> &'static Labels {
    const EN: Labels = Labels {
        speed: "Speed practice",
        beginner: "Beginner learning",
        paused: "PAUSED",
        start_hint: "Press space to start",
        reveal_hint: "Press space to reveal",
        no_chords: "No chords match the current settings",
        sound_on: "sound on",
        sound_off: "sound off",
        pool: "chords",
        help_idle: "(space) start (m)ode (+/-) countdown (t)ypes (d)ifficulty (c)hosen chords (k)eys (a)udio (l)anguage (esc)ape",
        help_speed: "(space) pause/resume (s)top (k)eys (a)udio (l)anguage (esc)ape",
        help_beginner: "(r)eveal (n)ext (space) reveal then next (s)top (k) auto-reveal (a)udio (l)anguage (esc)ape",
    };
    const FR: Labels = Labels {
        speed: "Entraînement rapide",
        beginner: "Apprentissage débutant",
        paused: "EN PAUSE",
        start_hint: "Appuyez sur espace pour commencer",
        reveal_hint: "Appuyez sur espace pour révéler",
        no_chords: "Aucun accord ne correspond aux réglages",
        sound_on: "son activé",
        sound_off: "son coupé",
        pool: "accords",
        help_idle: "(espace) démarrer (m)ode (+/-) minuterie (t)ypes (d)ifficulté (c)hoix (k) clavier (a)udio (l)angue (échap)",
        help_speed: "(espace) pause/reprise (s)top (k) clavier (a)udio (l)angue (échap)",
        help_beginner: "(r)évéler (n)ext (espace) révéler puis suivant (s)top (k) auto (a)udio (l)angue (échap)",
    };
    match language {
        Language::En => &EN,
        Language::Fr => &FR,
    }
}

pub fn draw(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = &self.engine;
        let settings = engine.settings();
        let snapshot = engine.snapshot();
        let labels = labels(settings.language);

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(1),    // padding
                Constraint::Length(1), // chord name
                Constraint::Length(1), // notes and fingering
                Constraint::Length(1), // padding
                Constraint::Length(1), // countdown
                Constraint::Length(1), // padding
                Constraint::Length(6), // keyboard
                Constraint::Min(1),    // padding
                Constraint::Length(1), // notice
                Constraint::Length(2), // help
            ])
            .split(area);

        let pool = available_chords(engine.catalog(), settings).len();
        let mode = match settings.game_mode {
            GameMode::Speed => format!("{} · {}s", labels.speed, settings.speed.countdown_secs()),
            GameMode::Beginner => labels.beginner.to_string(),
        };
        let types = if settings.chord_types.is_empty() {
            "major+minor".to_string()
        } else {
            settings.chord_types.iter().join("+")
        };
        let sound = if settings.sound_enabled {
            labels.sound_on
        } else {
            labels.sound_off
        };
        Paragraph::new(Line::from(vec![
            Span::styled(mode, bold_style.fg(Color::Cyan)),
            Span::styled(
                format!(
                    "  {types} · {} · {sound} · {pool} {}",
                    settings.difficulty, labels.pool
                ),
                dim_style,
            ),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        render_chord(self, &snapshot, labels, chunks[2], chunks[3], buf);

        if snapshot.should_show_timer && snapshot.phase.is_active() {
            let total = f64::from(settings.speed.countdown_secs());
            let ratio = (snapshot.time_remaining_secs / total).clamp(0.0, 1.0);
            let label = match snapshot.phase {
                Phase::Paused => labels.paused.to_string(),
                _ => format!("{:.1}", snapshot.time_remaining_secs),
            };
            Gauge::default()
                .gauge_style(Style::default().fg(Color::Magenta))
                .ratio(ratio)
                .label(label)
                .render(chunks[5], buf);
        }

        let notes = match (&snapshot.current_chord, snapshot.should_highlight_keyboard) {
            (Some(chord), true) => chord.notes.as_slice(),
            _ => &[],
        };
        Keyboard::new(notes).render(chunks[7], buf);

        if snapshot.notice.is_some() {
            Paragraph::new(Span::styled(
                labels.no_chords,
                bold_style.fg(Color::Red),
            ))
            .alignment(Alignment::Center)
            .render(chunks[9], buf);
        }

        let help = match (snapshot.phase, settings.game_mode) {
            (Phase::Idle, _) => labels.help_idle,
            (_, GameMode::Speed) => labels.help_speed,
            (_, GameMode::Beginner) => labels.help_beginner,
        };
        Paragraph::new(Span::styled(help, italic_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[10], buf);
    }
}

fn render_chord(
    app: &App,
    snapshot: &Snapshot,
    labels: &Labels,
    name_area: Rect,
    detail_area: Rect,
    buf: &mut Buffer,
) {
    let catalog = app.engine.catalog();
    let language = app.engine.settings().language;

    let Some(chord) = &snapshot.current_chord else {
        Paragraph::new(Span::styled(
            labels.start_hint,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(name_area, buf);
        return;
    };

    let name_style = Style::default().add_modifier(Modifier::BOLD);
    let name_style = if snapshot.phase == Phase::Paused {
        name_style.add_modifier(Modifier::DIM)
    } else {
        name_style.fg(Color::Green)
    };
    Paragraph::new(Span::styled(catalog.display_name(chord, language), name_style))
        .alignment(Alignment::Center)
        .render(name_area, buf);

    let detail = if snapshot.should_highlight_keyboard {
        chord_detail(catalog, chord, language)
    } else if snapshot.phase == Phase::Running && !snapshot.is_revealed && !snapshot.should_show_timer {
        labels.reveal_hint.to_string()
    } else {
        String::new()
    };
    Paragraph::new(Span::styled(
        detail,
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(detail_area, buf);
}

/// Localized note names, each followed by its finger when one is given
fn chord_detail(catalog: &Catalog, chord: &ChordRecord, language: Language) -> String {
    chord
        .notes
        .iter()
        .zip_longest(chord.fingering.iter())
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(note, finger) => {
                Some(format!("{} ({finger})", catalog.note_label(note, language)))
            }
            EitherOrBoth::Left(note) => Some(catalog.note_label(note, language)),
            EitherOrBoth::Right(_) => None,
        })
        .join("  ")
}
