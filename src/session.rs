use crate::catalog::ChordRecord;
use crate::error::SessionError;
use crate::settings::SettingsUpdate;

/// Session lifecycle. Stopping returns to `Idle`; `Paused` only exists in
/// speed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
}

impl Phase {
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Running | Phase::Paused)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub phase: Phase,
    pub current_chord: Option<ChordRecord>,
    pub time_remaining_secs: f64,
    pub is_revealed: bool,
    /// bumped once per event that should sound the chord
    pub chord_change_sequence: u64,
}

/// Everything the presentation layer needs, captured in one piece so the
/// renderer and the audio trigger never observe a torn state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub current_chord: Option<ChordRecord>,
    pub time_remaining_secs: f64,
    pub is_revealed: bool,
    pub chord_change_sequence: u64,
    pub should_show_timer: bool,
    pub should_highlight_keyboard: bool,
    pub notice: Option<SessionError>,
}

/// What an action did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// not legal in the current phase or mode; nothing changed
    Ignored,
    /// no chord matched the settings; the session is idle with a notice
    Exhausted,
}

/// User-level actions accepted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Pause,
    Stop,
    Reveal,
    Next,
    Update(SettingsUpdate),
}

/// Identifies the timer a tick was scheduled for. A tick whose token no
/// longer matches the engine's timer is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    pub(crate) epoch: u64,
}
