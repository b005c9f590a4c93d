use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{AudioCue, SilentCue};
use crate::catalog::{Catalog, ChordRecord};
use crate::clock::{Clock, Countdown, SystemClock};
use crate::error::SessionError;
use crate::selector;
use crate::session::{Action, Phase, SessionState, Snapshot, TickToken, Transition};
use crate::settings::{ModeSettings, Settings, SettingsUpdate};

/// How long a revealed chord sounds in beginner mode
pub const BEGINNER_CUE: Duration = Duration::from_secs(2);

/// Owns the practice session and applies every transition to it.
///
/// Actions are total: anything illegal in the current phase or mode is
/// reported as [`Transition::Ignored`] and leaves the state untouched. Audio
/// is fire-and-forget and is only ever triggered by the chord-change
/// sequence moving forward.
pub struct SessionEngine<A: AudioCue = SilentCue, C: Clock = SystemClock> {
    catalog: Arc<Catalog>,
    settings: Settings,
    state: SessionState,
    countdown: Countdown,
    timer_epoch: u64,
    cued_sequence: u64,
    notice: Option<SessionError>,
    cue: A,
    clock: C,
    rng: StdRng,
}

impl<A: AudioCue, C: Clock> SessionEngine<A, C> {
    pub fn new(catalog: Arc<Catalog>, settings: Settings, cue: A, clock: C) -> Self {
        Self {
            catalog,
            settings,
            state: SessionState::default(),
            countdown: Countdown::Inactive,
            timer_epoch: 0,
            cued_sequence: 0,
            notice: None,
            cue,
            clock,
            rng: StdRng::from_entropy(),
        }
    }

    /// Makes chord picks reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cue(&self) -> &A {
        &self.cue
    }

    pub fn snapshot(&self) -> Snapshot {
        let mode = self.settings.mode();
        let active = self.state.phase.is_active();

        Snapshot {
            phase: self.state.phase,
            current_chord: self.state.current_chord.clone(),
            time_remaining_secs: self.state.time_remaining_secs,
            is_revealed: self.state.is_revealed,
            chord_change_sequence: self.state.chord_change_sequence,
            should_show_timer: matches!(mode, ModeSettings::Speed(_)),
            should_highlight_keyboard: active
                && match mode {
                    ModeSettings::Speed(speed) => speed.show_on_keyboard,
                    ModeSettings::Beginner(_) => self.state.is_revealed,
                },
            notice: self.notice.clone(),
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Transition {
        match action {
            Action::Start => self.start(),
            Action::Pause => self.pause(),
            Action::Stop => self.stop(),
            Action::Reveal => self.reveal(),
            Action::Next => self.next(),
            Action::Update(update) => self.update_settings(update),
        }
    }

    pub fn start(&mut self) -> Transition {
        if self.state.phase != Phase::Idle {
            return Transition::Ignored;
        }
        self.notice = None;

        if self.settings.sound_enabled {
            if let Err(err) = self.cue.preload() {
                warn!("audio preload failed, continuing without sound: {err}");
            }
        }

        let Some(chord) = self.pick(None) else {
            return self.exhaust();
        };

        let now = self.clock.now();
        self.state.phase = Phase::Running;
        self.rearm_timer();
        self.load_chord(chord, now);
        self.bump_sequence();
        debug!(
            "session started in {} mode with {}",
            self.settings.game_mode,
            self.current_id()
        );
        self.sync_audio();
        Transition::Applied
    }

    /// Toggles between running and paused. Speed mode only.
    pub fn pause(&mut self) -> Transition {
        if !matches!(self.settings.mode(), ModeSettings::Speed(_)) {
            return Transition::Ignored;
        }

        let now = self.clock.now();
        match self.state.phase {
            Phase::Running => {
                // silence first; the phase change must never precede it
                self.cue.stop_all();
                self.countdown.pause(now);
                self.state.time_remaining_secs = self.countdown.remaining(now).as_secs_f64();
                self.state.phase = Phase::Paused;
                self.rearm_timer();
                debug!("session paused");
                Transition::Applied
            }
            Phase::Paused => {
                self.countdown.resume(now);
                self.state.phase = Phase::Running;
                self.rearm_timer();
                debug!("session resumed");
                Transition::Applied
            }
            Phase::Idle => Transition::Ignored,
        }
    }

    pub fn stop(&mut self) -> Transition {
        if !self.state.phase.is_active() {
            return Transition::Ignored;
        }
        self.reset();
        debug!("session stopped");
        Transition::Applied
    }

    /// Shows the current chord. Beginner mode only; this is where the chord
    /// sounds when auto-reveal is off.
    pub fn reveal(&mut self) -> Transition {
        if self.state.phase != Phase::Running
            || !matches!(self.settings.mode(), ModeSettings::Beginner(_))
            || self.state.is_revealed
        {
            return Transition::Ignored;
        }

        self.state.is_revealed = true;
        self.bump_sequence();
        self.sync_audio();
        Transition::Applied
    }

    /// Deals the next chord. Beginner mode only.
    pub fn next(&mut self) -> Transition {
        let ModeSettings::Beginner(beginner) = self.settings.mode() else {
            return Transition::Ignored;
        };
        if self.state.phase != Phase::Running {
            return Transition::Ignored;
        }

        self.cue.stop_all();

        let previous = self.state.current_chord.clone();
        let Some(chord) = self.pick(previous.as_ref()) else {
            return self.exhaust();
        };

        let now = self.clock.now();
        self.load_chord(chord, now);
        if beginner.auto_reveal {
            self.bump_sequence();
        }
        trace!("dealt {}", self.current_id());
        self.sync_audio();
        Transition::Applied
    }

    /// Token for the timer that is currently armed, if any. `None` when the
    /// session is not running or is in beginner mode.
    pub fn tick_token(&self) -> Option<TickToken> {
        self.timer_active().then_some(TickToken {
            epoch: self.timer_epoch,
        })
    }

    /// Ticks the armed timer, if there is one
    pub fn on_tick(&mut self) -> Transition {
        match self.tick_token() {
            Some(token) => self.tick(token),
            None => Transition::Ignored,
        }
    }

    /// Advances the countdown for the timer identified by `token`. Ticks
    /// dispatched for a timer that has since been torn down are dropped.
    pub fn tick(&mut self, token: TickToken) -> Transition {
        if !self.timer_active() || token.epoch != self.timer_epoch {
            trace!("discarding stale tick for timer {}", token.epoch);
            return Transition::Ignored;
        }

        let now = self.clock.now();
        if !self.countdown.is_expired(now) {
            self.state.time_remaining_secs = self.countdown.remaining(now).as_secs_f64();
            return Transition::Applied;
        }

        let previous = self.state.current_chord.clone();
        let Some(chord) = self.pick(previous.as_ref()) else {
            return self.exhaust();
        };

        self.load_chord(chord, now);
        self.bump_sequence();
        trace!("countdown elapsed, advanced to {}", self.current_id());
        self.sync_audio();
        Transition::Applied
    }

    /// Applies a partial settings change. Changes to the countdown, filters
    /// or reveal behaviour take effect at the next chord; switching game
    /// mode ends an active session.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Transition {
        if update.is_empty() {
            return Transition::Ignored;
        }
        let reshapes = update.reshapes_session();
        let mut next = self.settings.clone();
        if !next.apply(update) {
            return Transition::Ignored;
        }

        if self.state.phase.is_active() {
            if next.game_mode != self.settings.game_mode {
                debug!("game mode changed mid-session, stopping");
                self.reset();
            } else if self.settings.sound_enabled && !next.sound_enabled {
                self.cue.stop_all();
            }
        }
        if reshapes {
            self.notice = None;
        }

        self.settings = next;
        Transition::Applied
    }

    fn pick(&mut self, previous: Option<&ChordRecord>) -> Option<ChordRecord> {
        selector::pick_next(&self.catalog, &self.settings, previous, &mut self.rng)
    }

    fn load_chord(&mut self, chord: ChordRecord, now: std::time::Instant) {
        self.state.current_chord = Some(chord);
        match self.settings.mode() {
            ModeSettings::Speed(speed) => {
                self.countdown = Countdown::start(now, speed.countdown());
                self.state.time_remaining_secs = speed.countdown().as_secs_f64();
                self.state.is_revealed = false;
            }
            ModeSettings::Beginner(beginner) => {
                self.countdown = Countdown::Inactive;
                self.state.time_remaining_secs = 0.0;
                self.state.is_revealed = beginner.auto_reveal;
            }
        }
    }

    fn exhaust(&mut self) -> Transition {
        warn!("no chords match the current settings");
        if self.state.phase.is_active() {
            self.reset();
        }
        self.notice = Some(SessionError::ExhaustedPool);
        Transition::Exhausted
    }

    fn reset(&mut self) {
        self.cue.stop_all();
        self.state = SessionState::default();
        self.countdown = Countdown::Inactive;
        self.cued_sequence = 0;
        self.rearm_timer();
    }

    fn bump_sequence(&mut self) {
        self.state.chord_change_sequence += 1;
    }

    /// Any previously issued tick token becomes stale
    fn rearm_timer(&mut self) {
        self.timer_epoch += 1;
    }

    fn timer_active(&self) -> bool {
        self.state.phase == Phase::Running
            && matches!(self.settings.mode(), ModeSettings::Speed(_))
    }

    /// Plays the current chord once per new chord-change sequence value
    fn sync_audio(&mut self) {
        let sequence = self.state.chord_change_sequence;
        if sequence == self.cued_sequence {
            return;
        }
        self.cued_sequence = sequence;

        if !self.settings.sound_enabled || self.state.phase != Phase::Running {
            return;
        }
        let duration = match self.settings.mode() {
            ModeSettings::Speed(speed) => speed.countdown(),
            ModeSettings::Beginner(_) if self.state.is_revealed => BEGINNER_CUE,
            ModeSettings::Beginner(_) => return,
        };
        let Some(chord) = &self.state.current_chord else {
            return;
        };

        self.cue.stop_all();
        if let Err(err) = self.cue.play(&chord.notes, duration) {
            warn!("audio cue failed, continuing silently: {err}");
        }
    }

    fn current_id(&self) -> &str {
        self.state
            .current_chord
            .as_ref()
            .map_or("no chord", |c| c.id.as_str())
    }
}
