use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, trace};

use crate::error::AudioError;

/// Playback capability injected into the session engine.
///
/// Implementations own their sample loading and output device. `play` must
/// schedule the notes and return without waiting for them to finish;
/// `stop_all` must silence everything before it returns.
pub trait AudioCue {
    /// Best-effort warm-up. Safe to call repeatedly.
    fn preload(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self, notes: &[String], duration: Duration) -> Result<(), AudioError>;

    fn stop_all(&mut self);
}

/// Produces no sound; logs what would have been played.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn play(&mut self, notes: &[String], duration: Duration) -> Result<(), AudioError> {
        debug!("cue: {} for {:.1}s", notes.join(" "), duration.as_secs_f64());
        Ok(())
    }

    fn stop_all(&mut self) {
        trace!("cue: stop all");
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CueEvent {
    Preload,
    Play {
        notes: Vec<String>,
        duration: Duration,
    },
    StopAll,
}

/// Records every request for inspection in tests. Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct RecordingCue {
    events: Rc<RefCell<Vec<CueEvent>>>,
    unavailable: bool,
}

impl RecordingCue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose preload and play calls fail as if the platform
    /// refused audio output. Requests are still recorded.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<CueEvent> {
        self.events.borrow().clone()
    }

    pub fn plays(&self) -> Vec<Vec<String>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                CueEvent::Play { notes, .. } => Some(notes.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn play_count(&self) -> usize {
        self.plays().len()
    }

    pub fn stop_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, CueEvent::StopAll))
            .count()
    }

    pub fn last(&self) -> Option<CueEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl AudioCue for RecordingCue {
    fn preload(&mut self) -> Result<(), AudioError> {
        self.events.borrow_mut().push(CueEvent::Preload);
        if self.unavailable {
            return Err(AudioError::Unavailable("autoplay blocked".to_string()));
        }
        Ok(())
    }

    fn play(&mut self, notes: &[String], duration: Duration) -> Result<(), AudioError> {
        self.events.borrow_mut().push(CueEvent::Play {
            notes: notes.to_vec(),
            duration,
        });
        if self.unavailable {
            return Err(AudioError::Playback {
                notes: notes.join(" "),
                message: "no output device".to_string(),
            });
        }
        Ok(())
    }

    fn stop_all(&mut self) {
        self.events.borrow_mut().push(CueEvent::StopAll);
    }
}
