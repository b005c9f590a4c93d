use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time for the countdown
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-advanced clock for tests. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Deadline-based countdown. Remaining time is always derived from the
/// deadline, so late or skipped ticks never accumulate drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Countdown {
    #[default]
    Inactive,
    Running {
        deadline: Instant,
    },
    Paused {
        remaining: Duration,
    },
}

impl Countdown {
    pub fn start(now: Instant, duration: Duration) -> Self {
        Countdown::Running {
            deadline: now + duration,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match *self {
            Countdown::Inactive => Duration::ZERO,
            Countdown::Running { deadline } => deadline.saturating_duration_since(now),
            Countdown::Paused { remaining } => remaining,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self, Countdown::Running { .. }) && self.remaining(now).is_zero()
    }

    pub fn pause(&mut self, now: Instant) {
        if let Countdown::Running { .. } = self {
            *self = Countdown::Paused {
                remaining: self.remaining(now),
            };
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Countdown::Paused { remaining } = *self {
            *self = Countdown::Running {
                deadline: now + remaining,
            };
        }
    }
}
