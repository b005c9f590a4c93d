use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use log::warn;

pub const TICK_RATE_MS: u64 = 100;

/// What the practice loop reacts to
#[derive(Clone, Debug)]
pub enum PracticeEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub trait PracticeEventSource: Send + 'static {
    /// Waits at most `timeout` for the next event. `Err` means the runner
    /// should tick instead.
    fn recv_timeout(&self, timeout: Duration) -> Result<PracticeEvent, RecvTimeoutError>;
}

/// Keeps what the session reacts to. Key releases (reported by some
/// platforms), mouse, focus and paste events are dropped.
pub fn translate(event: CtEvent) -> Option<PracticeEvent> {
    match event {
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(PracticeEvent::Key(key)),
        CtEvent::Resize(_, _) => Some(PracticeEvent::Resize),
        _ => None,
    }
}

/// Terminal input read on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<PracticeEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("triads-input".into())
            .spawn(move || read_terminal(tx));
        if let Err(err) = reader {
            // the runner still ticks on a disconnected channel
            warn!("could not start the input reader: {err}");
        }
        Self { rx }
    }
}

fn read_terminal(tx: Sender<PracticeEvent>) {
    loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                warn!("terminal input closed: {err}");
                return;
            }
        };
        if let Some(ev) = translate(event) {
            if tx.send(ev).is_err() {
                return;
            }
        }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PracticeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Replays events fed through a channel. Once the sender is gone and the
/// queue is drained, every step yields a tick.
pub struct TestEventSource {
    rx: Receiver<PracticeEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PracticeEvent>) -> Self {
        Self { rx }
    }

    /// A source that plays back `events` in order and then goes quiet
    pub fn scripted<I: IntoIterator<Item = PracticeEvent>>(events: I) -> Self {
        let (tx, rx) = mpsc::channel();
        for event in events {
            // the receiver is alive, so this cannot fail
            let _ = tx.send(event);
        }
        Self::new(rx)
    }
}

impl PracticeEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PracticeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: PracticeEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    last_tick: Cell<Instant>,
}

impl<E: PracticeEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            last_tick: Cell::new(Instant::now()),
        }
    }

    /// Returns the next event, or Tick once the tick interval has elapsed.
    /// A steady stream of key events cannot starve the tick.
    pub fn step(&self) -> PracticeEvent {
        let wait = self
            .ticker
            .interval()
            .saturating_sub(self.last_tick.get().elapsed());
        if wait.is_zero() {
            return self.tick();
        }

        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => self.tick(),
        }
    }

    fn tick(&self) -> PracticeEvent {
        self.last_tick.set(Instant::now());
        PracticeEvent::Tick
    }
}
