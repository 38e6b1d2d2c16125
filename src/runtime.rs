use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// UI tick cadence. Fast enough for the amplitude meter; the [`Runner`]
/// derives whole-second boundaries from it.
pub const TICK_RATE_MS: u64 = 100;

/// Unified event type consumed by the app runner. `second` is true on the
/// tick that completes a whole second of wall time.
#[derive(Clone, Debug)]
pub enum PromptEvent {
    Key(KeyEvent),
    Resize,
    Tick { second: bool },
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait PromptEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<PromptEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<PromptEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(PromptEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(PromptEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PromptEvent, RecvTimeoutError> {
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

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Turns fast UI ticks into whole-second session ticks. The session machine
/// is stepped only when [`advance`](Self::advance) reports a boundary.
#[derive(Clone, Copy, Debug)]
pub struct TickDivider {
    ticks_per_second: u32,
    count: u32,
}

impl TickDivider {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1),
            count: 0,
        }
    }

    pub fn from_tick_rate_ms(tick_rate_ms: u64) -> Self {
        Self::new((1000 / tick_rate_ms.max(1)) as u32)
    }

    /// Counts one UI tick; true when a full second has elapsed.
    pub fn advance(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.ticks_per_second {
            self.count = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<PromptEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PromptEvent>) -> Self {
        Self { rx }
    }
}

impl PromptEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PromptEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time and marks
/// the ticks that land on a second boundary
pub struct Runner<E: PromptEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    divider: TickDivider,
}

impl<E: PromptEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let divider = TickDivider::from_tick_rate_ms(ticker.interval().as_millis() as u64);
        Self {
            event_source,
            ticker,
            divider,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&mut self) -> PromptEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                PromptEvent::Tick {
                    second: self.divider.advance(),
                }
            }
        }
    }

    /// Restarts the current second; the next boundary is a full second away
    pub fn resync(&mut self) {
        self.divider.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            PromptEvent::Tick { .. } => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(PromptEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let mut runner = Runner::new(es, ticker);

        match runner.step() {
            PromptEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn step_marks_the_tick_that_completes_a_second() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        // 250 ms ticks: every fourth timeout lands on a second boundary
        let ticker = FixedTicker::new(Duration::from_millis(250));
        let mut runner = Runner::new(es, ticker);

        let mut seconds = 0;
        for _ in 0..4 {
            if let PromptEvent::Tick { second: true } = runner.step() {
                seconds += 1;
            }
        }
        assert_eq!(seconds, 1);
    }

    #[test]
    fn resync_pushes_the_next_boundary_a_full_second_out() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(500));
        let mut runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), PromptEvent::Tick { second: false });
        runner.resync();
        assert_matches!(runner.step(), PromptEvent::Tick { second: false });
        assert_matches!(runner.step(), PromptEvent::Tick { second: true });
    }

    #[test]
    fn divider_fires_once_per_second() {
        let mut divider = TickDivider::from_tick_rate_ms(TICK_RATE_MS);
        let mut boundaries = 0;
        for _ in 0..30 {
            if divider.advance() {
                boundaries += 1;
            }
        }
        assert_eq!(boundaries, 3);
    }

    #[test]
    fn divider_reset_restarts_the_second() {
        let mut divider = TickDivider::new(2);
        assert!(!divider.advance());
        divider.reset();
        assert!(!divider.advance());
        assert!(divider.advance());
    }
}
