use std::error::Error;
use std::fmt;

use chrono::{DateTime, Local};

use crate::pacing::{highlight_index, PaceRate};

pub const DEFAULT_COUNTDOWN_SECS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CountingDown,
    Recording,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    InvalidTransition {
        from: SessionState,
        event: &'static str,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidTransition { from, event } => {
                write!(f, "{event} is not valid from {from:?}")
            }
        }
    }
}

impl Error for SessionError {}

/// Finalized result of a stopped session, handed to the caller. Persistence,
/// scoring, and navigation all happen outside the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub elapsed_secs: u64,
    pub final_word_index: usize,
    pub words_covered: usize,
    pub words_total: usize,
    pub target_wpm: u16,
    pub attained_wpm: f64,
    pub started_at: Option<DateTime<Local>>,
    pub stopped_at: DateTime<Local>,
}

/// One practice attempt: idle -> countdown -> recording, with pause/resume,
/// until stopped or restarted.
///
/// Driven entirely by an external 1 Hz clock calling [`tick`](Self::tick);
/// the machine owns no timer and performs no I/O. `elapsed_secs` advances
/// only while recording, so the highlight recomputed from it stays correct
/// across pause/resume.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    state: SessionState,
    elapsed_secs: u64,
    countdown_remaining: u8,
    countdown_secs: u8,
    word_count: usize,
    rate: PaceRate,
    started_at: Option<DateTime<Local>>,
}

impl RecordingSession {
    pub fn new(word_count: usize, rate: PaceRate) -> Self {
        Self {
            state: SessionState::Idle,
            elapsed_secs: 0,
            countdown_remaining: 0,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            word_count,
            rate,
            started_at: None,
        }
    }

    pub fn with_countdown(mut self, secs: u8) -> Self {
        self.countdown_secs = secs;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn countdown_remaining(&self) -> u8 {
        self.countdown_remaining
    }

    pub fn rate(&self) -> PaceRate {
        self.rate
    }

    /// Applies a new target pace. The highlight is recomputed from elapsed
    /// time on every tick, so a mid-session change takes effect immediately.
    pub fn set_rate(&mut self, rate: PaceRate) {
        self.rate = rate;
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Current teleprompter position derived from elapsed time.
    pub fn highlight(&self) -> usize {
        highlight_index(self.word_count, self.elapsed_secs, self.rate)
    }

    /// Begins the pre-roll countdown. Valid from `Idle` only.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => {
                self.countdown_remaining = self.countdown_secs;
                self.state = SessionState::CountingDown;
                Ok(())
            }
            from => Err(SessionError::InvalidTransition {
                from,
                event: "start",
            }),
        }
    }

    /// Advances the session by one second of wall time. No-op outside of
    /// `CountingDown` and `Recording`.
    pub fn tick(&mut self) {
        match self.state {
            SessionState::CountingDown => {
                if self.countdown_remaining > 0 {
                    self.countdown_remaining -= 1;
                } else {
                    self.elapsed_secs = 0;
                    self.started_at = Some(Local::now());
                    self.state = SessionState::Recording;
                }
            }
            SessionState::Recording => {
                self.elapsed_secs += 1;
            }
            _ => {}
        }
    }

    /// No-op unless currently recording.
    pub fn pause(&mut self) {
        if self.state == SessionState::Recording {
            self.state = SessionState::Paused;
        }
    }

    /// No-op unless currently paused.
    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.state = SessionState::Recording;
        }
    }

    /// Finalizes the attempt. Valid from `Recording` and `Paused` so a
    /// "pause then stop" flow works; the session becomes immutable history.
    pub fn stop(&mut self) -> Result<SessionSummary, SessionError> {
        match self.state {
            SessionState::Recording | SessionState::Paused => {
                self.state = SessionState::Stopped;
                Ok(self.summarize())
            }
            from => Err(SessionError::InvalidTransition {
                from,
                event: "stop",
            }),
        }
    }

    /// Abandons the attempt and returns to `Idle`; all fields reset as one
    /// logical update. A stopped session is immutable history, so once
    /// `stop()` has finalized the attempt this is a no-op.
    pub fn restart(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.state = SessionState::Idle;
        self.elapsed_secs = 0;
        self.countdown_remaining = 0;
        self.started_at = None;
    }

    fn summarize(&self) -> SessionSummary {
        let final_word_index = self.highlight();
        let words_covered = if self.word_count == 0 {
            0
        } else {
            (final_word_index + 1).min(self.word_count)
        };
        let attained_wpm = if self.elapsed_secs > 0 {
            words_covered as f64 * 60.0 / self.elapsed_secs as f64
        } else {
            0.0
        };
        SessionSummary {
            elapsed_secs: self.elapsed_secs,
            final_word_index,
            words_covered,
            words_total: self.word_count,
            target_wpm: self.rate.wpm(),
            attained_wpm,
            started_at: self.started_at,
            stopped_at: Local::now(),
        }
    }
}
