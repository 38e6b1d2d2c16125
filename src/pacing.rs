use std::error::Error;
use std::fmt;

/// Validated words-per-minute pace. Zero is rejected at construction so the
/// highlight math never divides or multiplies by a bad rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceRate(u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingError {
    InvalidConfig,
}

impl fmt::Display for PacingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacingError::InvalidConfig => write!(f, "words per minute must be positive"),
        }
    }
}

impl Error for PacingError {}

impl PaceRate {
    pub fn new(wpm: u16) -> Result<Self, PacingError> {
        if wpm == 0 {
            return Err(PacingError::InvalidConfig);
        }
        Ok(PaceRate(wpm))
    }

    pub fn wpm(&self) -> u16 {
        self.0
    }

    pub fn words_per_sec(&self) -> f64 {
        self.0 as f64 / 60.0
    }
}

/// Rendering classification for a single script word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordMark {
    Spoken,
    Current,
    Upcoming,
}

/// Maps elapsed recording time to the word the speaker should be on.
///
/// Recomputed from scratch on every tick rather than accumulated; elapsed
/// time freezes while paused, so the result stays monotone across
/// pause/resume. Returns 0 for an empty script, which callers must treat
/// specially since there is no word to highlight.
pub fn highlight_index(word_count: usize, elapsed_secs: u64, rate: PaceRate) -> usize {
    if word_count == 0 {
        return 0;
    }
    let raw = (elapsed_secs as f64 * rate.words_per_sec()).floor() as usize;
    raw.min(word_count - 1)
}

/// Classifies the word at `pos` relative to the current highlight. Only a
/// recording session has a "current" word; when not recording everything at
/// or past the highlight is upcoming.
pub fn classify(pos: usize, highlight: usize, recording: bool) -> WordMark {
    if pos < highlight {
        WordMark::Spoken
    } else if pos == highlight && recording {
        WordMark::Current
    } else {
        WordMark::Upcoming
    }
}
