use rand::rngs::ThreadRng;
use rand::Rng;

use crate::session::SessionSummary;

/// Produces a confidence score in `[0, 100]` for a finished session. The
/// hosted scoring service is out of scope; implementations stand in for it.
pub trait ConfidenceModel {
    fn score(&mut self, summary: &SessionSummary) -> f64;
}

/// Simulated scorer: rewards staying close to the target pace and adds a
/// little jitter so repeated runs look like a real grader.
pub struct SimulatedModel<R: Rng> {
    rng: R,
}

impl SimulatedModel<ThreadRng> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl<R: Rng> SimulatedModel<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ConfidenceModel for SimulatedModel<R> {
    fn score(&mut self, summary: &SessionSummary) -> f64 {
        if summary.elapsed_secs == 0 || summary.words_total == 0 {
            return 0.0;
        }
        let ratio = summary.attained_wpm / summary.target_wpm as f64;
        let closeness = (1.0 - (ratio - 1.0).abs()).clamp(0.0, 1.0);
        let base = 50.0 + 40.0 * closeness;
        let jitter: f64 = self.rng.gen_range(-8.0..=8.0);
        (base + jitter).clamp(0.0, 100.0)
    }
}

/// Always returns the same score. Test double.
pub struct FixedModel(pub f64);

impl ConfidenceModel for FixedModel {
    fn score(&mut self, _summary: &SessionSummary) -> f64 {
        self.0
    }
}

/// Per-frame microphone level in `[0, 1]` for the recording visualizer.
/// Presentation-only; nothing in the pacing core reads it.
pub trait AmplitudeSource {
    fn level(&mut self) -> f64;
}

/// Random-walk level that drifts like a live input meter.
pub struct SimulatedAmplitude<R: Rng> {
    level: f64,
    rng: R,
}

impl SimulatedAmplitude<ThreadRng> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            level: 0.3,
            rng: rand::thread_rng(),
        }
    }
}

impl<R: Rng> SimulatedAmplitude<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { level: 0.3, rng }
    }
}

impl<R: Rng> AmplitudeSource for SimulatedAmplitude<R> {
    fn level(&mut self) -> f64 {
        let step: f64 = self.rng.gen_range(-0.15..=0.15);
        self.level = (self.level + step).clamp(0.05, 1.0);
        self.level
    }
}

pub struct ConstantAmplitude(pub f64);

impl AmplitudeSource for ConstantAmplitude {
    fn level(&mut self) -> f64 {
        self.0
    }
}
