//! Speech type definitions
//!
//! Utterances and backend events exchanged with a narration backend, the
//! fallback pacing model, and the engine's observable state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ReaderError;

/// A voice offered by a narration backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 language tag, e.g. `ko-KR`.
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// One line of text handed to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utterance {
    pub text: String,
    /// `None` leaves the choice to the backend.
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
}

/// Events a backend reports while speaking one utterance.
///
/// Zero or more `Boundary` events are followed by exactly one terminal
/// `Ended` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Narration reached this offset, counted in `char`s of the utterance text.
    Boundary { char_index: usize },
    Ended,
    Error(String),
}

impl BackendEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BackendEvent::Boundary { .. })
    }
}

/// How a call to `play` finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PlaybackOutcome {
    /// Every line was narrated. `errors` counts lines the backend failed on.
    Completed { lines: usize, errors: usize },
    /// Cancelled or superseded while on `line`.
    Cancelled { line: usize },
}

/// What the engine is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum EngineState {
    Idle,
    Playing { line: usize },
}

/// Fallback estimator settings.
///
/// A line of `n` words is assumed to take `n / (base_wpm * rate)` minutes;
/// the estimator ticks `max(min_steps, n)` times over that span, never faster
/// than once per `min_tick_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PacingConfig {
    pub base_wpm: f64,
    pub min_tick_ms: u64,
    pub min_steps: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_wpm: 170.0,
            min_tick_ms: 40,
            min_steps: 8,
        }
    }
}

/// Estimated timing for one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub estimated: Duration,
    pub tick: Duration,
}

impl PacingConfig {
    pub fn validate(&self) -> Result<(), ReaderError> {
        if !(self.base_wpm.is_finite() && self.base_wpm > 0.0) {
            return Err(ReaderError::Config(format!(
                "pacing.base-wpm must be positive, got {}",
                self.base_wpm
            )));
        }
        if self.min_tick_ms == 0 {
            return Err(ReaderError::Config("pacing.min-tick-ms must be at least 1".to_string()));
        }
        if self.min_steps == 0 {
            return Err(ReaderError::Config("pacing.min-steps must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Estimate timing for a line of `word_count` words spoken at `rate`.
    pub fn estimate(&self, word_count: usize, rate: f32) -> Pacing {
        let words = word_count.max(1) as f64;
        let words_per_minute = self.base_wpm * f64::from(rate);
        let estimated_ms = words / words_per_minute * 60_000.0;
        let steps = self.min_steps.max(word_count).max(1) as f64;
        let tick_ms = (estimated_ms / steps).max(self.min_tick_ms.max(1) as f64);
        Pacing {
            estimated: Duration::from_secs_f64(estimated_ms / 1000.0),
            tick: Duration::from_secs_f64(tick_ms / 1000.0),
        }
    }
}
