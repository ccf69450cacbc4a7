//! # Speech Module
//!
//! Narrate a queue of verse lines aloud and keep a visual highlight in sync
//! with the audio.
//!
//! ## Sub-modules
//! - `types` - Utterance, backend events, pacing, outcomes
//! - `backend` - NarrationBackend trait, voice selection, SimulatedBackend
//! - `offsets` - Character offset to token index mapping
//! - `tracker` - Monotonic highlight reducer for one line
//! - `presenter` - Presenter trait receiving highlight events
//! - `engine` - The SyncEngine state machine
//!
//! ## States
//! ```text
//! Idle ──play──▶ Playing(line 0) ──▶ Playing(line 1) ──▶ ... ──▶ Idle
//!   ▲                 │ cancel / new play                           │
//!   └─────────────────┴─────────────────────────────────────────────┘
//! ```
//!
//! ## Dual Signal Sources
//!
//! ### Boundary events
//! - Reported by the backend as a character offset into the line
//! - Mapped to a token by bisection over cumulative token offsets
//! - Precise, but not every backend sends them
//!
//! ### Fallback estimator
//! - An interval timer stepping from word to word
//! - Paced by `base-wpm × rate`, ticking at least `min-steps` times per line
//! - Never moves the highlight behind a confirmed boundary
//!
//! Both feed the same tracker, which only ever moves forward. When a line
//! ends (or the backend fails on it) the highlight closes on its last token.
//!
//! ## Example
//! ```rust
//! use versecast::narration::NarrationLine;
//! use versecast::speech::{NullPresenter, PlaybackOutcome, SimulatedBackend, SyncEngine, Voice};
//! use versecast::VersePoint;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), versecast::ReaderError> {
//! let backend = SimulatedBackend::new(vec![Voice::new("Test", "ko-KR")], 6000.0);
//! let engine = SyncEngine::new(backend, NullPresenter);
//!
//! let queue = vec![NarrationLine::new(VersePoint::new(1, 1), "태초에 말씀이 계시니라", true)];
//! let outcome = engine.play(queue, 1.0, 1.0).await?;
//! assert_eq!(outcome, PlaybackOutcome::Completed { lines: 1, errors: 0 });
//! # Ok(())
//! # }
//! ```

mod backend;
mod engine;
mod offsets;
mod presenter;
mod tracker;
mod types;


pub use backend::{await_voices, pick_voice, NarrationBackend, SimulatedBackend};
pub use engine::SyncEngine;
pub use offsets::CharOffsets;
pub use presenter::{current_word, NullPresenter, Presenter};
pub use tracker::HighlightTracker;
pub use types::{BackendEvent, EngineState, Pacing, PacingConfig, PlaybackOutcome, Utterance, Voice};
