//! Presentation adapter: where highlight and line events go.

use crate::narration::NarrationLine;
use crate::tokenizer::Token;

/// Receives the engine's visual events. Implementations apply them to some
/// display surface; all methods except `on_progress` default to no-ops.
///
/// Calls for one session are never interleaved with calls for another, and
/// nothing is delivered for a session after it was cancelled or superseded.
pub trait Presenter: Send + Sync {
    /// A new queue is about to be narrated, replacing any previous one.
    fn on_queue(&self, _lines: &[NarrationLine]) {}

    /// Line `line` is now being narrated.
    fn on_line_start(&self, _line: usize) {}

    /// Reveal tokens `0..=token` of line `line` and move the highlight there.
    fn on_progress(&self, line: usize, token: usize);

    /// Line `line` finished narrating.
    fn on_line_end(&self, _line: usize) {}

    /// Playback was stopped; drop any "currently reading" marker.
    fn on_clear(&self) {}
}

/// Word token the "current word" marker belongs on once tokens `0..=upto`
/// are revealed: the nearest word at or before `upto`.
pub fn current_word(tokens: &[Token], upto: usize) -> Option<usize> {
    let end = upto.min(tokens.len().checked_sub(1)?);
    (0..=end).rev().find(|&i| tokens[i].is_word)
}

/// Presenter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_progress(&self, _line: usize, _token: usize) {}
}
