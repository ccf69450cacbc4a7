//! Highlight tracking for a single line.
//!
//! Boundary events and the fallback estimator are two producers feeding one
//! reducer. The reducer only ever moves the highlight forward, so a late
//! estimator tick cannot pull it behind a confirmed boundary and repeated
//! reports of the same position produce nothing.

use super::offsets::CharOffsets;
use crate::narration::NarrationLine;

#[derive(Debug, Clone)]
pub struct HighlightTracker {
    offsets: CharOffsets,
    /// Token indices of word tokens, in order.
    word_tokens: Vec<usize>,
    /// Estimator steps taken so far.
    cursor: usize,
    /// Highest token index confirmed by a boundary event.
    confirmed: Option<usize>,
    /// Highest token index reported to the presenter.
    shown: Option<usize>,
}

impl HighlightTracker {
    pub fn new(line: &NarrationLine) -> Self {
        let word_tokens = line
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_word)
            .map(|(index, _)| index)
            .collect();
        Self {
            offsets: CharOffsets::new(&line.tokens),
            word_tokens,
            cursor: 0,
            confirmed: None,
            shown: None,
        }
    }

    /// Highest token index reported so far.
    pub fn highlighted(&self) -> Option<usize> {
        self.shown
    }

    /// Boundary event at `char_index`. Returns the token to highlight, if the
    /// highlight moves.
    pub fn on_boundary(&mut self, char_index: usize) -> Option<usize> {
        let index = self.offsets.token_at(char_index)?;
        self.confirmed = Some(self.confirmed.map_or(index, |c| c.max(index)));
        self.advance(index)
    }

    /// Estimator tick: step to the next word, but never behind what boundary
    /// events already confirmed.
    pub fn on_tick(&mut self) -> Option<usize> {
        let last_word = self.word_tokens.len().checked_sub(1)?;
        let estimated = self.word_tokens[self.cursor.min(last_word)];
        self.cursor += 1;
        let target = self.confirmed.map_or(estimated, |c| c.max(estimated));
        self.advance(target)
    }

    /// Line finished: the highlight closes on the last token.
    pub fn finish(&mut self) -> Option<usize> {
        let last = self.offsets.len().checked_sub(1)?;
        self.advance(last)
    }

    fn advance(&mut self, index: usize) -> Option<usize> {
        match self.shown {
            Some(shown) if index <= shown => None,
            _ => {
                self.shown = Some(index);
                Some(index)
            }
        }
    }
}
