//! Character offset to token index mapping.

use crate::tokenizer::Token;

/// Cumulative `char` offsets over a line's tokens.
///
/// Token `i` covers `[starts[i], starts[i] + len_i)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharOffsets {
    starts: Vec<usize>,
    total: usize,
}

impl CharOffsets {
    pub fn new(tokens: &[Token]) -> Self {
        let mut starts = Vec::with_capacity(tokens.len());
        let mut total = 0;
        for token in tokens {
            starts.push(total);
            total += token.char_len();
        }
        Self { starts, total }
    }

    /// Total length of the line in `char`s.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Offset at which token `index` starts.
    pub fn start_of(&self, index: usize) -> Option<usize> {
        self.starts.get(index).copied()
    }

    /// Token containing `char_index`; offsets at or past the end map to the
    /// last token. `None` only for a line without tokens.
    pub fn token_at(&self, char_index: usize) -> Option<usize> {
        let last = self.starts.len().checked_sub(1)?;
        if char_index >= self.total {
            return Some(last);
        }
        // starts[0] == 0, so at least one start is <= char_index.
        Some(self.starts.partition_point(|&start| start <= char_index) - 1)
    }
}
