//! # Error Types
//!
//! This module defines all error types for reference lookup and narration.
//!
//! Every failure is scoped to a single lookup attempt: nothing here is fatal to
//! the process, and the synchronization engine is always back in `Idle` after
//! an error is returned.
//!
//! ## Error Types
//! - `MalformedReference` - Input doesn't match the `book chapter:verse[-range]` grammar
//! - `UnknownBook` - A book name was given but no alias matches it
//! - `MissingBook` - No book in the input and none remembered from earlier lookups
//! - `InvertedRange` - The range end comes before its start
//! - `SourceUnavailable` - The book's text could not be retrieved (retry by re-submitting)
//! - `NarrationBackend` - A speech backend failure, handled per line by the engine
//! - `Config` - Invalid configuration or playback parameters
//!
//! ## Usage
//! ```rust
//! use versecast::{parse_reference, ReaderError};
//!
//! match parse_reference("3:16", None) {
//!     Ok(address) => println!("{}", address),
//!     Err(ReaderError::MissingBook) => eprintln!("name a book first"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

use crate::address::VersePoint;
use crate::books::BookId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReaderError {
    /// The input does not match the reference grammar.
    ///
    /// # Example
    /// ```
    /// # use versecast::ReaderError;
    /// let err = ReaderError::MalformedReference {
    ///     input: "요 3".to_string(),
    ///     message: "expected chapter:verse".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Malformed reference '요 3': expected chapter:verse");
    /// ```
    #[error("Malformed reference '{input}': {message}")]
    MalformedReference { input: String, message: String },

    /// A book name was present but no alias resolves it.
    #[error("Unknown book: {0}")]
    UnknownBook(String),

    /// No book name in the input and no remembered book to fall back on.
    #[error("No book name given; include one at least once, e.g. \"요한복음 3:16\"")]
    MissingBook,

    /// The end of a range precedes its start.
    ///
    /// # Example
    /// ```
    /// # use versecast::{ReaderError, VersePoint};
    /// let err = ReaderError::InvertedRange {
    ///     start: VersePoint::new(2, 1),
    ///     end: VersePoint::new(1, 1),
    /// };
    /// assert_eq!(err.to_string(), "Range end 1:1 comes before start 2:1");
    /// ```
    #[error("Range end {end} comes before start {start}")]
    InvertedRange { start: VersePoint, end: VersePoint },

    /// The text provider could not retrieve the book.
    #[error("Could not load text for {book}: {reason}")]
    SourceUnavailable { book: BookId, reason: String },

    /// The narration backend failed on an utterance.
    #[error("Narration backend error: {0}")]
    NarrationBackend(String),

    /// Invalid configuration or playback parameters.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ReaderError {
    /// Errors the user fixes by editing the reference they typed.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ReaderError::MalformedReference { .. }
                | ReaderError::UnknownBook(_)
                | ReaderError::MissingBook
                | ReaderError::InvertedRange { .. }
        )
    }

    /// Errors that may go away when the same lookup is submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReaderError::SourceUnavailable { .. })
    }
}
