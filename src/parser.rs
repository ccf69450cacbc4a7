//! # Reference Parser
//!
//! Turns a free-form reference string into a [`ReferenceAddress`].
//!
//! ## Grammar
//! ```text
//! reference := [book] chapter ":" verse [ sep ( verse | chapter ":" verse ) ]
//! book      := [digit] text          (no digits, colons or range separators in text)
//! sep       := "-" | "~" | "–" | "—" | "―" | "‒" | "‑" | "‐" | "－" | "〜" | "～"
//! ```
//!
//! All range separators are folded into `~` before matching, the fullwidth
//! colon becomes `:` and fullwidth digits become ASCII digits.
//!
//! A trailing verse without a chapter (`요 3:16-18`) stays in the start
//! chapter. The book is resolved from the input when present; otherwise the
//! caller-supplied fallback (the last book used) applies.
//!
//! Parsing itself is pure. [`BookMemory`] wraps it with the remembered
//! last-used book that lets `3:17` follow `요 3:16`.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::address::{ReferenceAddress, VersePoint, MAX_CHAPTER, MAX_VERSE};
use crate::books::{self, BookId};
use crate::error::ReaderError;

/// Internal range separator every dash variant is folded into.
const RANGE_SEP: char = '~';

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<book>[0-9]?\s*[^0-9:~\s][^0-9:~]*?)\s*)?",
        r"(?P<c1>[0-9]+):(?P<v1>[0-9]+)",
        r"(?:\s*~\s*(?:(?P<c2>[0-9]+):)?(?P<v2>[0-9]+))?$",
    ))
    .expect("reference pattern compiles")
});

fn normalize_input(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | '~' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}'
            | '\u{2015}' | '\u{FF0D}' | '\u{301C}' | '\u{FF5E}' => RANGE_SEP,
            '\u{FF1A}' => ':',
            '\u{FF10}'..='\u{FF19}' => {
                char::from_u32(c as u32 - 0xFF10 + u32::from(b'0')).unwrap_or(c)
            }
            other => other,
        })
        .collect()
}

fn malformed(raw: &str, message: impl Into<String>) -> ReaderError {
    ReaderError::MalformedReference {
        input: raw.to_string(),
        message: message.into(),
    }
}

fn number(raw: &str, digits: &str, limit: u32) -> Result<u32, ReaderError> {
    match digits.parse::<u32>() {
        Ok(0) => Err(malformed(raw, "chapter and verse numbers start at 1")),
        Ok(n) if n <= limit => Ok(n),
        _ => Err(malformed(
            raw,
            format!("number {} is out of range (at most {})", digits, limit),
        )),
    }
}

/// Parse `raw` into an address, using `fallback` when the input names no book.
///
/// # Errors
/// - [`ReaderError::MalformedReference`] when the input does not match the grammar
/// - [`ReaderError::UnknownBook`] when the book text resolves to nothing
/// - [`ReaderError::MissingBook`] when there is no book text and no fallback
/// - [`ReaderError::InvertedRange`] when the range end precedes its start
///
/// # Example
/// ```rust
/// use versecast::{parse_reference, VersePoint};
///
/// let address = parse_reference("요 3:16-4:2", None)?;
/// assert_eq!(address.book.name(), "요한복음");
/// assert_eq!(address.start, VersePoint::new(3, 16));
/// assert_eq!(address.end, Some(VersePoint::new(4, 2)));
///
/// let follow_up = parse_reference("5:1", Some(address.book))?;
/// assert_eq!(follow_up.book, address.book);
/// # Ok::<(), versecast::ReaderError>(())
/// ```
pub fn parse_reference(
    raw: &str,
    fallback: Option<BookId>,
) -> Result<ReferenceAddress, ReaderError> {
    let normalized = normalize_input(raw);
    if normalized.is_empty() {
        return Err(malformed(raw, "input is empty"));
    }

    let captures = REFERENCE.captures(&normalized).ok_or_else(|| {
        malformed(
            raw,
            "expected `book chapter:verse`, e.g. \"요 3:16-18\" or \"요 3:16-4:2\"",
        )
    })?;

    let book = match captures.name("book").map(|m| m.as_str().trim()) {
        Some(text) if !text.is_empty() => {
            books::resolve(text).ok_or_else(|| ReaderError::UnknownBook(text.to_string()))?
        }
        _ => fallback.ok_or(ReaderError::MissingBook)?,
    };

    let c1 = number(raw, &captures["c1"], MAX_CHAPTER)?;
    let v1 = number(raw, &captures["v1"], MAX_VERSE)?;
    let end = match captures.name("v2") {
        Some(v2) => {
            let c2 = match captures.name("c2") {
                Some(c2) => number(raw, c2.as_str(), MAX_CHAPTER)?,
                None => c1,
            };
            Some(VersePoint::new(c2, number(raw, v2.as_str(), MAX_VERSE)?))
        }
        None => None,
    };

    let address = ReferenceAddress::new(book, VersePoint::new(c1, v1), end)?;
    debug!("parsed '{}' as {}", raw, address);
    Ok(address)
}

/// Session context remembering the last successfully resolved book.
///
/// Only a successful parse updates the memory; failures leave it untouched.
#[derive(Debug, Clone, Default)]
pub struct BookMemory {
    last: Option<BookId>,
}

impl BookMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_book(&self) -> Option<BookId> {
        self.last
    }

    pub fn parse(&mut self, raw: &str) -> Result<ReferenceAddress, ReaderError> {
        let address = parse_reference(raw, self.last)?;
        self.last = Some(address.book);
        Ok(address)
    }
}
