//! Verse addresses: single points and book-scoped ranges.

use serde::Serialize;
use std::fmt;

use crate::books::BookId;
use crate::error::ReaderError;

/// Highest chapter number anywhere in the canon (Psalms).
pub const MAX_CHAPTER: u32 = 150;

/// Highest verse number anywhere in the canon (Psalm 119).
pub const MAX_VERSE: u32 = 176;

/// One verse within a book. Ordered by chapter, then verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VersePoint {
    pub chapter: u32,
    pub verse: u32,
}

impl VersePoint {
    pub const fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }

    /// Whether both numbers fall within `1..=MAX_CHAPTER` and `1..=MAX_VERSE`.
    pub fn in_canon(&self) -> bool {
        (1..=MAX_CHAPTER).contains(&self.chapter) && (1..=MAX_VERSE).contains(&self.verse)
    }
}

impl fmt::Display for VersePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

/// A resolved reference: a book plus a start point and an optional range end.
///
/// `end` is `None` for a single-verse reference. When present it is never
/// before `start`; [`ReferenceAddress::new`] enforces this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceAddress {
    pub book: BookId,
    pub start: VersePoint,
    pub end: Option<VersePoint>,
}

impl ReferenceAddress {
    pub fn new(
        book: BookId,
        start: VersePoint,
        end: Option<VersePoint>,
    ) -> Result<Self, ReaderError> {
        if let Some(end) = end {
            if end < start {
                return Err(ReaderError::InvertedRange { start, end });
            }
        }
        Ok(Self { book, start, end })
    }

    pub fn single(book: BookId, point: VersePoint) -> Self {
        Self { book, start: point, end: None }
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    /// Last verse covered by the reference.
    pub fn last(&self) -> VersePoint {
        self.end.unwrap_or(self.start)
    }
}

impl fmt::Display for ReferenceAddress {
    /// `요한복음 3:16`, `요한복음 3:16-18` or `요한복음 3:16-4:2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.start)?;
        match self.end {
            Some(end) if end.chapter == self.start.chapter => write!(f, "-{}", end.verse),
            Some(end) => write!(f, "-{}", end),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::resolve;

    #[test]
    fn test_verse_point_ordering_is_lexicographic() {
        assert!(VersePoint::new(1, 30) < VersePoint::new(2, 1));
        assert!(VersePoint::new(3, 16) < VersePoint::new(3, 17));
        assert_eq!(VersePoint::new(3, 16), VersePoint::new(3, 16));
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        let john = resolve("요").unwrap();
        let result =
            ReferenceAddress::new(john, VersePoint::new(2, 1), Some(VersePoint::new(1, 1)));
        assert_eq!(
            result,
            Err(ReaderError::InvertedRange {
                start: VersePoint::new(2, 1),
                end: VersePoint::new(1, 1),
            })
        );
        let empty_range =
            ReferenceAddress::new(john, VersePoint::new(3, 16), Some(VersePoint::new(3, 16)));
        assert!(empty_range.is_ok());
    }

    #[test]
    fn test_display() {
        let john = resolve("요").unwrap();
        let single = ReferenceAddress::single(john, VersePoint::new(3, 16));
        assert_eq!(single.to_string(), "요한복음 3:16");
        assert_eq!(single.last(), VersePoint::new(3, 16));

        let start = VersePoint::new(3, 16);
        let same_chapter =
            ReferenceAddress::new(john, start, Some(VersePoint::new(3, 18))).unwrap();
        assert_eq!(same_chapter.to_string(), "요한복음 3:16-18");

        let across = ReferenceAddress::new(john, start, Some(VersePoint::new(4, 2))).unwrap();
        assert_eq!(across.to_string(), "요한복음 3:16-4:2");
        assert!(across.is_range());
    }
}
