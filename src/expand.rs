//! Range expansion: a [`ReferenceAddress`] into its ordered verse points.

use crate::address::{ReferenceAddress, VersePoint, MAX_CHAPTER, MAX_VERSE};
use crate::error::ReaderError;

/// Expand `address` into every verse point it covers, in reading order.
///
/// `chapter_length` reports the highest verse number known for a chapter, or
/// `0` when the chapter is unknown. It is consulted only for chapters the
/// range runs through to their end; an unknown chapter contributes no points
/// rather than an error. Lengths past [`MAX_VERSE`] are clamped to it.
///
/// # Example
/// ```rust
/// use versecast::{books, expand_range, ReferenceAddress, VersePoint};
///
/// let john = books::resolve("요").unwrap();
/// let address = ReferenceAddress::new(
///     john,
///     VersePoint::new(3, 35),
///     Some(VersePoint::new(4, 2)),
/// )?;
/// let points = expand_range(&address, |chapter| if chapter == 3 { 36 } else { 54 })?;
/// assert_eq!(
///     points,
///     vec![
///         VersePoint::new(3, 35),
///         VersePoint::new(3, 36),
///         VersePoint::new(4, 1),
///         VersePoint::new(4, 2),
///     ]
/// );
/// # Ok::<(), versecast::ReaderError>(())
/// ```
///
/// # Errors
/// - [`ReaderError::MalformedReference`] when a point lies outside the canon's
///   chapter and verse limits
/// - [`ReaderError::InvertedRange`] when the end precedes the start
pub fn expand_range<F>(
    address: &ReferenceAddress,
    chapter_length: F,
) -> Result<Vec<VersePoint>, ReaderError>
where
    F: Fn(u32) -> u32,
{
    let start = address.start;
    let outside = [Some(start), address.end]
        .into_iter()
        .flatten()
        .find(|point| !point.in_canon());
    if let Some(point) = outside {
        return Err(ReaderError::MalformedReference {
            input: address.to_string(),
            message: format!(
                "{} is outside chapters 1-{} and verses 1-{}",
                point, MAX_CHAPTER, MAX_VERSE
            ),
        });
    }
    let end = match address.end {
        Some(end) => end,
        None => return Ok(vec![start]),
    };
    if end < start {
        return Err(ReaderError::InvertedRange { start, end });
    }

    let mut points = Vec::new();
    for chapter in start.chapter..=end.chapter {
        let first = if chapter == start.chapter { start.verse } else { 1 };
        let last = if chapter == end.chapter {
            end.verse
        } else {
            chapter_length(chapter).min(MAX_VERSE)
        };
        points.extend((first..=last).map(|verse| VersePoint::new(chapter, verse)));
    }
    Ok(points)
}
