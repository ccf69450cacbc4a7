pub mod address;
pub mod api;
pub mod books;
pub mod config;
pub mod error;
pub mod expand;
pub mod narration;
pub mod parser;
pub mod source;
pub mod speech;
pub mod tokenizer;

pub use address::{ReferenceAddress, VersePoint};
pub use api::{Passage, Reader};
pub use books::BookId;
pub use config::ReaderConfig;
pub use error::*;
pub use expand::expand_range;
pub use narration::{build_lines, LineFormat, NarrationLine};
pub use parser::{parse_reference, BookMemory};
pub use source::{BookCache, ChapterTable, DirectoryProvider, MemoryProvider, TextProvider};
pub use tokenizer::{tokenize, Token};

/// Parse `raw` and expand it against a chapter table in one step.
/// Useful when no narration is needed.
pub fn resolve_points(
    raw: &str,
    fallback: Option<BookId>,
    table: &ChapterTable,
) -> Result<(ReferenceAddress, Vec<VersePoint>), ReaderError> {
    let address = parse_reference(raw, fallback)?;
    let points = expand_range(&address, |chapter| table.max_verse(chapter))?;
    Ok((address, points))
}
