//! # Text Sources
//!
//! Chapter/verse text for a resolved book, behind the [`TextProvider`] trait.
//!
//! ## Source Format
//! Plain text, one verse per line:
//! ```text
//! 3:16 하나님이 세상을 이처럼 사랑하사 ...
//! 3:17 하나님이 그 아들을 세상에 보내신 것은 ...
//! ```
//! Lines that don't match `<chapter>:<verse><whitespace><body>` are skipped.
//!
//! ## Providers
//! - [`DirectoryProvider`] - reads `<dir>/<canonical name>.txt`
//! - [`MemoryProvider`] - texts held in memory
//!
//! [`BookCache`] sits in front of a provider and keeps one parsed
//! [`ChapterTable`] per book for the life of the process.

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::books::BookId;
use crate::error::ReaderError;

static VERSE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+):([0-9]+)\s+(.*)$").expect("verse line pattern compiles"));

/// Verse text for one book, keyed by chapter then verse.
///
/// Sparse: a missing verse means "no data", not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterTable {
    chapters: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl ChapterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the line-per-verse source format, dropping lines that don't fit.
    pub fn parse(text: &str) -> Self {
        let mut table = ChapterTable::new();
        let mut skipped = 0usize;
        for line in text.trim_start_matches('\u{feff}').lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed = VERSE_LINE.captures(line).and_then(|caps| {
                let chapter = caps[1].parse::<u32>().ok()?;
                let verse = caps[2].parse::<u32>().ok()?;
                Some((chapter, verse, caps[3].to_string()))
            });
            match parsed {
                Some((chapter, verse, body)) => table.insert(chapter, verse, body),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("skipped {} malformed source lines", skipped);
        }
        table
    }

    /// Insert or replace a verse.
    pub fn insert(&mut self, chapter: u32, verse: u32, body: impl Into<String>) {
        self.chapters
            .entry(chapter)
            .or_default()
            .insert(verse, body.into());
    }

    /// Highest verse number known for `chapter`, or 0 when the chapter is unknown.
    pub fn max_verse(&self, chapter: u32) -> u32 {
        self.chapters
            .get(&chapter)
            .and_then(|verses| verses.keys().next_back().copied())
            .unwrap_or(0)
    }

    pub fn verse(&self, chapter: u32, verse: u32) -> Option<&str> {
        self.chapters
            .get(&chapter)
            .and_then(|verses| verses.get(&verse))
            .map(String::as_str)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Retrieves the chapter table for a book from some backing store.
pub trait TextProvider: Send + Sync {
    /// # Errors
    /// [`ReaderError::SourceUnavailable`] when the book's text cannot be retrieved.
    fn fetch_chapter_table(&self, book: BookId) -> Result<ChapterTable, ReaderError>;
}

/// Reads `<root>/<canonical name>.txt`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, book: BookId) -> PathBuf {
        self.root.join(format!("{}.txt", book.name()))
    }
}

impl TextProvider for DirectoryProvider {
    fn fetch_chapter_table(&self, book: BookId) -> Result<ChapterTable, ReaderError> {
        let path = self.path_for(book);
        let text = fs::read_to_string(&path).map_err(|e| ReaderError::SourceUnavailable {
            book,
            reason: format!("{}: {}", path.display(), e),
        })?;
        Ok(ChapterTable::parse(&text))
    }
}

/// Book texts held in memory, in the same line-per-verse format.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    texts: HashMap<BookId, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, book: BookId, text: impl Into<String>) -> Self {
        self.texts.insert(book, text.into());
        self
    }
}

impl TextProvider for MemoryProvider {
    fn fetch_chapter_table(&self, book: BookId) -> Result<ChapterTable, ReaderError> {
        self.texts
            .get(&book)
            .map(|text| ChapterTable::parse(text))
            .ok_or_else(|| ReaderError::SourceUnavailable {
                book,
                reason: "no text loaded for this book".to_string(),
            })
    }
}

/// Per-book cache in front of a [`TextProvider`].
///
/// Entries are only ever added. A failed fetch caches nothing, so the next
/// lookup of that book tries the provider again.
pub struct BookCache<P> {
    provider: P,
    tables: Mutex<HashMap<BookId, Arc<ChapterTable>>>,
}

impl<P: TextProvider> BookCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Chapter table for `book`, fetching it on first use.
    pub fn load(&self, book: BookId) -> Result<Arc<ChapterTable>, ReaderError> {
        if let Some(table) = self.lock().get(&book) {
            debug!("chapter table cache hit for {}", book);
            return Ok(Arc::clone(table));
        }

        debug!("chapter table cache miss for {}", book);
        let fetched = self.provider.fetch_chapter_table(book).map_err(|e| {
            warn!("{}", e);
            e
        })?;
        if fetched.is_empty() {
            warn!("source for {} contained no verse lines", book);
        }

        let mut tables = self.lock();
        let table = tables.entry(book).or_insert_with(|| Arc::new(fetched));
        Ok(Arc::clone(table))
    }

    pub fn is_cached(&self, book: BookId) -> bool {
        self.lock().contains_key(&book)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<BookId, Arc<ChapterTable>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
