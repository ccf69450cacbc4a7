//! # Public API
//!
//! [`Reader`] ties the pieces together: reference parsing with a remembered
//! book, chapter text loading, range expansion, line building and narration.
//!
//! ## Operations
//!
//! - [`Reader::lookup()`] - Resolve a reference into a [`Passage`] without speaking it
//! - [`Reader::read_aloud()`] - Look up a reference and narrate it, superseding any playback
//! - [`Reader::narrate()`] - Narrate an already resolved passage
//! - [`Reader::stop()`] - Stop narration and clear the highlight
//!
//! ## Typical Usage
//!
//! ```rust
//! use versecast::speech::{NullPresenter, PlaybackOutcome, SimulatedBackend, Voice};
//! use versecast::{books, MemoryProvider, Reader, ReaderConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), versecast::ReaderError> {
//! let john = books::resolve("요한복음").unwrap();
//! let provider = MemoryProvider::new().with_book(john, "3:16\t하나님이 세상을 이처럼 사랑하사\n");
//! let backend = SimulatedBackend::new(vec![Voice::new("Test", "ko-KR")], 6000.0);
//! let reader = Reader::new(ReaderConfig::default(), provider, backend, NullPresenter);
//!
//! let passage = reader.lookup("요 3:16")?;
//! assert_eq!(passage.lines[0].display_text, "요한복음 3장 16절. 하나님이 세상을 이처럼 사랑하사");
//!
//! // The book is remembered, so a bare chapter:verse works next.
//! let outcome = reader.read_aloud("3:16").await?;
//! assert_eq!(outcome, PlaybackOutcome::Completed { lines: 1, errors: 0 });
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Scope
//!
//! Every error is scoped to the lookup that produced it. A failed parse leaves
//! the remembered book untouched, and a failed lookup in
//! [`read_aloud`](Reader::read_aloud) leaves the engine idle.

use log::info;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

use crate::address::{ReferenceAddress, VersePoint};
use crate::books::BookId;
use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::expand::expand_range;
use crate::narration::{build_lines, NarrationLine};
use crate::parser::BookMemory;
use crate::source::{BookCache, TextProvider};
use crate::speech::{NarrationBackend, PlaybackOutcome, Presenter, SyncEngine};

/// A resolved reference with its narration queue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub address: ReferenceAddress,
    pub points: Vec<VersePoint>,
    pub lines: Vec<NarrationLine>,
}

impl Passage {
    /// Number of points that had no text in the source.
    pub fn missing_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.found).count()
    }
}

/// Reference reader over a text provider, a narration backend and a presenter.
pub struct Reader<P, B, R> {
    config: ReaderConfig,
    memory: Mutex<BookMemory>,
    cache: BookCache<P>,
    engine: SyncEngine<B, R>,
}

impl<P, B, R> Reader<P, B, R>
where
    P: TextProvider,
    B: NarrationBackend,
    R: Presenter,
{
    pub fn new(config: ReaderConfig, provider: P, backend: B, presenter: R) -> Self {
        let engine = SyncEngine::new(backend, presenter)
            .with_pacing(config.pacing.clone())
            .with_voice(config.voice_lang.clone(), config.voice_timeout());
        Self {
            config,
            memory: Mutex::new(BookMemory::new()),
            cache: BookCache::new(provider),
            engine,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn engine(&self) -> &SyncEngine<B, R> {
        &self.engine
    }

    /// Book used for references that omit one.
    pub fn last_book(&self) -> Option<BookId> {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_book()
    }

    /// Resolve `raw` into a passage.
    ///
    /// # Pipeline
    /// 1. Parse, falling back to the remembered book
    /// 2. Load the book's chapter table (cached after the first load)
    /// 3. Expand the range, using the table for chapter lengths
    /// 4. Build one narration line per verse point
    ///
    /// # Errors
    /// Any parse error, or [`ReaderError::SourceUnavailable`] when the book's
    /// text cannot be loaded.
    pub fn lookup(&self, raw: &str) -> Result<Passage, ReaderError> {
        let address = self
            .memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .parse(raw)?;
        let table = self.cache.load(address.book)?;
        let points = expand_range(&address, |chapter| table.max_verse(chapter))?;
        let lines = build_lines(address.book, &table, &points, &self.config.line_format);
        let passage = Passage {
            address,
            points,
            lines,
        };
        info!(
            "{}: {} verses, {} missing",
            passage.address,
            passage.points.len(),
            passage.missing_count()
        );
        Ok(passage)
    }

    /// Look up `raw` and narrate it at the configured rate and pitch.
    ///
    /// Any playback in progress is stopped first, whether or not the lookup
    /// succeeds.
    pub async fn read_aloud(&self, raw: &str) -> Result<PlaybackOutcome, ReaderError> {
        self.stop();
        let passage = self.lookup(raw)?;
        self.narrate(passage, self.config.rate, self.config.pitch).await
    }

    pub async fn narrate(
        &self,
        passage: Passage,
        rate: f32,
        pitch: f32,
    ) -> Result<PlaybackOutcome, ReaderError> {
        self.engine.play(passage.lines, rate, pitch).await
    }

    pub fn stop(&self) {
        self.engine.cancel();
    }
}
