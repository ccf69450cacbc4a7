//! Narration lines: one spoken/displayed line per verse point.

use serde::{Deserialize, Serialize};

use crate::address::VersePoint;
use crate::books::BookId;
use crate::source::ChapterTable;
use crate::tokenizer::{tokenize, Token};

/// Text spoken and displayed for one verse, with its tokenization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationLine {
    pub point: VersePoint,
    pub display_text: String,
    pub tokens: Vec<Token>,
    /// False for placeholder lines of verses missing from the source.
    pub found: bool,
}

impl NarrationLine {
    pub fn new(point: VersePoint, display_text: impl Into<String>, found: bool) -> Self {
        let display_text = display_text.into();
        let tokens = tokenize(&display_text);
        Self {
            point,
            display_text,
            tokens,
            found,
        }
    }

    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_word).count()
    }

    pub fn last_token_index(&self) -> Option<usize> {
        self.tokens.len().checked_sub(1)
    }
}

/// How a line is composed from book, verse point and verse body.
///
/// `header` supports the `{book}`, `{chapter}` and `{verse}` placeholders.
/// `missing` stands in for the body when the verse is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LineFormat {
    pub header: String,
    pub missing: String,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            header: "{book} {chapter}장 {verse}절. ".to_string(),
            missing: "(구절 없음)".to_string(),
        }
    }
}

impl LineFormat {
    pub fn render(&self, book: BookId, point: VersePoint, body: Option<&str>) -> String {
        let header = self
            .header
            .replace("{book}", book.name())
            .replace("{chapter}", &point.chapter.to_string())
            .replace("{verse}", &point.verse.to_string());
        format!("{}{}", header, body.unwrap_or(&self.missing))
    }
}

/// Build the narration queue for `points`, one line per point.
pub fn build_lines(
    book: BookId,
    table: &ChapterTable,
    points: &[VersePoint],
    format: &LineFormat,
) -> Vec<NarrationLine> {
    points
        .iter()
        .map(|&point| {
            let body = table.verse(point.chapter, point.verse);
            NarrationLine::new(point, format.render(book, point, body), body.is_some())
        })
        .collect()
}
