//! # Book Aliases
//!
//! The fixed table of 66 canonical books and the alias resolver over it.
//!
//! Each book has one canonical name (also the stem of its source text file),
//! an English name, and a list of aliases: Korean short forms, English
//! abbreviations and full names. Lookup is case- and whitespace-insensitive,
//! so `"JN"`, `" jn "` and `"요한 복음"` all land on the same book.
//!
//! The alias index is built once on first use and never mutated afterwards.
//!
//! ## Example
//! ```rust
//! use versecast::books::resolve;
//!
//! let john = resolve("요").unwrap();
//! assert_eq!(john.name(), "요한복음");
//! assert_eq!(resolve(" JN "), Some(john));
//! assert_eq!(resolve("nowhere"), None);
//! ```

use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// One of the 66 canonical books, in canon order (Genesis = 0).
///
/// Only produced by [`resolve`] or [`BookId::from_index`]; never built from
/// user text directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(u8);

struct BookEntry {
    name: &'static str,
    english: &'static str,
    aliases: &'static [&'static str],
}

const fn book(
    name: &'static str,
    english: &'static str,
    aliases: &'static [&'static str],
) -> BookEntry {
    BookEntry { name, english, aliases }
}

const BOOKS: [BookEntry; 66] = [
    // Old Testament
    book("창세기", "Genesis", &["창", "창세", "gen"]),
    book("출애굽기", "Exodus", &["출", "출애굽", "exo"]),
    book("레위기", "Leviticus", &["레", "lev"]),
    book("민수기", "Numbers", &["민", "num"]),
    book("신명기", "Deuteronomy", &["신", "deut"]),
    book("여호수아", "Joshua", &["수", "jos"]),
    book("사사기", "Judges", &["삿", "judg"]),
    book("룻기", "Ruth", &["룻", "rut"]),
    book("사무엘상", "1 Samuel", &["삼상", "1sam", "1sa"]),
    book("사무엘하", "2 Samuel", &["삼하", "2sam", "2sa"]),
    book("열왕기상", "1 Kings", &["왕상", "1ki", "1kgs"]),
    book("열왕기하", "2 Kings", &["왕하", "2ki", "2kgs"]),
    book("역대상", "1 Chronicles", &["대상", "1ch", "1chr"]),
    book("역대하", "2 Chronicles", &["대하", "2ch", "2chr"]),
    book("에스라", "Ezra", &["스", "ezr"]),
    book("느헤미야", "Nehemiah", &["느", "neh"]),
    book("에스더", "Esther", &["에", "est"]),
    book("욥기", "Job", &["욥"]),
    book("시편", "Psalms", &["시", "ps", "psalm"]),
    book("잠언", "Proverbs", &["잠", "pr", "prov"]),
    book("전도서", "Ecclesiastes", &["전", "eccl", "qohelet"]),
    book("아가", "Song of Solomon", &["아", "song", "songs"]),
    book("이사야", "Isaiah", &["사", "isa"]),
    book("예레미야", "Jeremiah", &["렘", "jer"]),
    book("예레미야애가", "Lamentations", &["애", "lam"]),
    book("에스겔", "Ezekiel", &["겔", "ezk"]),
    book("다니엘", "Daniel", &["단", "dan"]),
    book("호세아", "Hosea", &["호", "hos"]),
    book("요엘", "Joel", &["욜", "jl"]),
    book("아모스", "Amos", &["암", "am"]),
    book("오바댜", "Obadiah", &["옵", "ob"]),
    book("요나", "Jonah", &["욘", "jon"]),
    book("미가", "Micah", &["미", "mic"]),
    book("나훔", "Nahum", &["나", "nah"]),
    book("하박국", "Habakkuk", &["합", "hab"]),
    book("스바냐", "Zephaniah", &["습", "zep"]),
    book("학개", "Haggai", &["학", "hag"]),
    book("스가랴", "Zechariah", &["슥", "zec"]),
    book("말라기", "Malachi", &["말", "mal"]),
    // New Testament
    book("마태복음", "Matthew", &["마", "마태", "matt", "mt"]),
    book("마가복음", "Mark", &["막", "마가", "mk", "mrk"]),
    book("누가복음", "Luke", &["눅", "누가", "lk"]),
    book("요한복음", "John", &["요", "요한", "jn"]),
    book("사도행전", "Acts", &["행", "ac"]),
    book("로마서", "Romans", &["롬", "rom"]),
    book("고린도전서", "1 Corinthians", &["고전", "1co", "1cor"]),
    book("고린도후서", "2 Corinthians", &["고후", "2co", "2cor"]),
    book("갈라디아서", "Galatians", &["갈", "gal"]),
    book("에베소서", "Ephesians", &["엡", "eph"]),
    book("빌립보서", "Philippians", &["빌", "php"]),
    book("골로새서", "Colossians", &["골", "col"]),
    book("데살로니가전서", "1 Thessalonians", &["살전", "1th", "1thess"]),
    book("데살로니가후서", "2 Thessalonians", &["살후", "2th", "2thess"]),
    book("디모데전서", "1 Timothy", &["딤전", "1ti", "1tim"]),
    book("디모데후서", "2 Timothy", &["딤후", "2ti", "2tim"]),
    book("디도서", "Titus", &["딛", "tit"]),
    book("빌레몬서", "Philemon", &["몬", "phm"]),
    book("히브리서", "Hebrews", &["히", "heb"]),
    book("야고보서", "James", &["약", "jas"]),
    book("베드로전서", "1 Peter", &["벧전", "1pe", "1pet"]),
    book("베드로후서", "2 Peter", &["벧후", "2pe", "2pet"]),
    book("요한일서", "1 John", &["요일", "1jn"]),
    book("요한이서", "2 John", &["요이", "2jn"]),
    book("요한삼서", "3 John", &["요삼", "3jn"]),
    book("유다서", "Jude", &["유", "jud"]),
    book("요한계시록", "Revelation", &["계", "계시록", "rev"]),
];

/// Number of books at the front of the table that belong to the Old Testament.
const OLD_TESTAMENT_LEN: usize = 39;

static ALIAS_INDEX: Lazy<HashMap<String, BookId>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (position, entry) in BOOKS.iter().enumerate() {
        let id = BookId(position as u8);
        index.insert(normalize(entry.name), id);
        index.insert(normalize(entry.english), id);
        for alias in entry.aliases {
            index.insert(normalize(alias), id);
        }
    }
    index
});

/// Lower-case and drop every whitespace character.
fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve free-form book text to its canonical book.
///
/// Returns `None` when nothing matches; callers decide whether that is fatal.
pub fn resolve(input: &str) -> Option<BookId> {
    let key = normalize(input);
    if key.is_empty() {
        return None;
    }
    ALIAS_INDEX.get(&key).copied()
}

impl BookId {
    /// Book at `index` in canon order, if there is one.
    pub fn from_index(index: usize) -> Option<BookId> {
        (index < BOOKS.len()).then(|| BookId(index as u8))
    }

    /// All 66 books in canon order.
    pub fn all() -> impl Iterator<Item = BookId> {
        (0..BOOKS.len()).map(|i| BookId(i as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Canonical name; also the file stem used by directory-backed sources.
    pub fn name(self) -> &'static str {
        BOOKS[self.index()].name
    }

    pub fn english_name(self) -> &'static str {
        BOOKS[self.index()].english
    }

    pub fn is_old_testament(self) -> bool {
        self.index() < OLD_TESTAMENT_LEN
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for BookId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
