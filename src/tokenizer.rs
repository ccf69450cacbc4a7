//! Lossless word tokenization for narration lines.
//!
//! Text is split into alternating maximal runs of word characters (Unicode
//! letters `L` and numbers `N`) and everything else (whitespace, punctuation,
//! combining marks).
//! Concatenating the tokens in order gives back the input exactly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Runs of letters and numbers (`word`), or runs of anything else. Combining
/// marks fall in the second group.
static TOKEN_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<word>[\p{L}\p{N}]+)|[^\p{L}\p{N}]+").expect("token pattern compiles")
});

/// A run of word or non-word characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub text: String,
    pub is_word: bool,
}

impl Token {
    /// Length in `char`s, the unit narration backends report offsets in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into word / non-word tokens.
///
/// # Example
/// ```rust
/// use versecast::tokenize;
///
/// let tokens = tokenize("하나님이, 세상을");
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, vec!["하나님이", ", ", "세상을"]);
/// assert!(tokens[0].is_word && !tokens[1].is_word);
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RUN
        .captures_iter(text)
        .map(|caps| Token {
            text: caps[0].to_string(),
            is_word: caps.name("word").is_some(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_alternates_runs() {
        let tokens = tokenize("In the beginning, God.");
        let expected = [
            ("In", true),
            (" ", false),
            ("the", true),
            (" ", false),
            ("beginning", true),
            (", ", false),
            ("God", true),
            (".", false),
        ];
        assert_eq!(tokens.len(), expected.len());
        for (token, (text, is_word)) in tokens.iter().zip(expected) {
            assert_eq!(token.text, text);
            assert_eq!(token.is_word, is_word);
        }
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_only_punctuation() {
        let tokens = tokenize(" ... !? ");
        assert_eq!(tokens.len(), 1);
        assert!(!tokens[0].is_word);
        assert_eq!(joined(&tokens), " ... !? ");
    }

    #[test]
    fn test_tokenize_mixed_scripts_and_digits() {
        let tokens = tokenize("요한복음 3장 16절. 하나님이");
        let words: Vec<&str> =
            tokens.iter().filter(|t| t.is_word).map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["요한복음", "3장", "16절", "하나님이"]);
    }

    #[test]
    fn test_tokenize_reconstructs_input() {
        for input in [
            "",
            "word",
            "  leading and trailing  ",
            "「말씀」이 육신이 되어—우리 가운데 거하시매",
            "Ἐν ἀρχῇ ἦν ὁ λόγος,",
            "tabs\tand\nnewlines",
            "(구절 없음)",
        ] {
            assert_eq!(joined(&tokenize(input)), input);
        }
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let tokens = tokenize("말씀");
        assert_eq!(tokens[0].char_len(), 2);
    }

    #[test]
    fn test_combining_marks_are_not_word_characters() {
        // U+093F DEVANAGARI VOWEL SIGN I is a spacing mark, not a letter.
        let tokens = tokenize("कि");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "क");
        assert!(tokens[0].is_word);
        assert_eq!(tokens[1].text, "\u{093F}");
        assert!(!tokens[1].is_word);
    }
}
