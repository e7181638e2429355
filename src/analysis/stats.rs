//! Paragraph, word, and character counting.
//!
//! These are intentionally simple, non-locale-aware definitions. Stored
//! results depend on them, so changing any rule changes output compatibility.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::TextStatistics;

/// Maximal runs of Unicode word characters (letters, digits, connector punctuation).
static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

/// Compute all statistics for a decoded text.
pub fn compute(text: &str) -> TextStatistics {
    TextStatistics {
        paragraph_count: count_paragraphs(text),
        word_count: count_words(text),
        character_count: count_characters(text),
    }
}

/// Count blank-line separated paragraphs.
///
/// `\r\n` and lone `\r` are normalized to `\n`, the text is split on `\n\n`,
/// and empty fragments are dropped.
pub fn count_paragraphs(text: &str) -> u64 {
    let normalized = normalize_line_endings(text);
    normalized
        .split("\n\n")
        .filter(|fragment| !fragment.is_empty())
        .count() as u64
}

/// Count maximal runs of word characters.
pub fn count_words(text: &str) -> u64 {
    WORD_PATTERN.find_iter(text).count() as u64
}

/// Count characters, excluding `\r` so the result does not depend on line-ending style.
pub fn count_characters(text: &str) -> u64 {
    text.chars().filter(|&c| c != '\r').count() as u64
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs() {
        assert_eq!(count_paragraphs("a\n\nb"), 2);
        assert_eq!(count_paragraphs("a\nb"), 1);
        assert_eq!(count_paragraphs(""), 0);
        assert_eq!(count_paragraphs("a\r\n\r\nb"), 2);
    }

    #[test]
    fn test_paragraphs_single_block() {
        assert_eq!(count_paragraphs("just one line"), 1);
        assert_eq!(count_paragraphs("line one\nline two\nline three"), 1);
    }

    #[test]
    fn test_paragraphs_mixed_line_endings() {
        assert_eq!(count_paragraphs("a\r\rb"), 2);
        assert_eq!(count_paragraphs("a\r\n\nb\n\r\nc"), 3);
    }

    #[test]
    fn test_paragraphs_leading_and_trailing_separators() {
        assert_eq!(count_paragraphs("\n\na\n\nb\n\n"), 2);
        assert_eq!(count_paragraphs("\n\n"), 0);
        assert_eq!(count_paragraphs("a\n\n\n\nb"), 2);
    }

    #[test]
    fn test_words() {
        assert_eq!(count_words("hello, world! 123"), 3);
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("---"), 0);
    }

    #[test]
    fn test_words_unicode_and_underscore() {
        assert_eq!(count_words("snake_case identifiers"), 2);
        assert_eq!(count_words("привет мир"), 2);
        assert_eq!(count_words("naïve café"), 2);
        assert_eq!(count_words("it's"), 2);
        assert_eq!(count_words("a-b-c"), 3);
    }

    #[test]
    fn test_characters() {
        assert_eq!(count_characters("ab\r\ncd"), 5);
        assert_eq!(count_characters("ab cd\n"), 6);
        assert_eq!(count_characters(""), 0);
    }

    #[test]
    fn test_characters_count_scalar_values_not_bytes() {
        assert_eq!(count_characters("héllo"), 5);
        assert_eq!(count_characters("日本"), 2);
    }

    #[test]
    fn test_compute_combines_counts() {
        let stats = compute("First paragraph here.\r\n\r\nSecond one.");
        assert_eq!(
            stats,
            TextStatistics {
                paragraph_count: 2,
                word_count: 5,
                character_count: 34,
            }
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let text = "alpha beta\n\ngamma";
        assert_eq!(compute(text), compute(text));
    }
}
