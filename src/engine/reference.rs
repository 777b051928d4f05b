//! Scripture reference formatting and recognition
//!
//! `format_reference` produces the canonical display string for a selected
//! passage. `find_reference_spans` locates chapter:verse patterns inside
//! arbitrary text so the wrapper can keep them on one line.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::ops::Range;

lazy_static! {
    /// `N:N - N:N`, dash optionally spaced
    static ref RANGE_PATTERN: Regex =
        Regex::new(r"[0-9]+:[0-9]+\s*-\s*[0-9]+:[0-9]+").expect("range pattern is valid");
    /// `N:N`, `N:N-N`, `N:N-N:N`
    static ref SINGLE_PATTERN: Regex =
        Regex::new(r"[0-9]+:[0-9]+(?:-[0-9]+(?::[0-9]+)?)?").expect("single pattern is valid");
}

/// A passage selected by the host: book, chapter, verse and optional end verse.
///
/// `end_verse`, when present, is expected to be `>= verse`. An end verse
/// equal to the start verse denotes a single verse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptureReference {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub end_verse: Option<u32>,
}

impl ScriptureReference {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            end_verse: None,
        }
    }

    pub fn range(book: impl Into<String>, chapter: u32, verse: u32, end_verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            end_verse: Some(end_verse),
        }
    }

    /// True when the reference spans more than one verse
    pub fn is_range(&self) -> bool {
        is_range_reference(self)
    }
}

impl fmt::Display for ScriptureReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_verse {
            Some(end) if end != self.verse => {
                write!(f, "{} {}:{}-{}", self.book, self.chapter, self.verse, end)
            }
            _ => write!(f, "{} {}:{}", self.book, self.chapter, self.verse),
        }
    }
}

/// Canonical display string: `"John 3:16"` or `"John 3:16-18"`
pub fn format_reference(reference: &ScriptureReference) -> String {
    reference.to_string()
}

pub fn is_range_reference(reference: &ScriptureReference) -> bool {
    matches!(reference.end_verse, Some(end) if end != reference.verse)
}

/// Parse the host's `<chapter>:<verse>[-<end>]` notation.
///
/// Returns `None` for anything that does not have that exact shape or that
/// uses a zero chapter or verse.
pub fn parse_chapter_verse(book: &str, notation: &str) -> Option<ScriptureReference> {
    let (chapter, verses) = notation.trim().split_once(':')?;
    let chapter: u32 = chapter.parse().ok()?;
    let (verse, end_verse) = match verses.split_once('-') {
        Some((start, end)) => (start.parse().ok()?, Some(end.parse().ok()?)),
        None => (verses.parse().ok()?, None),
    };
    if chapter == 0 || verse == 0 || book.trim().is_empty() {
        return None;
    }

    Some(ScriptureReference {
        book: book.trim().to_string(),
        chapter,
        verse,
        end_verse,
    })
}

/// Byte ranges of every chapter:verse span in `text`, ordered by position.
///
/// Range-shaped spans (`1:4 - 1:9`) are collected first. A shorter match
/// that overlaps an already collected range is dropped.
pub fn find_reference_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = RANGE_PATTERN.find_iter(text).map(|m| m.range()).collect();
    let ranges = spans.len();

    for candidate in SINGLE_PATTERN.find_iter(text) {
        let overlapped = spans[..ranges]
            .iter()
            .any(|span| candidate.start() < span.end && span.start < candidate.end());
        if !overlapped {
            spans.push(candidate.range());
        }
    }

    spans.sort_by_key(|span| span.start);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_verse() {
        let reference = ScriptureReference::new("John", 3, 16);
        assert_eq!(format_reference(&reference), "John 3:16");
    }

    #[test]
    fn test_format_range() {
        let reference = ScriptureReference::range("John", 3, 16, 18);
        assert_eq!(format_reference(&reference), "John 3:16-18");
    }

    #[test]
    fn test_format_equal_end_verse_has_no_dash() {
        let reference = ScriptureReference::range("John", 3, 16, 16);
        assert_eq!(format_reference(&reference), "John 3:16");
        assert!(!is_range_reference(&reference));
    }

    #[test]
    fn test_is_range_reference() {
        assert!(!ScriptureReference::new("Psalms", 23, 1).is_range());
        assert!(ScriptureReference::range("Psalms", 23, 1, 6).is_range());
    }

    #[test]
    fn test_unicode_book_name() {
        let reference = ScriptureReference::range("요한복음", 3, 16, 18);
        assert_eq!(reference.to_string(), "요한복음 3:16-18");
    }

    #[test]
    fn test_parse_chapter_verse() {
        assert_eq!(
            parse_chapter_verse("John", "3:16"),
            Some(ScriptureReference::new("John", 3, 16))
        );
        assert_eq!(
            parse_chapter_verse("John", "3:16-18"),
            Some(ScriptureReference::range("John", 3, 16, 18))
        );
        assert_eq!(parse_chapter_verse("John", "3"), None);
        assert_eq!(parse_chapter_verse("John", "0:1"), None);
        assert_eq!(parse_chapter_verse("", "3:16"), None);
        assert_eq!(parse_chapter_verse("John", "3:x"), None);
    }

    #[test]
    fn test_spans_single_reference() {
        let text = "John 3:16";
        let spans = find_reference_spans(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], "3:16");
    }

    #[test]
    fn test_spans_short_range() {
        let text = "read 3:16-18 today";
        let spans = find_reference_spans(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].clone()], "3:16-18");
    }

    #[test]
    fn test_spans_spaced_range_wins_over_singles() {
        let text = "Genesis 1:4 - 1:9 and 2:1";
        let spans = find_reference_spans(text);
        let found: Vec<&str> = spans.iter().map(|s| &text[s.clone()]).collect();
        assert_eq!(found, vec!["1:4 - 1:9", "2:1"]);
    }

    #[test]
    fn test_spans_cross_chapter_range() {
        let text = "1:4-2:9";
        let spans = find_reference_spans(text);
        assert_eq!(spans, vec![0..7]);
    }

    #[test]
    fn test_spans_sorted_by_position() {
        let text = "5:1 then 1:2 - 1:3";
        let spans = find_reference_spans(text);
        let found: Vec<&str> = spans.iter().map(|s| &text[s.clone()]).collect();
        assert_eq!(found, vec!["5:1", "1:2 - 1:3"]);
    }

    #[test]
    fn test_single_overlapping_range_tail_is_dropped() {
        // "5:1" ends inside the range "1:2 - 3:4" that starts at byte 2
        let text = "5:1:2 - 3:4";
        let spans = find_reference_spans(text);
        assert_eq!(spans, vec![2..11]);
    }

    #[test]
    fn test_no_spans_in_plain_text() {
        assert!(find_reference_spans("Grace upon grace").is_empty());
        assert!(find_reference_spans("10: 30").is_empty());
    }
}
