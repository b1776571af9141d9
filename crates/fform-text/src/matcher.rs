#![forbid(unsafe_code)]

//! Patterns that locate tokens inside a string.
//!
//! A [`Matcher`] reports the byte range of the first occurrence at or after a
//! given offset. Ranges must lie on `char` boundaries inside the haystack.
//!
//! # Example
//! ```
//! use fform_text::{Delimited, Matcher};
//!
//! let stars = Delimited::new("*", "*");
//! assert_eq!(stars.find_at("use *bfast* today", 0), Some(4..11));
//! assert_eq!("bfast".find_at("use *bfast* today", 0), Some(5..10));
//! ```

use std::ops::Range;

/// Locates occurrences of a pattern.
pub trait Matcher {
    /// Byte range of the first match starting at or after `from`, if any.
    ///
    /// `from` is always a `char` boundary no greater than `haystack.len()`.
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>>;
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        (**self).find_at(haystack, from)
    }
}

/// Exact substring match. An empty needle never matches.
impl Matcher for str {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        if self.is_empty() {
            return None;
        }
        let pos = haystack.get(from..)?.find(self)?;
        let start = from + pos;
        Some(start..start + self.len())
    }
}

impl Matcher for String {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        self.as_str().find_at(haystack, from)
    }
}

impl Matcher for char {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        let pos = haystack.get(from..)?.find(*self)?;
        let start = from + pos;
        Some(start..start + self.len_utf8())
    }
}

/// Owned exact-substring matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(pub String);

impl Literal {
    /// Create a literal matcher.
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self(needle.into())
    }
}

impl Matcher for Literal {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        self.0.find_at(haystack, from)
    }
}

/// Case-insensitive substring match using simple ASCII lowering.
///
/// Non-ASCII characters must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseInsensitive(String);

impl CaseInsensitive {
    /// Create a case-insensitive matcher.
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self(needle.into())
    }
}

impl Matcher for CaseInsensitive {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        let needle = self.0.as_bytes();
        if needle.is_empty() {
            return None;
        }
        let bytes = haystack.as_bytes();
        let last_start = bytes.len().checked_sub(needle.len())?;
        // Byte-wise comparison only equates ASCII letters, so a match always
        // starts on the leading byte of a char.
        (from..=last_start)
            .find(|&i| bytes[i..i + needle.len()].eq_ignore_ascii_case(needle))
            .map(|start| start..start + needle.len())
    }
}

/// A run opened by `open` and closed by the next `close`, both included.
///
/// An `open` with no matching `close` is not a match. Translation phrases use
/// this to mark highlighted words, e.g. `"Use *bfast* to order"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimited {
    open: String,
    close: String,
}

impl Delimited {
    /// Create a delimited matcher. Empty delimiters never match.
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// The text between the delimiters of a matched token.
    ///
    /// Returns the token unchanged if it is not delimited.
    #[must_use]
    pub fn inner<'a>(&self, token: &'a str) -> &'a str {
        token
            .strip_prefix(self.open.as_str())
            .and_then(|rest| rest.strip_suffix(self.close.as_str()))
            .unwrap_or(token)
    }
}

impl Matcher for Delimited {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        if self.open.is_empty() || self.close.is_empty() {
            return None;
        }
        let open = self.open.find_at(haystack, from)?;
        let close = self.close.find_at(haystack, open.end)?;
        Some(open.start..close.end)
    }
}

#[cfg(feature = "regex")]
impl Matcher for regex::Regex {
    fn find_at(&self, haystack: &str, from: usize) -> Option<Range<usize>> {
        regex::Regex::find_at(self, haystack, from).map(|m| m.range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_finds_from_offset() {
        let hay = "hello world hello";
        assert_eq!("hello".find_at(hay, 0), Some(0..5));
        assert_eq!("hello".find_at(hay, 1), Some(12..17));
        assert_eq!("hello".find_at(hay, 13), None);
        assert_eq!("".find_at(hay, 0), None);
    }

    #[test]
    fn str_out_of_range_offset_is_no_match() {
        assert_eq!("a".find_at("abc", 10), None);
    }

    #[test]
    fn char_handles_multibyte() {
        assert_eq!('é'.find_at("café!", 0), Some(3..5));
    }

    #[test]
    fn case_insensitive_ascii() {
        let m = CaseInsensitive::new("BFast");
        assert_eq!(m.find_at("Try bfast or BFAST", 0), Some(4..9));
        assert_eq!(m.find_at("Try bfast or BFAST", 5), Some(13..18));
        assert_eq!(m.find_at("bfas", 0), None);
    }

    #[test]
    fn case_insensitive_with_unicode_haystack() {
        let m = CaseInsensitive::new("ok");
        assert_eq!(m.find_at("日本 OK", 0), Some(7..9));
    }

    #[test]
    fn delimited_takes_nearest_close() {
        let m = Delimited::new("*", "*");
        let hay = "a *b* c *d*";
        assert_eq!(m.find_at(hay, 0), Some(2..5));
        assert_eq!(m.find_at(hay, 5), Some(8..11));
    }

    #[test]
    fn delimited_unclosed_is_no_match() {
        let m = Delimited::new("[", "]");
        assert_eq!(m.find_at("open [only", 0), None);
    }

    #[test]
    fn delimited_inner() {
        let m = Delimited::new("<b>", "</b>");
        assert_eq!(m.inner("<b>bfast</b>"), "bfast");
        assert_eq!(m.inner("plain"), "plain");
    }

    #[cfg(feature = "regex")]
    #[test]
    fn regex_matcher() {
        let re = regex::Regex::new(r"\d+").unwrap();
        assert_eq!(Matcher::find_at(&re, "abc 123 def 45", 0), Some(4..7));
        assert_eq!(Matcher::find_at(&re, "abc 123 def 45", 7), Some(12..14));
    }
}
