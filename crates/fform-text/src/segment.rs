#![forbid(unsafe_code)]

//! Splitting text into plain and matched segments.
//!
//! [`segment`] scans a source string left to right for non-overlapping
//! occurrences of a [`Matcher`] and yields [`TextSegment`]s that partition the
//! source exactly: concatenating every segment's text reproduces the input.
//!
//! # Example
//! ```
//! use fform_text::{TextSegment, segment};
//!
//! let parts: Vec<_> = segment("order with bfast, pay with bfast", "bfast").collect();
//! assert_eq!(
//!     parts,
//!     [
//!         TextSegment::plain("order with "),
//!         TextSegment::matched("bfast", 0),
//!         TextSegment::plain(", pay with "),
//!         TextSegment::matched("bfast", 1),
//!     ]
//! );
//! ```

use std::iter::FusedIterator;
use std::ops::Range;

use crate::matcher::Matcher;

/// A contiguous slice of the source, classified as plain text or a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSegment<'a> {
    /// Text between matches.
    Plain { text: &'a str },
    /// A matched token and its 0-based ordinal among all matches.
    Match { text: &'a str, index: usize },
}

impl<'a> TextSegment<'a> {
    /// Create a plain segment.
    #[inline]
    #[must_use]
    pub const fn plain(text: &'a str) -> Self {
        Self::Plain { text }
    }

    /// Create a match segment.
    #[inline]
    #[must_use]
    pub const fn matched(text: &'a str, index: usize) -> Self {
        Self::Match { text, index }
    }

    /// The segment's text.
    #[inline]
    #[must_use]
    pub const fn text(&self) -> &'a str {
        match *self {
            Self::Plain { text } | Self::Match { text, .. } => text,
        }
    }

    /// Returns `true` for match segments.
    #[inline]
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match { .. })
    }

    /// Match ordinal, for match segments.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match *self {
            Self::Match { index, .. } => Some(index),
            Self::Plain { .. } => None,
        }
    }

    /// Stable list key for a match segment: the match text followed by its index.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Match { text, index } => Some(format!("{text}{index}")),
            Self::Plain { .. } => None,
        }
    }
}

/// Segment `source` by `pattern`.
///
/// The returned iterator is lazy and holds no state beyond the scan position;
/// calling `segment` again restarts from the beginning. An empty source yields
/// nothing. Zero-length matches are skipped.
#[must_use]
pub fn segment<'a, 'p, M: Matcher + ?Sized>(source: &'a str, pattern: &'p M) -> Segments<'a, 'p, M> {
    Segments {
        source,
        pattern,
        pos: 0,
        next_index: 0,
        pending: None,
    }
}

/// Iterator over the segments of a string. Created by [`segment`].
#[derive(Debug)]
pub struct Segments<'a, 'p, M: ?Sized> {
    source: &'a str,
    pattern: &'p M,
    pos: usize,
    next_index: usize,
    pending: Option<Range<usize>>,
}

impl<M: ?Sized> Clone for Segments<'_, '_, M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            pattern: self.pattern,
            pos: self.pos,
            next_index: self.next_index,
            pending: self.pending.clone(),
        }
    }
}

impl<'a, M: Matcher + ?Sized> Segments<'a, '_, M> {
    /// Number of match segments yielded so far.
    #[must_use]
    pub fn matches_seen(&self) -> usize {
        self.next_index
    }

    /// Next non-empty match at or after `from`.
    fn find_from(&self, mut from: usize) -> Option<Range<usize>> {
        let len = self.source.len();
        loop {
            let found = self.pattern.find_at(self.source, from)?;
            if found.start < from
                || found.end > len
                || found.start > found.end
                || !self.source.is_char_boundary(found.start)
                || !self.source.is_char_boundary(found.end)
            {
                tracing::warn!(
                    from,
                    start = found.start,
                    end = found.end,
                    "matcher returned an invalid range; treating as no match"
                );
                return None;
            }
            if !found.is_empty() {
                return Some(found);
            }
            // Step over one char past an empty match so the scan progresses.
            let step = self.source[found.start..].chars().next()?.len_utf8();
            from = found.start + step;
        }
    }

    fn emit_match(&mut self, range: Range<usize>) -> TextSegment<'a> {
        let index = self.next_index;
        self.next_index += 1;
        self.pos = range.end;
        TextSegment::matched(&self.source[range], index)
    }
}

impl<'a, M: Matcher + ?Sized> Iterator for Segments<'a, '_, M> {
    type Item = TextSegment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(range) = self.pending.take() {
            return Some(self.emit_match(range));
        }
        if self.pos >= self.source.len() {
            return None;
        }
        match self.find_from(self.pos) {
            Some(range) if range.start == self.pos => Some(self.emit_match(range)),
            Some(range) => {
                let plain = &self.source[self.pos..range.start];
                self.pos = range.start;
                self.pending = Some(range);
                Some(TextSegment::plain(plain))
            }
            None => {
                let plain = &self.source[self.pos..];
                self.pos = self.source.len();
                Some(TextSegment::plain(plain))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.source.len() - self.pos;
        let lower = usize::from(self.pending.is_some() || remaining > 0);
        // Every segment covers at least one byte.
        (lower, Some(remaining))
    }
}

impl<M: Matcher + ?Sized> FusedIterator for Segments<'_, '_, M> {}

/// A piece of a rebuilt phrase: original text or a caller-built node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<'a, T> {
    Text(&'a str),
    Node(T),
}

/// Splice caller-built nodes into `source` wherever `pattern` matches.
///
/// `build` receives the matched text and its ordinal. Plain text passes
/// through as [`Fragment::Text`].
///
/// # Example
/// ```
/// use fform_text::{Delimited, Fragment, replace_with};
///
/// let stars = Delimited::new("*", "*");
/// let parts = replace_with("Sign in with *bfast*", &stars, |token, _| {
///     stars.inner(token).to_uppercase()
/// });
/// assert_eq!(parts, [Fragment::Text("Sign in with "), Fragment::Node("BFAST".to_string())]);
/// ```
pub fn replace_with<'a, M, T, F>(source: &'a str, pattern: &M, mut build: F) -> Vec<Fragment<'a, T>>
where
    M: Matcher + ?Sized,
    F: FnMut(&'a str, usize) -> T,
{
    segment(source, pattern)
        .map(|seg| match seg {
            TextSegment::Plain { text } => Fragment::Text(text),
            TextSegment::Match { text, index } => Fragment::Node(build(text, index)),
        })
        .collect()
}
