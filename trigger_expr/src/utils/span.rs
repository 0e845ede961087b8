//! Byte-offset spans into the expression being validated
//!
//! Trigger expressions are short, single-logical-line strings, so positions are
//! tracked as plain byte offsets rather than line/column pairs. Offsets always
//! fall on UTF-8 character boundaries of the source string.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open byte range `[start, end)` in the source expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Create a span covering one character starting at `offset`
    pub fn single(offset: usize, ch: char) -> Self {
        Self::new(offset, offset + ch.len_utf8())
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if the span contains a byte offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Smallest span covering both spans
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Borrow the spanned text out of `source`, if the span is in bounds
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice_and_len() {
        let source = "{srv1:agent.ping.last(0)}=1";
        let span = Span::new(0, 25);
        assert_eq!(span.slice(source), Some("{srv1:agent.ping.last(0)}"));
        assert_eq!(span.len(), 25);
        assert!(span.contains(0));
        assert!(!span.contains(25));
        assert_eq!(Span::new(30, 40).slice(source), None);
    }

    #[test]
    fn test_single_char_span_is_utf8_aware() {
        let span = Span::single(3, 'é');
        assert_eq!(span.len(), 2);
    }

    #[test]
    fn test_merge() {
        let merged = Span::new(4, 6).merge(Span::new(1, 5));
        assert_eq!(merged, Span::new(1, 6));
        assert_eq!(merged.to_string(), "1..6");
    }
}
