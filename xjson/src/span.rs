//! Byte ranges into the parsed input.

use core::fmt;

/// A byte range in the input buffer a value was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a span from an offset and a length.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Create a span covering `start..end`.
    pub const fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            offset: start,
            len: end - start,
        }
    }

    /// Offset one past the last byte.
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether the span covers no bytes.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes this span covers in `source`, if it is in bounds.
    pub fn slice<'a>(&self, source: &'a [u8]) -> Option<&'a [u8]> {
        source.get(self.offset..self.end())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.offset, self.end())
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}
