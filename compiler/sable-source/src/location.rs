//! Source location primitives that are used to map tokens, attributes and
//! diagnostics back onto the source text they came from.

use std::fmt;

use derive_more::Constructor;

use crate::SourceId;

/// A byte range within some source, with an inclusive start and an
/// exclusive end offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange(usize, usize);

impl ByteRange {
    /// Create a [`ByteRange`] from the given start and end offsets.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(end >= start, "invalid byte range: end before start");
        Self(start, end)
    }

    /// Create a range that covers a single byte at the given offset.
    pub fn singleton(offset: usize) -> Self {
        Self::new(offset, offset + 1)
    }

    pub fn start(&self) -> usize {
        self.0
    }

    pub fn end(&self) -> usize {
        self.1
    }

    pub fn len(&self) -> usize {
        self.1 - self.0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Combine two ranges into the smallest range that covers both.
    pub fn join(self, other: Self) -> Self {
        Self::new(self.start().min(other.start()), self.end().max(other.end()))
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// A [`ByteRange`] paired with the [`SourceId`] of the source that the
/// range refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Constructor)]
pub struct Span {
    pub range: ByteRange,
    pub id: SourceId,
}

impl Span {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Join two spans over the same source.
    pub fn join(self, other: Self) -> Self {
        debug_assert!(self.id == other.id, "joining spans from different sources");
        Self { range: self.range.join(other.range), id: self.id }
    }
}

/// A borrowed view of the contents of some source, which ranges can be
/// sliced out of.
#[derive(Debug, Clone, Copy)]
pub struct SpannedSource<'s>(pub &'s str);

impl<'s> SpannedSource<'s> {
    pub fn from_string(source: &'s str) -> Self {
        Self(source)
    }

    /// Get the hunk of source text that the given range covers.
    pub fn hunk(&self, range: ByteRange) -> &'s str {
        &self.0[range.start()..range.end()]
    }
}

/// A zero-indexed row and column position within a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCol {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for RowCol {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}:{}", self.row + 1, self.col + 1)
    }
}

/// A span expressed in terms of rows and columns rather than byte offsets,
/// with both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowColSpan {
    pub start: RowCol,
    pub end: RowCol,
}

impl fmt::Display for RowColSpan {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(out, "{}", self.start)
        } else {
            write!(out, "{}-{}", self.start, self.end)
        }
    }
}

/// Compute the zero-indexed row and column of the byte at the given offset
/// within the source. Offsets past the end of the source clamp to the last
/// position.
pub fn row_col_of(offset: usize, source: &str) -> RowCol {
    let mut bytes_skipped = 0;
    let mut last = RowCol { row: 0, col: 0 };

    for (row, line) in source.split('\n').enumerate() {
        // Account for the newline that terminates the line.
        let line_width = line.len() + 1;

        if bytes_skipped + line_width > offset {
            return RowCol { row, col: (offset - bytes_skipped).min(line.len()) };
        }

        bytes_skipped += line_width;
        last = RowCol { row, col: line.len() };
    }

    last
}

#[cfg(test)]
mod test_super {
    use super::*;

    #[test]
    fn test_byte_range_join() {
        let left = ByteRange::new(0, 4);
        let right = ByteRange::new(6, 10);

        assert_eq!(left.join(right), ByteRange::new(0, 10));
        assert_eq!(right.join(left), ByteRange::new(0, 10));
    }

    #[test]
    fn test_row_col_of_positions() {
        let source = "one\ntwo\nthree";

        assert_eq!(row_col_of(0, source), RowCol { row: 0, col: 0 });
        assert_eq!(row_col_of(4, source), RowCol { row: 1, col: 0 });
        assert_eq!(row_col_of(6, source), RowCol { row: 1, col: 2 });

        // Offsets past the end clamp to the final position.
        assert_eq!(row_col_of(100, source), RowCol { row: 2, col: 5 });
    }

    #[test]
    fn test_spanned_source_hunk() {
        let source = SpannedSource::from_string("extern cpp");
        assert_eq!(source.hunk(ByteRange::new(7, 10)), "cpp");
    }
}
