//! Spans and Positions
//!
//! Byte ranges into source text and human-facing line/column positions.
//! No editing logic or RPC concerns - pure data representation.

/// A half-open byte range into a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first included byte
    pub start: usize,
    /// Byte offset one past the last included byte
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span usable as an insertion point
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A position in a source document
///
/// Lines are 1-based, columns are 0-based character counts. The wire format
/// carries 1-based columns; the RPC boundary subtracts one before lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}
