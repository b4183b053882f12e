//! Span - offset and length into a document's text buffer
//!
//! Character data of a deferred document lives in one append-only buffer;
//! nodes reference their payload as a span into it.

use std::ops::Range;

/// A span referencing a portion of the text buffer.
///
/// Size: 8 bytes (offset: 4 bytes, len: 4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Span {
    /// Byte offset into the text buffer
    pub offset: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create an empty span (used for "no value")
    #[inline]
    pub const fn empty() -> Self {
        Self { offset: 0, len: 0 }
    }

    /// Check if this span is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the end offset (exclusive)
    #[inline]
    pub const fn end(&self) -> u32 {
        self.offset.saturating_add(self.len)
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset as usize..self.end() as usize
    }

    /// Extract the text from the buffer; out-of-range spans read as empty
    #[inline]
    pub fn as_str<'a>(&self, buffer: &'a str) -> &'a str {
        buffer.get(self.range()).unwrap_or("")
    }
}
