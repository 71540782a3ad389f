use crate::error::{Error, Result};
use ferromath_syntax::SourceBuffer;

/// A cursor position as an editor collaborator may report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// UTF-8 byte offset.
    Offset(usize),
    /// Absolute UTF-16 code unit offset.
    Utf16Offset(usize),
    /// Zero-based line and byte column.
    LineCol { line: u32, col: u32 },
    /// Zero-based line and UTF-16 column.
    Utf16LineCol { line: u32, col: u32 },
}

impl Position {
    /// Resolves the position to a byte offset into `buffer`.
    pub fn resolve(self, buffer: &SourceBuffer) -> Result<usize> {
        let offset = match self {
            Position::Offset(offset) => (offset <= buffer.len()
                && buffer.text().is_char_boundary(offset))
            .then_some(offset),
            Position::Utf16Offset(units) => buffer.offset_from_utf16_offset(units),
            Position::LineCol { line, col } => buffer.offset(line, col),
            Position::Utf16LineCol { line, col } => buffer.offset_from_utf16(line, col),
        };
        offset.ok_or(Error::InvalidPosition(self))
    }
}
