use crate::{TextRange, TextSize};
use line_index::{LineCol, LineIndex, WideEncoding, WideLineCol};

/// An immutable document snapshot with a line/offset mapping.
///
/// The math engine works on UTF-8 byte offsets. Editors usually speak in
/// `(line, UTF-16 column)` positions or absolute UTF-16 offsets, so every
/// conversion between the two lives here and nowhere else.
///
/// ```
/// use ferromath_syntax::SourceBuffer;
///
/// let buffer = SourceBuffer::new("é\n$x$");
/// let offset = buffer.offset_from_utf16(1, 1).unwrap();
/// assert_eq!(&buffer.text()[offset..], "x$");
/// assert_eq!(buffer.utf16_position(offset), Some((1, 1)));
/// ```
#[derive(Debug)]
pub struct SourceBuffer {
    text: String,
    index: LineIndex,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let index = LineIndex::new(&text);
        Self { text, index }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text covered by `range`, if it lies on character boundaries.
    pub fn slice(&self, range: TextRange) -> Option<&str> {
        let start: usize = range.start().into();
        let end: usize = range.end().into();
        self.text.get(start..end)
    }

    /// Zero-based `(line, byte column)` of a byte offset.
    pub fn line_col(&self, offset: usize) -> Option<(u32, u32)> {
        let lc = self.index.try_line_col(to_size(offset)?)?;
        Some((lc.line, lc.col))
    }

    /// Byte offset of a zero-based `(line, byte column)` position.
    ///
    /// The column may point at the line's terminating newline but not past
    /// it.
    pub fn offset(&self, line: u32, col: u32) -> Option<usize> {
        let start: usize = self.index.offset(LineCol { line, col: 0 })?.into();
        let line_end = self.text[start..]
            .find('\n')
            .map_or(self.text.len(), |newline| start + newline);
        let offset = start.checked_add(usize::try_from(col).ok()?)?;
        if offset > line_end {
            return None;
        }
        self.checked(offset)
    }

    /// Zero-based `(line, UTF-16 column)` of a byte offset.
    pub fn utf16_position(&self, offset: usize) -> Option<(u32, u32)> {
        let lc = self.index.try_line_col(to_size(offset)?)?;
        let wide = self.index.to_wide(WideEncoding::Utf16, lc)?;
        Some((wide.line, wide.col))
    }

    /// Byte offset of a zero-based `(line, UTF-16 column)` position.
    pub fn offset_from_utf16(&self, line: u32, col: u32) -> Option<usize> {
        let lc = self
            .index
            .to_utf8(WideEncoding::Utf16, WideLineCol { line, col })?;
        self.offset(lc.line, lc.col)
    }

    /// Absolute UTF-16 code unit offset of a byte offset.
    pub fn utf16_offset(&self, offset: usize) -> Option<usize> {
        let prefix = self.text.get(..offset)?;
        Some(prefix.encode_utf16().count())
    }

    /// Byte offset of an absolute UTF-16 code unit offset.
    ///
    /// Returns `None` past the end of the document or in the middle of a
    /// surrogate pair.
    pub fn offset_from_utf16_offset(&self, utf16: usize) -> Option<usize> {
        let mut units = 0;
        for (byte, c) in self.text.char_indices() {
            if units == utf16 {
                return Some(byte);
            }
            if units > utf16 {
                return None;
            }
            units += c.len_utf16();
        }
        (units == utf16).then_some(self.text.len())
    }

    fn checked(&self, offset: usize) -> Option<usize> {
        (offset <= self.text.len() && self.text.is_char_boundary(offset)).then_some(offset)
    }
}

fn to_size(offset: usize) -> Option<TextSize> {
    u32::try_from(offset).ok().map(TextSize::from)
}
