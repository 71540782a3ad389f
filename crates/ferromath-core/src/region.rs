use ferromath_syntax::{TextRange, TextSize};
use serde::Serialize;

/// Which delimiter pair bounds a [`MathRegion`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "camelCase")]
pub enum RegionKind {
    /// `$$ ... $$`
    DisplayDollar,
    /// `$ ... $`
    InlineDollar,
    /// `\[ ... \]`
    DisplayBracket,
    /// `\( ... \)`
    InlineParen,
    /// `\begin{name} ... \end{name}`
    Environment(String),
}

impl RegionKind {
    /// Byte lengths of the opening and closing delimiters.
    pub fn delimiter_lengths(&self) -> (usize, usize) {
        match self {
            RegionKind::DisplayDollar => (2, 2),
            RegionKind::InlineDollar => (1, 1),
            RegionKind::DisplayBracket | RegionKind::InlineParen => (2, 2),
            RegionKind::Environment(name) => {
                (r"\begin{}".len() + name.len(), r"\end{}".len() + name.len())
            }
        }
    }

    pub fn is_display(&self) -> bool {
        !matches!(self, RegionKind::InlineDollar | RegionKind::InlineParen)
    }
}

/// A span of a document enclosed by a math delimiter pair, delimiters
/// included.
///
/// `text` is always `document[start_offset..end_offset]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathRegion {
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
    pub kind: RegionKind,
}

impl MathRegion {
    pub(crate) fn new(document: &str, start: usize, end: usize, kind: RegionKind) -> Self {
        Self {
            start_offset: start,
            end_offset: end,
            text: document[start..end].to_string(),
            kind,
        }
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(size(self.start_offset), size(self.end_offset))
    }

    /// Inclusive on both ends: the offsets just before the opening delimiter
    /// and just after the closing one both count as inside.
    pub fn contains(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset <= self.end_offset
    }

    /// The text between the delimiters.
    pub fn content(&self) -> &str {
        let (open, close) = self.kind.delimiter_lengths();
        &self.text[open..self.text.len() - close]
    }

    /// Absolute span of [`MathRegion::content`].
    pub fn content_range(&self) -> TextRange {
        let (open, close) = self.kind.delimiter_lengths();
        TextRange::new(
            size(self.start_offset + open),
            size(self.end_offset - close),
        )
    }

    /// Converts a document offset to an offset into `text`.
    pub fn to_local(&self, offset: usize) -> Option<usize> {
        self.contains(offset).then(|| offset - self.start_offset)
    }

    /// Converts an offset into `text` to a document offset.
    pub fn to_absolute(&self, local: usize) -> usize {
        self.start_offset + local
    }
}

fn size(offset: usize) -> TextSize {
    TextSize::from(offset as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_content() {
        let doc = r"see \begin{align}x=1\end{align}.";
        let region = MathRegion::new(doc, 4, 31, RegionKind::Environment("align".into()));
        assert_eq!(region.text, r"\begin{align}x=1\end{align}");
        assert_eq!(region.content(), "x=1");
        assert_eq!(u32::from(region.content_range().start()), 17);
    }

    #[test]
    fn test_local_offsets() {
        let region = MathRegion::new("a $x$ b", 2, 5, RegionKind::InlineDollar);
        assert_eq!(region.content(), "x");
        assert_eq!(region.to_local(5), Some(3));
        assert_eq!(region.to_local(6), None);
        assert_eq!(region.to_absolute(1), 3);
        assert!(!region.kind.is_display());
    }
}
