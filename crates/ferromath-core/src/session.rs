use crate::autobrace::{AutoBraceCandidate, AutoBraceDetector};
use crate::config::Config;
use crate::jump_points::{compute_jump_points, next_jump_point, previous_jump_point};
use crate::locator::locate_math_region;
use crate::region::MathRegion;
use crate::splitter::split_equation_with;
use ferromath_syntax::{TextRange, TextSize};
use serde::Serialize;
use std::borrow::Cow;

/// A replacement of `document[start..end]` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

impl TextEdit {
    pub fn range(&self) -> TextRange {
        TextRange::new(
            TextSize::from(self.start as u32),
            TextSize::from(self.end as u32),
        )
    }

    pub fn apply(&self, document: &str) -> String {
        format!(
            "{}{}{}",
            &document[..self.start],
            self.new_text,
            &document[self.end..]
        )
    }
}

/// The engine as seen by one editor session (typically one open document).
///
/// Holds the session's [`Config`] and the auto-bracing escape flag, so
/// sessions never observe each other's state.
#[derive(Debug, Default)]
pub struct MathSession {
    config: Config,
    auto_brace: AutoBraceDetector,
}

impl MathSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            auto_brace: AutoBraceDetector::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locate_math_region(&self, text: &str, offset: usize) -> Option<MathRegion> {
        locate_math_region(text, offset, &self.config.locator)
    }

    pub fn compute_jump_points(&self, region_text: &str) -> Vec<usize> {
        compute_jump_points(region_text)
    }

    pub fn split_equation<'a>(&self, region_text: &'a str) -> Cow<'a, str> {
        split_equation_with(region_text, &self.config.split)
    }

    pub fn on_character_inserted(
        &mut self,
        line_text: &str,
        insertion_end: usize,
    ) -> Option<AutoBraceCandidate> {
        let candidate = self
            .auto_brace
            .on_character_inserted(line_text, insertion_end);
        candidate.filter(|_| self.config.auto_brace)
    }

    pub fn on_text_changed(
        &mut self,
        inserted: &str,
        line_text: &str,
        insertion_end: usize,
    ) -> Option<AutoBraceCandidate> {
        let candidate = self
            .auto_brace
            .on_text_changed(inserted, line_text, insertion_end);
        candidate.filter(|_| self.config.auto_brace)
    }

    pub fn set_escape_flag(&mut self) {
        self.auto_brace.set_escape_flag();
    }

    /// Document offset of the next structural stop after `offset` in the
    /// surrounding math region.
    pub fn next_structural_position(&self, text: &str, offset: usize) -> Option<usize> {
        let region = self.locate_math_region(text, offset)?;
        let points = compute_jump_points(&region.text);
        let local = region.to_local(offset)?;
        next_jump_point(&points, local).map(|p| region.to_absolute(p))
    }

    /// Document offset of the previous structural stop before `offset` in the
    /// surrounding math region.
    pub fn previous_structural_position(&self, text: &str, offset: usize) -> Option<usize> {
        let region = self.locate_math_region(text, offset)?;
        let points = compute_jump_points(&region.text);
        let local = region.to_local(offset)?;
        previous_jump_point(&points, local).map(|p| region.to_absolute(p))
    }

    /// The edit splitting the math region around `offset`, or `None` when the
    /// offset is not in math or there is nothing to split.
    pub fn split_at(&self, text: &str, offset: usize) -> Option<TextEdit> {
        let region = self.locate_math_region(text, offset)?;
        match self.split_equation(&region.text) {
            Cow::Borrowed(_) => None,
            Cow::Owned(new_text) => Some(TextEdit {
                start: region.start_offset,
                end: region.end_offset,
                new_text,
            }),
        }
    }

    /// Span of the math region around `offset`, delimiters included.
    pub fn select_math_region(&self, text: &str, offset: usize) -> Option<TextRange> {
        self.locate_math_region(text, offset).map(|r| r.range())
    }
}
