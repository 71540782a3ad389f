//! Finding the math region around a cursor.
//!
//! The locator walks the document once, left to right, trying the delimiter
//! kinds at every candidate position in priority order:
//!
//! 1. `$$ ... $$`
//! 2. `$ ... $` (no `$` inside)
//! 3. `\[ ... \]`
//! 4. `\( ... \)`
//! 5. `\begin{env} ... \end{env}` for environments accepted by the
//!    [`LocatorConfig`]
//!
//! A matched region is skipped as a whole, so math nested inside another
//! region is never reported on its own. Escaped characters (`\$`, `\\[`) and
//! `%` comments never open or close a region, and same-named environments
//! nest.

use crate::config::LocatorConfig;
use crate::region::{MathRegion, RegionKind};

#[cfg(test)]
mod tests;

/// Returns the first math region whose span contains `offset` (inclusively on
/// both ends), or `None` when the offset is not inside math.
///
/// On large documents the search first runs in a window of
/// [`LocatorConfig::window`] bytes around `offset`. It falls back to the whole
/// document when the window holds no containing region, or when a delimiter
/// search ran into the end of the window before it could decide.
///
/// ```
/// use ferromath_core::{locate_math_region, LocatorConfig};
///
/// let text = r"Energy $E = mc^2$ is conserved.";
/// let region = locate_math_region(text, 10, &LocatorConfig::default()).unwrap();
/// assert_eq!(region.text, "$E = mc^2$");
/// assert_eq!(region.start_offset, 7);
/// ```
pub fn locate_math_region(text: &str, offset: usize, config: &LocatorConfig) -> Option<MathRegion> {
    if offset > text.len() {
        return None;
    }

    if let Some((from, to)) = search_window(text, offset, config.window) {
        match Matcher::new(text, to, config).find_containing(from, offset) {
            Ok(Some(region)) => return Some(region),
            Ok(None) => log::debug!(
                "No math region in window {}..{} around offset {}, scanning the whole document",
                from,
                to,
                offset
            ),
            Err(Truncated) => log::debug!(
                "Delimiter search hit the end of window {}..{}, scanning the whole document",
                from,
                to
            ),
        }
    }

    // Without a window nothing can be truncated.
    Matcher::new(text, text.len(), config)
        .find_containing(0, offset)
        .unwrap_or(None)
}

/// The `(from, to)` byte range of the first search, or `None` when the
/// document is small enough to scan whole.
///
/// `from` is moved back to the start of a paragraph so the scan never begins
/// in the middle of a region.
fn search_window(text: &str, offset: usize, window: usize) -> Option<(usize, usize)> {
    if window == 0 || text.len() <= window.saturating_mul(2) {
        return None;
    }
    let from = paragraph_start(text, floor_char_boundary(text, offset.saturating_sub(window)));
    let to = ceil_char_boundary(text, offset.saturating_add(window).min(text.len()));
    Some((from, to))
}

/// Offset just past the last blank line before `before`, or 0.
fn paragraph_start(text: &str, before: usize) -> usize {
    let head = &text[..before];
    let mut later: Option<usize> = None;
    for (newline, _) in head.rmatch_indices('\n') {
        if let Some(next) = later {
            if head[newline + 1..next].trim().is_empty() {
                return next + 1;
            }
        }
        later = Some(newline);
    }
    0
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// A closer search reached `limit` before the end of the document, so the
/// closer may lie beyond it.
#[derive(Debug)]
struct Truncated;

/// `Ok(None)` is a definite "no match".
type Search<T> = Result<Option<T>, Truncated>;

/// Openers that the window end could cut in two.
const OPENERS: &[&[u8]] = &[b"$$", br"\[", br"\(", br"\begin{"];

/// Delimiter matching over `text[..limit]`.
///
/// Works on bytes: every delimiter is ASCII, and ASCII bytes never occur
/// inside a multi-byte UTF-8 sequence, so a match always starts and ends on a
/// character boundary.
struct Matcher<'a> {
    text: &'a str,
    bytes: &'a [u8],
    limit: usize,
    config: &'a LocatorConfig,
}

impl<'a> Matcher<'a> {
    fn new(text: &'a str, limit: usize, config: &'a LocatorConfig) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            limit,
            config,
        }
    }

    fn find_containing(&self, from: usize, offset: usize) -> Search<MathRegion> {
        let mut i = from;
        // A region starting past the offset cannot contain it.
        while i < self.limit && i <= offset {
            match self.bytes[i] {
                b'%' => i = self.skip_comment(i),
                b'$' | b'\\' => match self.match_at(i)? {
                    Some((end, kind)) => {
                        if offset <= end {
                            return Ok(Some(MathRegion::new(self.text, i, end, kind)));
                        }
                        i = end;
                    }
                    None if self.bytes[i] == b'\\' => i += 2,
                    None => i += 1,
                },
                _ => i += 1,
            }
        }
        Ok(None)
    }

    /// Tries every delimiter kind at `i`; returns the end of the match.
    fn match_at(&self, i: usize) -> Search<(usize, RegionKind)> {
        let rest = &self.bytes[i..self.limit];
        if OPENERS
            .iter()
            .any(|opener| rest.len() < opener.len() && opener.starts_with(rest))
        {
            return self.exhausted();
        }

        if rest.starts_with(b"$$") {
            // `$$` can never open inline math: its content would be empty.
            return Ok(self
                .find_closer(i + 2, b"$$")?
                .map(|close| (close + 2, RegionKind::DisplayDollar)));
        }
        if rest.starts_with(b"$") {
            return Ok(self
                .find_inline_close(i + 1)?
                .map(|close| (close + 1, RegionKind::InlineDollar)));
        }
        if rest.starts_with(br"\[") {
            return Ok(self
                .find_closer(i + 2, br"\]")?
                .map(|close| (close + 2, RegionKind::DisplayBracket)));
        }
        if rest.starts_with(br"\(") {
            return Ok(self
                .find_closer(i + 2, br"\)")?
                .map(|close| (close + 2, RegionKind::InlineParen)));
        }
        if rest.starts_with(br"\begin{") {
            return self.match_environment(i);
        }
        Ok(None)
    }

    /// The outcome of a search that ran out of input.
    fn exhausted<T>(&self) -> Search<T> {
        if self.limit < self.text.len() {
            Err(Truncated)
        } else {
            Ok(None)
        }
    }

    /// Position of the first `pattern` after at least one content byte.
    fn find_closer(&self, from: usize, pattern: &[u8]) -> Search<usize> {
        let mut j = from;
        while j < self.limit {
            if j > from && self.bytes[j..self.limit].starts_with(pattern) {
                return Ok(Some(j));
            }
            j = self.step(j);
        }
        self.exhausted()
    }

    /// Position of the first unescaped `$`, which must not immediately follow
    /// the opener.
    fn find_inline_close(&self, from: usize) -> Search<usize> {
        let mut j = from;
        while j < self.limit {
            if self.bytes[j] == b'$' {
                return Ok((j > from).then_some(j));
            }
            j = self.step(j);
        }
        self.exhausted()
    }

    fn match_environment(&self, i: usize) -> Search<(usize, RegionKind)> {
        let Some((name, body_start)) = self.environment_name(i + r"\begin".len())? else {
            return Ok(None);
        };
        if !self.config.accepts(name) {
            return Ok(None);
        }

        let begin = format!(r"\begin{{{name}}}");
        let end = format!(r"\end{{{name}}}");
        let mut nesting = 0usize;
        let mut j = body_start;
        while j < self.limit {
            let rest = &self.bytes[j..self.limit];
            if rest.starts_with(end.as_bytes()) {
                if nesting == 0 {
                    return Ok((j > body_start)
                        .then(|| (j + end.len(), RegionKind::Environment(name.to_string()))));
                }
                nesting -= 1;
                j += end.len();
            } else if rest.starts_with(begin.as_bytes()) {
                nesting += 1;
                j += begin.len();
            } else {
                j = self.step(j);
            }
        }
        self.exhausted()
    }

    /// Reads `{name}` at `at`; returns the name and the offset after `}`.
    fn environment_name(&self, at: usize) -> Search<(&'a str, usize)> {
        let text: &'a str = self.text;
        let Some(rest) = text.get(at..self.limit).and_then(|r| r.strip_prefix('{')) else {
            return Ok(None);
        };
        match rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '*')) {
            Some(close) if rest[close..].starts_with('}') => {
                Ok(Some((&rest[..close], at + close + 2)))
            }
            Some(_) => Ok(None),
            // The name runs into the limit.
            None => self.exhausted(),
        }
    }

    /// Advances past one unit of content: an escape pair, a comment, or a
    /// single byte.
    fn step(&self, j: usize) -> usize {
        match self.bytes[j] {
            b'\\' => j + 2,
            b'%' => self.skip_comment(j),
            _ => j + 1,
        }
    }

    /// Position of the newline ending the comment at `j`, or the limit.
    fn skip_comment(&self, j: usize) -> usize {
        self.bytes[j..self.limit]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.limit, |p| j + p)
    }
}
