//! Wrapping unbraced sub/superscripts in `{}` as they are typed.
//!
//! Typing `x^ab` becomes `x^{ab}` with the cursor left before the `}`, so
//! further characters land inside the group. The check re-runs after every
//! keystroke.

use serde::Serialize;

/// A script run that should be wrapped in braces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoBraceCandidate {
    /// Offset of the `^` or `_`.
    pub marker_position: usize,
    /// The unbraced run after the marker.
    pub content: String,
    /// Byte range `[start, end)` of the line to replace.
    pub replacement_range: (usize, usize),
    /// `{content}`
    pub replacement: String,
    /// Suggested cursor offset after the edit, just before the `}`.
    pub cursor: usize,
}

impl AutoBraceCandidate {
    /// Applies the replacement to `line`.
    pub fn apply(&self, line: &str) -> String {
        let (start, end) = self.replacement_range;
        format!("{}{}{}", &line[..start], self.replacement, &line[end..])
    }
}

/// Inspects `line_text` right after a character was inserted ending at
/// `insertion_end` and proposes wrapping the script run in braces.
///
/// Scans backwards from before the inserted character to the nearest `^` or
/// `_`, giving up at `{`, `}` or whitespace. The run from the marker to the
/// cursor must be at least two characters long and contain none of `{`, `}`,
/// whitespace, `^`, `_`.
///
/// ```
/// use ferromath_core::detect_auto_brace;
///
/// let candidate = detect_auto_brace("x^ab", 4).unwrap();
/// assert_eq!(candidate.apply("x^ab"), "x^{ab}");
/// assert_eq!(candidate.cursor, 5);
/// ```
pub fn detect_auto_brace(line_text: &str, insertion_end: usize) -> Option<AutoBraceCandidate> {
    let head = line_text.get(..insertion_end)?;
    let (typed_start, _) = head.char_indices().next_back()?;

    let mut marker = None;
    for (i, c) in head[..typed_start].char_indices().rev() {
        match c {
            '^' | '_' => {
                marker = Some(i);
                break;
            }
            '{' | '}' => return None,
            c if c.is_whitespace() => return None,
            _ => {}
        }
    }
    let marker = marker?;
    if head[..marker].ends_with('\\') {
        // `\^` and `\_` are literals.
        return None;
    }

    let start = marker + 1;
    let content = &head[start..];
    if content.chars().count() < 2 || content.chars().any(is_script_delimiter) {
        return None;
    }

    Some(AutoBraceCandidate {
        marker_position: marker,
        content: content.to_string(),
        replacement_range: (start, insertion_end),
        replacement: format!("{{{content}}}"),
        cursor: start + 1 + content.len(),
    })
}

fn is_script_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '^' | '_') || c.is_whitespace()
}

/// Per-session auto-bracing state.
///
/// The only state is the escape flag: after [`set_escape_flag`], the next
/// single-character insertion produces no candidate. The flag is also cleared
/// by any edit that moves past the script: an insertion containing
/// whitespace, or an empty insertion (a deletion).
///
/// [`set_escape_flag`]: AutoBraceDetector::set_escape_flag
#[derive(Debug, Default)]
pub struct AutoBraceDetector {
    escape_pending: bool,
}

impl AutoBraceDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses the candidate for the next single-character insertion.
    pub fn set_escape_flag(&mut self) {
        self.escape_pending = true;
    }

    pub fn is_escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// Handles one text change on a line.
    ///
    /// `inserted` is the text the change inserted (empty for deletions) and
    /// `insertion_end` the offset in `line_text` right after it.
    pub fn on_text_changed(
        &mut self,
        inserted: &str,
        line_text: &str,
        insertion_end: usize,
    ) -> Option<AutoBraceCandidate> {
        if inserted.is_empty() || inserted.contains(char::is_whitespace) {
            self.escape_pending = false;
            return None;
        }

        let mut chars = inserted.chars();
        if chars.next().is_none() || chars.next().is_some() {
            // Pastes and other multi-character edits are left alone.
            return None;
        }

        if std::mem::take(&mut self.escape_pending) {
            log::debug!("Auto-bracing suppressed by escape at offset {}", insertion_end);
            return None;
        }

        detect_auto_brace(line_text, insertion_end)
    }

    /// Handles the insertion of the character ending at `insertion_end`.
    pub fn on_character_inserted(
        &mut self,
        line_text: &str,
        insertion_end: usize,
    ) -> Option<AutoBraceCandidate> {
        let typed = line_text
            .get(..insertion_end)
            .and_then(|head| head.chars().next_back());
        match typed {
            Some(c) => {
                let mut buf = [0u8; 4];
                self.on_text_changed(c.encode_utf8(&mut buf), line_text, insertion_end)
            }
            None => self.on_text_changed("", line_text, insertion_end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superscript_run() {
        let candidate = detect_auto_brace("x^ab", 4).unwrap();
        assert_eq!(candidate.marker_position, 1);
        assert_eq!(candidate.content, "ab");
        assert_eq!(candidate.replacement_range, (2, 4));
        assert_eq!(candidate.replacement, "{ab}");
        assert_eq!(candidate.cursor, 5);
        assert_eq!(&candidate.apply("x^ab")[..candidate.cursor], "x^{ab");
    }

    #[test]
    fn test_subscript_mid_line() {
        let line = "a_ij + b";
        let candidate = detect_auto_brace(line, 4).unwrap();
        assert_eq!(candidate.apply(line), "a_{ij} + b");
    }

    #[test]
    fn test_single_character_is_not_wrapped() {
        assert_eq!(detect_auto_brace("x^a", 3), None);
    }

    #[test]
    fn test_already_braced() {
        // Typing inside `x^{ab}` hits the `{` first.
        assert_eq!(detect_auto_brace("x^{abc}", 6), None);
    }

    #[test]
    fn test_space_stops_scan() {
        assert_eq!(detect_auto_brace("x^a bc", 6), None);
    }

    #[test]
    fn test_typed_delimiter_rejects_candidate() {
        assert_eq!(detect_auto_brace("x^a{", 4), None);
        assert_eq!(detect_auto_brace("x^a^", 4), None);
    }

    #[test]
    fn test_escaped_marker() {
        assert_eq!(detect_auto_brace(r"file\_name", 10), None);
    }

    #[test]
    fn test_multi_byte_content() {
        let line = "x^αβ";
        let candidate = detect_auto_brace(line, line.len()).unwrap();
        assert_eq!(candidate.apply(line), "x^{αβ}");
        assert_eq!(&candidate.apply(line)[candidate.cursor..], "}");
    }

    #[test]
    fn test_invalid_offsets() {
        assert_eq!(detect_auto_brace("x^ab", 0), None);
        assert_eq!(detect_auto_brace("x^ab", 9), None);
        assert_eq!(detect_auto_brace("x^αβ", 4), None);
    }

    #[test]
    fn test_escape_suppresses_one_insertion() {
        let mut detector = AutoBraceDetector::new();
        detector.set_escape_flag();
        assert_eq!(detector.on_character_inserted("x^ab", 4), None);
        assert!(!detector.is_escape_pending());
        assert!(detector.on_character_inserted("x^abc", 5).is_some());
    }

    #[test]
    fn test_whitespace_and_deletion_clear_escape() {
        let mut detector = AutoBraceDetector::new();
        detector.set_escape_flag();
        assert_eq!(detector.on_text_changed(" ", "x^a ", 4), None);
        assert!(!detector.is_escape_pending());

        detector.set_escape_flag();
        assert_eq!(detector.on_text_changed("", "x^a", 3), None);
        assert!(!detector.is_escape_pending());

        detector.set_escape_flag();
        assert_eq!(detector.on_text_changed("\n", "", 0), None);
        assert!(!detector.is_escape_pending());
    }

    #[test]
    fn test_multi_character_insert_is_ignored() {
        let mut detector = AutoBraceDetector::new();
        detector.set_escape_flag();
        assert_eq!(detector.on_text_changed("ab", "x^ab", 4), None);
        // A paste does not consume the escape.
        assert!(detector.is_escape_pending());
    }
}
