//! Splitting a flat equation into an aligned multi-line block.

use crate::config::is_environment_name;
use crate::error::{Error, Result};
use ferromath_syntax::{TokenKind, scan};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Layout of the generated block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SplitStyle {
    /// Environment wrapping the rows, e.g. `align` or `align*`.
    pub environment: String,
    /// Spaces before each row.
    pub indent: usize,
}

impl Default for SplitStyle {
    fn default() -> Self {
        Self {
            environment: "align".to_string(),
            indent: 4,
        }
    }
}

impl SplitStyle {
    pub fn validate(&self) -> Result<()> {
        if is_environment_name(&self.environment) {
            Ok(())
        } else {
            Err(Error::InvalidEnvironment(self.environment.clone()))
        }
    }
}

/// A top-level operator the equation is split at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitOperator {
    /// Byte offset within the unwrapped content.
    pub position: usize,
    pub operator: char,
}

/// Strips one recognized outer delimiter pair (`$$`, `\[ \]`, `$`) from
/// `text`, ignoring surrounding whitespace. Returns `text` unchanged when no
/// pair is present.
pub fn unwrap_math(text: &str) -> &str {
    const PAIRS: &[(&str, &str)] = &[("$$", "$$"), (r"\[", r"\]"), ("$", "$")];

    let trimmed = text.trim();
    for (open, close) in PAIRS {
        if trimmed.len() >= open.len() + close.len()
            && trimmed.starts_with(open)
            && trimmed.ends_with(close)
        {
            return &trimmed[open.len()..trimmed.len() - close.len()];
        }
    }
    text
}

/// Every `=` at nesting depth 0 that has non-whitespace content after it.
///
/// A trailing `=` is presumed to be waiting for the rest of the equation and
/// is not a split point. Negative depth from unbalanced closers counts as
/// top level.
pub fn find_split_points(inner: &str) -> Vec<SplitOperator> {
    scan(inner)
        .filter(|t| t.kind == TokenKind::Operator('=') && t.depth <= 0)
        .filter(|t| !inner[t.end()..].trim().is_empty())
        .map(|t| SplitOperator {
            position: t.position,
            operator: '=',
        })
        .collect()
}

/// Rewrites an equation into an `align` block split at its top-level `=`
/// signs, using the default [`SplitStyle`].
///
/// When there is nothing to split the input itself is returned, borrowed, so
/// callers can detect the no-op.
///
/// ```
/// use ferromath_core::split_equation;
///
/// assert_eq!(
///     split_equation("$a = b = c$"),
///     "\\begin{align}\n    a &= b \\\\\n    &= c\n\\end{align}"
/// );
/// assert_eq!(split_equation("$a + b$"), "$a + b$");
/// ```
pub fn split_equation(text: &str) -> Cow<'_, str> {
    split_equation_with(text, &SplitStyle::default())
}

/// [`split_equation`] with an explicit layout.
pub fn split_equation_with<'a>(text: &'a str, style: &SplitStyle) -> Cow<'a, str> {
    let inner = unwrap_math(text);
    let operators = find_split_points(inner);
    if operators.is_empty() {
        log::debug!("Nothing to split in {:?}", text);
        return Cow::Borrowed(text);
    }

    let mut segments = Vec::with_capacity(operators.len() + 1);
    let mut last = 0;
    for op in &operators {
        segments.push(inner[last..op.position].trim());
        last = op.position + op.operator.len_utf8();
    }
    segments.push(inner[last..].trim());

    // A comment ending a segment would swallow the `&=` or `\\` after it, so
    // it moves to the end of its row.
    let parts: Vec<_> = segments.iter().map(|seg| split_trailing_comment(seg)).collect();
    let mut rows = vec![(
        join_words(&[parts[0].0, "&=", parts[1].0]),
        [parts[0].1, parts[1].1],
    )];
    rows.extend(
        parts[2..]
            .iter()
            .map(|&(code, comment)| (join_words(&["&=", code]), [None, comment])),
    );

    let last = rows.len() - 1;
    let lines: Vec<String> = rows
        .into_iter()
        .enumerate()
        .map(|(n, (mut line, comments))| {
            if n < last {
                line.push_str(r" \\");
            }
            for comment in comments.into_iter().flatten() {
                line.push(' ');
                line.push_str(comment);
            }
            line
        })
        .collect();

    let indent = " ".repeat(style.indent);
    let body = lines.join(&format!("\n{indent}"));
    let env = &style.environment;
    Cow::Owned(format!("\\begin{{{env}}}\n{indent}{body}\n\\end{{{env}}}"))
}

/// Splits a `%` comment running to the end of a trimmed segment off its code.
fn split_trailing_comment(segment: &str) -> (&str, Option<&str>) {
    match scan(segment).last() {
        Some(token) if token.kind == TokenKind::Comment => (
            segment[..token.position].trim_end(),
            Some(token.text(segment)),
        ),
        _ => (segment, None),
    }
}

fn join_words(words: &[&str]) -> String {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
