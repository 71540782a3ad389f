//! Structural cursor stops inside a math region.

use ferromath_syntax::{DepthToken, TokenKind, scan};
use std::collections::BTreeSet;

/// Commands whose arguments, not the command name, are the navigation target.
/// Matched as prefixes of the command name.
pub const WRAPPING_COMMANDS: &[&str] = &[
    "frac", "sqrt", "int", "sum", "prod", "lim", "vec", "bar", "hat", "tilde", "dot", "ddot",
    "sin", "cos", "tan", "log", "ln",
];

/// Computes the jump points of a math region's text.
///
/// The result is sorted, free of duplicates, and always contains `0` and
/// `region.len()`. Stops are placed:
///
/// - just after the opening delimiter and at the closing delimiter
/// - inside every `{`, `[` and `(` (a "slot")
/// - after `^` / `_`, and after a single-character script such as the `2` in
///   `x^2`
/// - at every operator, row break and `&`, and again after the whitespace
///   that follows it
/// - at the start of every command that does not wrap arguments
/// - after the escaped delimiters `\{`, `\}`, `\[`, `\]`
///
/// ```
/// use ferromath_core::compute_jump_points;
///
/// assert_eq!(compute_jump_points(r"\frac{a}{b}"), vec![0, 6, 9, 11]);
/// ```
pub fn compute_jump_points(region: &str) -> Vec<usize> {
    let mut points = BTreeSet::from([0, region.len()]);
    add_delimiter_points(region, &mut points);

    for token in scan(region) {
        match &token.kind {
            kind if kind.is_group_open() => {
                points.insert(token.end());
            }
            TokenKind::Script(_) => add_script_points(region, &token, &mut points),
            TokenKind::Operator(_) | TokenKind::Escaped('\\') => {
                add_operator_points(region, &token, &mut points)
            }
            TokenKind::Escaped('{' | '}' | '[' | ']') => {
                points.insert(token.end());
            }
            TokenKind::Command(name) if !is_wrapping_command(name) => {
                points.insert(token.position);
            }
            _ => {}
        }
    }

    points.into_iter().collect()
}

/// The first jump point strictly after `offset`.
pub fn next_jump_point(points: &[usize], offset: usize) -> Option<usize> {
    points.iter().copied().find(|&p| p > offset)
}

/// The last jump point strictly before `offset`.
pub fn previous_jump_point(points: &[usize], offset: usize) -> Option<usize> {
    points.iter().rev().copied().find(|&p| p < offset)
}

pub fn is_wrapping_command(name: &str) -> bool {
    WRAPPING_COMMANDS.iter().any(|w| name.starts_with(w))
}

/// Adds the first content offset and the closing delimiter offset of a
/// delimited region.
fn add_delimiter_points(region: &str, points: &mut BTreeSet<usize>) {
    const PAIRS: &[(&str, &str)] = &[("$$", "$$"), ("$", "$"), (r"\[", r"\]"), (r"\(", r"\)")];

    if let Some((open, close)) = PAIRS.iter().find(|(open, _)| region.starts_with(open)) {
        points.insert(open.len());
        if region.len() >= open.len() + close.len() && region.ends_with(close) {
            points.insert(region.len() - close.len());
        }
        return;
    }

    // `\begin{env} ... \end{env}`
    let mut tokens = scan(region).filter(|t| t.kind != TokenKind::Whitespace);
    if let Some(first) = tokens.next() {
        if matches!(first.kind, TokenKind::BeginEnv(_)) {
            points.insert(first.end());
            if let Some(last) = tokens.last() {
                if matches!(last.kind, TokenKind::EndEnv(_)) {
                    points.insert(last.position);
                }
            }
        }
    }
}

fn add_script_points(region: &str, token: &DepthToken, points: &mut BTreeSet<usize>) {
    let after = token.end();
    match region[after..].chars().next() {
        // The group's own slot is the stop.
        Some('{' | '[' | '(') => {}
        Some(c) => {
            points.insert(after);
            if !c.is_whitespace() && c != '\\' {
                points.insert(after + c.len_utf8());
            }
        }
        None => {
            points.insert(after);
        }
    }
}

fn add_operator_points(region: &str, token: &DepthToken, points: &mut BTreeSet<usize>) {
    points.insert(token.position);
    let rest = &region[token.end()..];
    let spaces = rest.len() - rest.trim_start().len();
    points.insert(token.end() + spaces);
}
