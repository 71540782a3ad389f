use crate::{TextRange, TextSize};
use serde::Serialize;

/// Single-character operators that act as alignment or navigation stops in math.
pub const OPERATORS: &[char] = &['&', '=', '+', '-', '*', '/', '<', '>', ',', ';', ':'];

/// The kind of a [`DepthToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum TokenKind {
    OpenBrace,    // {
    CloseBrace,   // }
    OpenBracket,  // [
    CloseBracket, // ]
    OpenParen,    // (
    CloseParen,   // )
    /// `\begin{name}`, captured whole.
    BeginEnv(String),
    /// `\end{name}`, captured whole.
    EndEnv(String),
    LeftDelim,  // \left
    RightDelim, // \right
    Operator(char),
    /// `^` or `_`.
    Script(char),
    /// `\name`, without the backslash.
    Command(String),
    /// Backslash followed by a single non-letter, e.g. `\{`, `\\`, `\,`.
    Escaped(char),
    Dollar,
    Text,
    Whitespace,
    Comment,
}

impl TokenKind {
    /// Returns true for every construct that increments depth.
    pub fn is_opening(&self) -> bool {
        matches!(
            self,
            TokenKind::OpenBrace
                | TokenKind::OpenBracket
                | TokenKind::OpenParen
                | TokenKind::BeginEnv(_)
                | TokenKind::LeftDelim
        )
    }

    /// Returns true for every construct that decrements depth.
    pub fn is_closing(&self) -> bool {
        matches!(
            self,
            TokenKind::CloseBrace
                | TokenKind::CloseBracket
                | TokenKind::CloseParen
                | TokenKind::EndEnv(_)
                | TokenKind::RightDelim
        )
    }

    /// Returns true for the single-character group openers `{`, `[` and `(`.
    pub fn is_group_open(&self) -> bool {
        matches!(
            self,
            TokenKind::OpenBrace | TokenKind::OpenBracket | TokenKind::OpenParen
        )
    }

    /// Returns true for the row break `\\`.
    pub fn is_row_break(&self) -> bool {
        *self == TokenKind::Escaped('\\')
    }
}

/// A token produced by the [`Scanner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthToken {
    #[serde(flatten)]
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub position: usize,
    /// Length in bytes.
    pub len: usize,
    /// Nesting level enclosing the token.
    ///
    /// Openers report the level before they increment it and closers the level
    /// after they decrement it, so both ends of a group carry the same depth.
    /// Unbalanced input can drive this below zero.
    pub depth: i32,
}

impl DepthToken {
    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.position + self.len
    }

    /// The token's source text. `source` must be the string that was scanned.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.position..self.end()]
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(
            TextSize::from(self.position as u32),
            TextSize::from(self.end() as u32),
        )
    }

    /// Depth clamped at zero, for boundary decisions on malformed input.
    pub fn effective_depth(&self) -> u32 {
        self.depth.max(0) as u32
    }
}

/// A depth-tracking scanner over LaTeX math source.
///
/// ## Overview
///
/// The scanner makes a **single left-to-right pass** over its input and yields
/// [`DepthToken`]s lazily. Next to the usual lexical split it maintains one
/// integer depth counter:
///
/// - `{`, `[`, `(` increment it; `}`, `]`, `)` decrement it
/// - `\left` and `\right` count as one opener / closer each
/// - `\begin{name}` and `\end{name}` count as one opener / closer each, with
///   the environment name captured so callers can pair them
/// - escaped characters (`\{`, `\$`, `\\`) never change depth
///
/// Malformed input is never rejected. Depth simply goes wherever the tokens
/// take it, including below zero.
///
/// ## Examples
///
/// ```
/// use ferromath_syntax::{scan, TokenKind};
///
/// let tokens: Vec<_> = scan(r"\frac{a}{b}").collect();
///
/// assert_eq!(tokens[0].kind, TokenKind::Command("frac".to_string()));
/// assert_eq!(tokens[1].kind, TokenKind::OpenBrace);
/// assert_eq!(tokens[2].depth, 1); // a
/// assert_eq!(tokens[3].depth, 0); // }
/// ```
///
/// A scanner is restartable but not resumable: call [`scan`] again to start
/// over.
pub struct Scanner<'a> {
    input: &'a str,
    /// Current byte position in the input.
    position: usize,
    depth: i32,
}

/// Starts a fresh scan of `text`.
pub fn scan(text: &str) -> Scanner<'_> {
    Scanner::new(text)
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            depth: 0,
        }
    }

    /// Depth after the tokens consumed so far.
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<DepthToken> {
        let start = self.position;
        let c = self.peek()?;

        let kind = match c {
            '\\' => self.backslash(),
            '{' => self.single(c, TokenKind::OpenBrace),
            '}' => self.single(c, TokenKind::CloseBrace),
            '[' => self.single(c, TokenKind::OpenBracket),
            ']' => self.single(c, TokenKind::CloseBracket),
            '(' => self.single(c, TokenKind::OpenParen),
            ')' => self.single(c, TokenKind::CloseParen),
            '^' | '_' => self.single(c, TokenKind::Script(c)),
            '$' => self.single(c, TokenKind::Dollar),
            '%' => {
                self.bump_while(|n| n != '\n' && n != '\r');
                TokenKind::Comment
            }
            c if OPERATORS.contains(&c) => self.single(c, TokenKind::Operator(c)),
            c if c.is_whitespace() => {
                self.bump_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            _ => {
                self.position += c.len_utf8();
                self.bump_while(|n| !is_special(n));
                TokenKind::Text
            }
        };

        let depth = if kind.is_opening() {
            let outer = self.depth;
            self.depth += 1;
            outer
        } else if kind.is_closing() {
            self.depth -= 1;
            self.depth
        } else {
            self.depth
        };

        Some(DepthToken {
            kind,
            position: start,
            len: self.position - start,
            depth,
        })
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn single(&mut self, c: char, kind: TokenKind) -> TokenKind {
        self.position += c.len_utf8();
        kind
    }

    fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(n) = self.peek() {
            if !pred(n) {
                break;
            }
            self.position += n.len_utf8();
        }
    }

    fn backslash(&mut self) -> TokenKind {
        self.position += 1;
        let Some(next) = self.peek() else {
            // A lone trailing backslash.
            return TokenKind::Text;
        };

        if !next.is_ascii_alphabetic() {
            self.position += next.len_utf8();
            return TokenKind::Escaped(next);
        }

        let input = self.input;
        let name_start = self.position;
        self.bump_while(|n| n.is_ascii_alphabetic());
        let name = &input[name_start..self.position];

        match name {
            "left" => TokenKind::LeftDelim,
            "right" => TokenKind::RightDelim,
            "begin" => match self.environment_name() {
                Some(env) => TokenKind::BeginEnv(env),
                None => TokenKind::Command(name.to_string()),
            },
            "end" => match self.environment_name() {
                Some(env) => TokenKind::EndEnv(env),
                None => TokenKind::Command(name.to_string()),
            },
            _ => TokenKind::Command(name.to_string()),
        }
    }

    /// Consumes `{name}` directly after `\begin` / `\end`. Leaves the position
    /// untouched when the group is missing, empty or unterminated on the line.
    fn environment_name(&mut self) -> Option<String> {
        let rest = &self.input[self.position..];
        let body = rest.strip_prefix('{')?;
        let close = body.find(|n: char| matches!(n, '}' | '{' | '\\' | '\n' | '\r'))?;
        if close == 0 || !body[close..].starts_with('}') {
            return None;
        }
        let name = body[..close].to_string();
        // `{` + name + `}`
        self.position += close + 2;
        Some(name)
    }
}

impl Iterator for Scanner<'_> {
    type Item = DepthToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn is_special(c: char) -> bool {
    matches!(
        c,
        '\\' | '{' | '}' | '[' | ']' | '(' | ')' | '^' | '_' | '$' | '%'
    ) || OPERATORS.contains(&c)
        || c.is_whitespace()
}
