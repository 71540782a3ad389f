//! # FerroMath Syntax
//!
//! Lexical layer for the FerroMath math editing engine.
//!
//! ## Overview
//!
//! This crate does not build a syntax tree. Math source is transiently broken
//! while it is being typed, so the engine works from a flat token stream plus
//! a nesting depth instead:
//!
//! - [`scanner`] - the depth-tracking [`Scanner`] producing [`DepthToken`]s
//! - [`source`] - [`SourceBuffer`], mapping between byte offsets and editor
//!   positions (line/column, UTF-16)
//!
//! All offsets are UTF-8 byte offsets into the scanned string.

pub mod scanner;
pub mod source;

pub use rowan::{TextRange, TextSize};
pub use scanner::{DepthToken, OPERATORS, Scanner, TokenKind, scan};
pub use source::SourceBuffer;
