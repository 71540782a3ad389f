//! # FerroMath Core
//!
//! Structural editing for LaTeX math source.
//!
//! ## Overview
//!
//! This crate takes raw LaTeX text and a cursor offset and answers the
//! questions an editor needs for math-aware editing, without a full grammar:
//!
//! - [`locator`] - which math region (`$...$`, `$$...$$`, `\[...\]`,
//!   `\(...\)`, `\begin{env}...\end{env}`) surrounds the cursor
//! - [`jump_points`] - where the structural cursor stops inside a region are
//! - [`splitter`] - how to rewrite `a = b = c` into an aligned block split at
//!   its top-level `=` signs
//! - [`autobrace`] - when a typed script run like `x^ab` should become
//!   `x^{ab}`
//! - [`references`] - which `\label`s a document defines and which `\ref`s
//!   point at them
//!
//! All of them are built on the depth-tracking scanner from
//! [`ferromath_syntax`]. [`MathSession`] bundles them behind one per-document
//! object, together with its [`Config`].
//!
//! ## Design Philosophy
//!
//! - **Never refuse input**: the text is being edited and is broken most of
//!   the time. Unbalanced input degrades to best-effort answers, and "not in
//!   math" or "nothing to split" are ordinary results, not errors.
//! - **Pure functions**: every operation is a synchronous function of its
//!   input. The only mutable state is the auto-bracing escape flag, owned by
//!   the session.
//! - **Byte offsets**: all offsets are UTF-8 byte offsets. Conversion from
//!   editor positions goes through [`Position`].
//!
//! ## Examples
//!
//! ```
//! use ferromath_core::MathSession;
//!
//! let session = MathSession::default();
//! let text = r"We have $x = y + 1 = z$ here.";
//!
//! let region = session.locate_math_region(text, 12).unwrap();
//! assert_eq!(region.text, "$x = y + 1 = z$");
//!
//! let split = session.split_equation(&region.text);
//! assert!(split.starts_with("\\begin{align}"));
//! ```

pub mod autobrace;
pub mod config;
pub mod error;
pub mod jump_points;
pub mod locator;
pub mod position;
pub mod references;
pub mod region;
pub mod session;
pub mod splitter;

pub use autobrace::{AutoBraceCandidate, AutoBraceDetector, detect_auto_brace};
pub use config::{Config, LocatorConfig};
pub use error::{Error, Result};
pub use jump_points::compute_jump_points;
pub use locator::locate_math_region;
pub use position::Position;
pub use references::{ReferenceGraph, build_reference_graph};
pub use region::{MathRegion, RegionKind};
pub use session::{MathSession, TextEdit};
pub use splitter::{SplitOperator, SplitStyle, split_equation, split_equation_with};
