//! Core data structures shared across the Lyn compiler.
//!
//! Everything the pipeline crates agree on lives here:
//! - [`Span`] / [`Pos`]: byte ranges and 1-based line/column positions
//! - [`LineIndex`]: offset → position resolution for diagnostics and dumps
//! - [`Source`]: a named source text handle

mod line_index;
mod source;
mod span;

#[cfg(test)]
mod line_index_tests;
#[cfg(test)]
mod span_tests;

pub use line_index::LineIndex;
pub use source::Source;
pub use span::{Pos, Span};
