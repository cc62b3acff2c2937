//! Recursive-descent parser for Lyn.
//!
//! # Architecture
//!
//! One-token lookahead everywhere, plus speculative multi-token lookahead
//! (via the lexer's `save`/`restore`) for the single ambiguous spot in the
//! grammar: `(` starting either a parenthesized expression or a lambda
//! parameter list.
//!
//! The parser does not recover. The first mismatch reports an
//! "expected X, got Y" diagnostic at the current token and aborts; the
//! driver never sees a partial tree.

mod core;
mod grammar;

#[cfg(test)]
mod tests;

use crate::ast::Node;
use crate::diagnostics::Diagnostics;
use crate::lexer::{Lexer, report_lex_errors};

pub use self::core::Parser;

/// Lex and parse one source. `None` means diagnostics carry at least one
/// fatal syntax error.
pub fn parse(source: &str, diag: &mut Diagnostics) -> Option<Node> {
    let lexer = Lexer::new(source);
    if !report_lex_errors(source, lexer.raw_tokens(), diag) {
        return None;
    }
    Parser::new(lexer, diag).run()
}
