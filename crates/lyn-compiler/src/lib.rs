//! Lyn: a small imperative/object-oriented language compiled to portable C.
//!
//! The pipeline is **lex → parse → aspect-weave → macro-expand →
//! type-infer → optimize → emit C**; this crate is everything up to and
//! including the C text. Invoking the C compiler and running the result is
//! the CLI's business.
//!
//! # Example
//!
//! ```
//! use lyn_compiler::{CompileOptions, compile};
//!
//! let output = compile(
//!     "main\n  print(10 + 5)\nend\n",
//!     &CompileOptions::default(),
//! )
//! .expect("valid program");
//!
//! assert!(output.c_source().contains("printf"));
//! ```

pub mod analyze;
pub mod ast;
pub mod compile;
pub mod diagnostics;
pub mod emit;
pub mod expand;
pub mod lexer;
pub mod optimize;
pub mod parser;
pub mod weave;

pub use compile::{Compilation, CompileOptions, Output, compile};
pub use diagnostics::{
    Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity, Stage,
};

/// Errors that abort a compilation chain.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lexical or syntax errors; the collected diagnostics describe them.
    #[error("source contains fatal lexical or syntax errors")]
    Syntax { diagnostics: Diagnostics },
}

impl Error {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            Error::Syntax { diagnostics } => diagnostics,
        }
    }
}

/// Result type for compilation operations.
pub type Result<T> = std::result::Result<T, Error>;
