//! Compiler diagnostics infrastructure.
//!
//! Every pass reports problems by pushing messages into a shared
//! [`Diagnostics`] collection; only the driver decides which stages are
//! fatal. Rendering with source context lives in [`printer`].

mod message;
mod printer;


use lyn_core::Span;

pub use message::{Diagnostic, DiagnosticKind, RelatedInfo, Severity, Stage};
pub use printer::DiagnosticsPrinter;

/// Collection of diagnostic messages from all pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

/// Builder for constructing a diagnostic message.
#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn error(
        &mut self,
        stage: Stage,
        kind: DiagnosticKind,
        span: Span,
        msg: impl Into<String>,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            message: Diagnostic::new(Severity::Error, stage, kind, span, msg),
            diagnostics: self,
        }
    }

    pub fn warning(
        &mut self,
        stage: Stage,
        kind: DiagnosticKind,
        span: Span,
        msg: impl Into<String>,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            message: Diagnostic::new(Severity::Warning, stage, kind, span, msg),
            diagnostics: self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Diagnostic::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(Diagnostic::is_warning)
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    /// First error, if any. The parser aborts on it.
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.messages.iter().find(|d| d.is_error())
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl DiagnosticBuilder<'_> {
    pub fn related_to(mut self, msg: impl Into<String>, span: Span) -> Self {
        self.message.related.push(RelatedInfo::new(span, msg));
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
