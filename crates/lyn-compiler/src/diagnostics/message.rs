//! Diagnostic message types.

use std::fmt;

use lyn_core::Span;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Classification of what went wrong.
///
/// This is the complete failure taxonomy of the compiler; every reported
/// problem picks exactly one kind. The driver decides fatality per stage,
/// not per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DiagnosticKind {
    /// Lexical or grammatical violation.
    Syntax,
    /// Scope and declaration rules (redeclaration, global-scope exit).
    Semantic,
    /// Type mismatch or unknown type name.
    Type,
    /// Unresolved identifier.
    Name,
    /// Allocation or tree-capacity failure.
    Memory,
    /// File-boundary failure, reported by the driver.
    Io,
    /// A fixed capacity was exceeded (macro table, recursion depth).
    Limit,
    /// Use of a value the pipeline could not define.
    Undefined,
    /// A construct that survives to codegen but cannot execute.
    Runtime,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::Semantic => "semantic",
            DiagnosticKind::Type => "type",
            DiagnosticKind::Name => "name",
            DiagnosticKind::Memory => "memory",
            DiagnosticKind::Io => "io",
            DiagnosticKind::Limit => "limit",
            DiagnosticKind::Undefined => "undefined",
            DiagnosticKind::Runtime => "runtime",
        };
        write!(f, "{name}")
    }
}

/// Pipeline stage that produced a diagnostic.
///
/// Stored on every message so a rendered report reconstructs where in the
/// pipeline each problem surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Stage {
    Lex,
    Parse,
    Weave,
    Expand,
    Infer,
    Optimize,
    Emit,
    Driver,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Weave => "weave",
            Stage::Expand => "expand",
            Stage::Infer => "infer",
            Stage::Optimize => "optimize",
            Stage::Emit => "emit",
            Stage::Driver => "driver",
        };
        write!(f, "{name}")
    }
}

/// Related location information for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) span: Span,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A diagnostic message with stage, kind, location and severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) severity: Severity,
    pub(crate) stage: Stage,
    pub(crate) kind: DiagnosticKind,
    pub(crate) span: Span,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl Diagnostic {
    pub(crate) fn new(
        severity: Severity,
        stage: Stage,
        kind: DiagnosticKind,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            stage,
            kind,
            span,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}/{}] at {}: {}",
            self.severity, self.stage, self.kind, self.span, self.message
        )?;
        for related in &self.related {
            write!(f, " (related: {} at {})", related.message, related.span)?;
        }
        Ok(())
    }
}
