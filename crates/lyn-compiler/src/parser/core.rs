//! Core parser state machine and low-level operations.

use indexmap::IndexMap;
use lyn_core::Span;

use crate::ast::Node;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};
use crate::lexer::{Lexer, Token, TokenKind};

/// Nesting limit for expressions and blocks. Deep enough for any real
/// program, shallow enough that the parser fails before the stack does.
pub(super) const MAX_DEPTH: u32 = 512;

/// Marker for an aborted parse. The diagnostic is already recorded when
/// this is returned; callers just unwind to the driver.
#[derive(Debug, Clone, Copy)]
pub(super) struct ParseAbort;

pub(super) type PResult<T> = Result<T, ParseAbort>;

/// Parser state machine.
///
/// Tokens come from the [`Lexer`] cursor, so speculative lookahead is a
/// `save`/`restore` pair around plain `bump`s.
pub struct Parser<'src, 'd> {
    pub(super) lexer: Lexer<'src>,
    pub(super) diag: &'d mut Diagnostics,
    /// `variable → class` facts from `x = new C(...)` bindings, used to
    /// rewrite method calls to `C.method` with the receiver threaded.
    pub(super) classes: IndexMap<String, String>,
    pub(super) depth: u32,
}

impl<'src, 'd> Parser<'src, 'd> {
    pub fn new(lexer: Lexer<'src>, diag: &'d mut Diagnostics) -> Self {
        Self {
            lexer,
            diag,
            classes: IndexMap::new(),
            depth: 0,
        }
    }

    /// Parse a whole program. `None` when a syntax error aborted the parse.
    pub fn run(mut self) -> Option<Node> {
        self.parse_program().ok()
    }

    pub(super) fn current(&self) -> TokenKind {
        self.lexer.peek().kind
    }

    pub(super) fn nth(&self, n: usize) -> TokenKind {
        self.lexer.peek_nth(n).kind
    }

    pub(super) fn current_token(&self) -> Token {
        self.lexer.peek()
    }

    pub(super) fn current_span(&self) -> Span {
        self.lexer.peek().span
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(super) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Consume and return the current token.
    pub(super) fn bump(&mut self) -> Token {
        self.lexer.next()
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Expect a token kind; mismatch aborts the parse.
    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_expected(what))
        }
    }

    /// Current token's lexeme, or a kind description for EOF and friends.
    pub(super) fn describe_current(&self) -> String {
        let token = self.current_token();
        match token.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("`{}`", self.lexer.text(&token)),
        }
    }

    /// Record an "expected X, got Y" syntax error and abort.
    pub(super) fn error_expected(&mut self, what: &str) -> ParseAbort {
        let got = self.describe_current();
        self.error(format!("expected {what}, got {got}"))
    }

    pub(super) fn error(&mut self, message: impl Into<String>) -> ParseAbort {
        self.diag
            .error(Stage::Parse, DiagnosticKind::Syntax, self.current_span(), message)
            .emit();
        ParseAbort
    }

    pub(super) fn error_at(&mut self, span: Span, message: impl Into<String>) -> ParseAbort {
        self.diag
            .error(Stage::Parse, DiagnosticKind::Syntax, span, message)
            .emit();
        ParseAbort
    }

    /// Skip `;` statement separators. Newlines are already trivia.
    pub(super) fn skip_separators(&mut self) {
        while self.at(TokenKind::Semicolon) {
            self.bump();
        }
    }

    pub(super) fn enter_recursion(&mut self) -> PResult<()> {
        if self.depth >= MAX_DEPTH {
            self.diag
                .error(
                    Stage::Parse,
                    DiagnosticKind::Limit,
                    self.current_span(),
                    "recursion limit exceeded",
                )
                .emit();
            return Err(ParseAbort);
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Expect an identifier and return its text.
    pub(super) fn expect_ident(&mut self, what: &str) -> PResult<(String, Span)> {
        if self.at(TokenKind::Ident) {
            let token = self.bump();
            Ok((self.lexer.text(&token).to_string(), token.span))
        } else {
            Err(self.error_expected(what))
        }
    }

    /// Type names are identifiers or the builtin type keywords.
    pub(super) fn expect_type_name(&mut self) -> PResult<String> {
        match self.current() {
            TokenKind::Ident => {
                let token = self.bump();
                Ok(self.lexer.text(&token).to_string())
            }
            TokenKind::KwInt => {
                self.bump();
                Ok("int".to_string())
            }
            TokenKind::KwFloat => {
                self.bump();
                Ok("float".to_string())
            }
            _ => Err(self.error_expected("type name")),
        }
    }

    /// Whether the current token can begin an expression.
    pub(super) fn at_expr_start(&self) -> bool {
        matches!(
            self.current(),
            TokenKind::Number
                | TokenKind::Str
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::Ident
                | TokenKind::ParenOpen
                | TokenKind::BracketOpen
                | TokenKind::KwNew
                | TokenKind::KwThis
                | TokenKind::KwNot
                | TokenKind::Minus
        )
    }
}
