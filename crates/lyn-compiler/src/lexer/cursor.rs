//! Token cursor with save/restore.
//!
//! The parser consumes tokens through this cursor. `save`/`restore` make
//! lexing idempotent across arbitrary windows: the state is an index into
//! the pre-lexed vector, so speculative multi-token lookahead (lambda
//! detection) is a copy of one integer.

use lyn_core::Span;

use super::{Token, TokenKind, lex, token_text};

/// Opaque save point. Restoring it deterministically reproduces the exact
/// next-token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerState(usize);

/// Cursor over the trivia-filtered token stream of one source.
pub struct Lexer<'src> {
    source: &'src str,
    /// All tokens, trivia included, as produced by [`lex`].
    raw: Vec<Token>,
    /// Indices into `raw` of the non-trivia tokens, in order.
    significant: Vec<usize>,
    /// Cursor into `significant`. Monotonic except across `restore`.
    pos: usize,
    eof: Token,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let raw = lex(source);
        let significant = raw
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Self {
            source,
            raw,
            significant,
            pos: 0,
            eof: Token::new(TokenKind::Eof, Span::empty(source.len() as u32)),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Every token produced for the source, trivia included.
    pub fn raw_tokens(&self) -> &[Token] {
        &self.raw
    }

    /// Next token, advancing the cursor. At end of input the EOF token is
    /// returned repeatedly.
    pub fn next(&mut self) -> Token {
        let token = self.peek();
        if self.pos < self.significant.len() {
            self.pos += 1;
        }
        token
    }

    /// Current token without advancing.
    pub fn peek(&self) -> Token {
        self.peek_nth(0)
    }

    /// Lookahead by `n` tokens (0 = current).
    pub fn peek_nth(&self, n: usize) -> Token {
        self.significant
            .get(self.pos + n)
            .map_or(self.eof, |&i| self.raw[i])
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.significant.len()
    }

    /// Snapshot the cursor. Paired with [`Lexer::restore`].
    pub fn save(&self) -> LexerState {
        LexerState(self.pos)
    }

    /// Rewind to a snapshot taken earlier on this lexer.
    pub fn restore(&mut self, state: LexerState) {
        debug_assert!(state.0 <= self.significant.len());
        self.pos = state.0;
    }

    /// Lexeme text of a token.
    pub fn text(&self, token: &Token) -> &'src str {
        token_text(self.source, token)
    }

    /// Parsed value of a `Number` token.
    ///
    /// The token regex is a strict subset of Rust's float grammar, so the
    /// parse cannot fail on tokens this lexer produced.
    pub fn number_value(&self, token: &Token) -> f64 {
        debug_assert_eq!(token.kind, TokenKind::Number);
        self.text(token).parse().unwrap_or(f64::NAN)
    }

    /// Contents of a `Str` token, quotes stripped. No escape processing.
    pub fn string_value(&self, token: &Token) -> &'src str {
        debug_assert_eq!(token.kind, TokenKind::Str);
        let text = self.text(token);
        &text[1..text.len() - 1]
    }
}
