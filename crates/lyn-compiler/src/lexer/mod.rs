//! Lexer for the Lyn language.
//!
//! Produces span-based tokens without storing text - text is sliced from
//! source only when needed. The whole input is tokenized up front; the
//! [`Lexer`] cursor over that vector gives the parser cheap save/restore
//! for speculative lookahead.
//!
//! ## Error handling
//!
//! The lexer coalesces consecutive unknown bytes into single `Garbage`
//! tokens rather than producing one error per character, flags strings left
//! open before a newline or EOF, and merges a second decimal point into a
//! `MalformedNumber` token. All three are fatal for the compilation unit;
//! [`report_lex_errors`] turns them into diagnostics and the driver stops
//! before parsing.

mod cursor;


use logos::Logos;
use lyn_core::Span;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

pub use cursor::{Lexer, LexerState};

/// Token classification. One variant per keyword, operator and literal
/// class; trivia and sentinel variants at the end.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TokenKind {
    // Keywords
    #[token("func")]
    KwFunc,
    #[token("return")]
    KwReturn,
    #[token("print")]
    KwPrint,
    #[token("class")]
    KwClass,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("for")]
    KwFor,
    #[token("in")]
    KwIn,
    #[token("end")]
    KwEnd,
    #[token("import")]
    KwImport,
    #[token("from")]
    KwFrom,
    #[token("as")]
    KwAs,
    #[token("ui")]
    KwUi,
    #[token("css")]
    KwCss,
    #[token("register_event")]
    KwRegisterEvent,
    #[token("range")]
    KwRange,
    #[token("int")]
    KwInt,
    #[token("float")]
    KwFloat,
    #[token("module")]
    KwModule,
    #[token("export")]
    KwExport,
    #[token("while")]
    KwWhile,
    #[token("do")]
    KwDo,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("default")]
    KwDefault,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("try")]
    KwTry,
    #[token("catch")]
    KwCatch,
    #[token("finally")]
    KwFinally,
    #[token("throw")]
    KwThrow,
    #[token("match")]
    KwMatch,
    #[token("when")]
    KwWhen,
    #[token("otherwise")]
    KwOtherwise,
    #[token("aspect")]
    KwAspect,
    #[token("pointcut")]
    KwPointcut,
    #[token("advice")]
    KwAdvice,
    #[token("before")]
    KwBefore,
    #[token("after")]
    KwAfter,
    #[token("around")]
    KwAround,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("and")]
    KwAnd,
    #[token("or")]
    KwOr,
    #[token("not")]
    KwNot,
    #[token("new")]
    KwNew,
    #[token("this")]
    KwThis,

    // Operators and punctuators
    #[token("=")]
    Equals,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token(";")]
    Semicolon,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token(">=")]
    Ge,
    #[token("<=")]
    Le,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(":")]
    Colon,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(">>")]
    Shr,
    #[token("##")]
    HashHash,
    #[token("#")]
    Hash,

    // Literals and identifiers
    #[regex(r"[0-9]+(\.[0-9]+)?|\.[0-9]+")]
    Number,
    #[regex(r#""[^"\n]*""#)]
    Str,
    #[regex(r#""[^"\n]*"#)]
    UnterminatedStr,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // Trivia
    #[regex(r"[ \t\r\f]+")]
    Whitespace,
    #[token("\n")]
    Newline,
    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,
    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    // Sentinels, never produced by the logos derive
    /// Coalesced run of bytes no rule matched.
    Garbage,
    /// A number with more than one decimal point.
    MalformedNumber,
    /// End of input. Returned repeatedly by the cursor.
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KwFunc
                | TokenKind::KwReturn
                | TokenKind::KwPrint
                | TokenKind::KwClass
                | TokenKind::KwIf
                | TokenKind::KwElse
                | TokenKind::KwFor
                | TokenKind::KwIn
                | TokenKind::KwEnd
                | TokenKind::KwImport
                | TokenKind::KwFrom
                | TokenKind::KwAs
                | TokenKind::KwUi
                | TokenKind::KwCss
                | TokenKind::KwRegisterEvent
                | TokenKind::KwRange
                | TokenKind::KwInt
                | TokenKind::KwFloat
                | TokenKind::KwModule
                | TokenKind::KwExport
                | TokenKind::KwWhile
                | TokenKind::KwDo
                | TokenKind::KwSwitch
                | TokenKind::KwCase
                | TokenKind::KwDefault
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwTry
                | TokenKind::KwCatch
                | TokenKind::KwFinally
                | TokenKind::KwThrow
                | TokenKind::KwMatch
                | TokenKind::KwWhen
                | TokenKind::KwOtherwise
                | TokenKind::KwAspect
                | TokenKind::KwPointcut
                | TokenKind::KwAdvice
                | TokenKind::KwBefore
                | TokenKind::KwAfter
                | TokenKind::KwAround
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwAnd
                | TokenKind::KwOr
                | TokenKind::KwNot
                | TokenKind::KwNew
                | TokenKind::KwThis
        )
    }

    /// Human-readable name for "expected X, got Y" parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::KwFunc => "`func`",
            TokenKind::KwReturn => "`return`",
            TokenKind::KwPrint => "`print`",
            TokenKind::KwClass => "`class`",
            TokenKind::KwIf => "`if`",
            TokenKind::KwElse => "`else`",
            TokenKind::KwFor => "`for`",
            TokenKind::KwIn => "`in`",
            TokenKind::KwEnd => "`end`",
            TokenKind::KwImport => "`import`",
            TokenKind::KwFrom => "`from`",
            TokenKind::KwAs => "`as`",
            TokenKind::KwUi => "`ui`",
            TokenKind::KwCss => "`css`",
            TokenKind::KwRegisterEvent => "`register_event`",
            TokenKind::KwRange => "`range`",
            TokenKind::KwInt => "`int`",
            TokenKind::KwFloat => "`float`",
            TokenKind::KwModule => "`module`",
            TokenKind::KwExport => "`export`",
            TokenKind::KwWhile => "`while`",
            TokenKind::KwDo => "`do`",
            TokenKind::KwSwitch => "`switch`",
            TokenKind::KwCase => "`case`",
            TokenKind::KwDefault => "`default`",
            TokenKind::KwBreak => "`break`",
            TokenKind::KwContinue => "`continue`",
            TokenKind::KwTry => "`try`",
            TokenKind::KwCatch => "`catch`",
            TokenKind::KwFinally => "`finally`",
            TokenKind::KwThrow => "`throw`",
            TokenKind::KwMatch => "`match`",
            TokenKind::KwWhen => "`when`",
            TokenKind::KwOtherwise => "`otherwise`",
            TokenKind::KwAspect => "`aspect`",
            TokenKind::KwPointcut => "`pointcut`",
            TokenKind::KwAdvice => "`advice`",
            TokenKind::KwBefore => "`before`",
            TokenKind::KwAfter => "`after`",
            TokenKind::KwAround => "`around`",
            TokenKind::KwTrue => "`true`",
            TokenKind::KwFalse => "`false`",
            TokenKind::KwAnd => "`and`",
            TokenKind::KwOr => "`or`",
            TokenKind::KwNot => "`not`",
            TokenKind::KwNew => "`new`",
            TokenKind::KwThis => "`this`",
            TokenKind::Equals => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::ParenOpen => "`(`",
            TokenKind::ParenClose => "`)`",
            TokenKind::Comma => "`,`",
            TokenKind::Arrow => "`->`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::Dot => "`.`",
            TokenKind::DotDot => "`..`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Gt => "`>`",
            TokenKind::Lt => "`<`",
            TokenKind::Ge => "`>=`",
            TokenKind::Le => "`<=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::BracketOpen => "`[`",
            TokenKind::BracketClose => "`]`",
            TokenKind::Colon => "`:`",
            TokenKind::BraceOpen => "`{`",
            TokenKind::BraceClose => "`}`",
            TokenKind::Shr => "`>>`",
            TokenKind::HashHash => "`##`",
            TokenKind::Hash => "`#`",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::UnterminatedStr => "unterminated string",
            TokenKind::Ident => "identifier",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "newline",
            TokenKind::LineComment => "comment",
            TokenKind::BlockComment => "comment",
            TokenKind::Garbage => "unknown character",
            TokenKind::MalformedNumber => "malformed number",
            TokenKind::Eof => "end of file",
        }
    }
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when
/// needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'src>(source: &'src str, token: &Token) -> &'src str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// Tokenizes source into a vector of span-based tokens, trivia included.
///
/// Post-processes the logos output:
/// - Coalesces consecutive lexer errors into single `Garbage` tokens
/// - Merges adjacent number tokens (`1.2` directly followed by `.3`) into
///   a single `MalformedNumber`
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    tokens.push(Token::new(TokenKind::Garbage, (start..end).into()));
                }

                let span: Span = lexer.span().into();
                if kind == TokenKind::Number
                    && let Some(last) = tokens.last_mut()
                    && matches!(last.kind, TokenKind::Number | TokenKind::MalformedNumber)
                    && last.span.end == span.start
                {
                    last.kind = TokenKind::MalformedNumber;
                    last.span = last.span.cover(span);
                    continue;
                }
                tokens.push(Token::new(kind, span));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    tokens.push(Token::new(TokenKind::Garbage, (start..source.len()).into()));
                }
                break;
            }
        }
    }

    tokens
}

/// Converts lexical error tokens into fatal `Syntax` diagnostics.
///
/// Returns `true` when the stream is clean. The driver refuses to parse a
/// stream with lexical errors, so no partial token sequence leaks past the
/// first bad byte.
pub fn report_lex_errors(source: &str, tokens: &[Token], diag: &mut Diagnostics) -> bool {
    let mut clean = true;
    for token in tokens {
        let message = match token.kind {
            TokenKind::Garbage => {
                format!("unknown character `{}`", token_text(source, token))
            }
            TokenKind::UnterminatedStr => "unterminated string literal".to_string(),
            TokenKind::MalformedNumber => format!(
                "number `{}` has more than one decimal point",
                token_text(source, token)
            ),
            _ => continue,
        };
        diag.error(Stage::Lex, DiagnosticKind::Syntax, token.span, message)
            .emit();
        clean = false;
    }
    clean
}
