//! Statement dispatch and control-flow productions.

use crate::ast::{Node, NodeKind};
use crate::lexer::TokenKind;
use crate::parser::core::{PResult, Parser};

impl Parser<'_, '_> {
    /// Parse statements until one of `stops` (or EOF) is the current token.
    /// The stop token is left for the caller.
    pub(in crate::parser) fn parse_statements_until(
        &mut self,
        stops: &[TokenKind],
    ) -> PResult<Vec<Node>> {
        let mut out = Vec::new();
        loop {
            self.skip_separators();
            if stops.contains(&self.current()) || self.at_eof() {
                break;
            }
            out.push(self.parse_statement()?);
        }
        Ok(out)
    }

    /// Statement dispatch, driven by the first token.
    pub(in crate::parser) fn parse_statement(&mut self) -> PResult<Node> {
        self.enter_recursion()?;
        let result = self.parse_statement_inner();
        self.exit_recursion();
        result
    }

    fn parse_statement_inner(&mut self) -> PResult<Node> {
        match self.current() {
            TokenKind::KwFunc => self.parse_function(),
            TokenKind::KwClass => self.parse_class(),
            TokenKind::KwModule => self.parse_module(),
            TokenKind::KwImport => self.parse_import(),
            TokenKind::KwFrom => self.parse_from_import(),
            TokenKind::KwAspect => self.parse_aspect(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwPrint => self.parse_print(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwDo => self.parse_do_while(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwSwitch => self.parse_switch(),
            TokenKind::KwTry => self.parse_try(),
            TokenKind::KwThrow => self.parse_throw(),
            TokenKind::KwMatch => self.parse_match(),
            TokenKind::KwBreak => {
                let span = self.bump().span;
                Ok(Node::new(NodeKind::Break, span))
            }
            TokenKind::KwContinue => {
                let span = self.bump().span;
                Ok(Node::new(NodeKind::Continue, span))
            }
            TokenKind::KwUi | TokenKind::KwCss | TokenKind::KwRegisterEvent => {
                self.parse_builtin_call()
            }
            TokenKind::Ident if self.nth(1) == TokenKind::Colon => self.parse_var_decl(),
            _ if self.at_expr_start() => self.parse_assign_or_expr(),
            _ => Err(self.error_expected("a statement")),
        }
    }

    /// `name : type [= expr]`
    pub(in crate::parser) fn parse_var_decl(&mut self) -> PResult<Node> {
        let (name, span) = self.expect_ident("variable name")?;
        self.expect(TokenKind::Colon, "`:`")?;
        let ty_name = self.expect_type_name()?;

        let init = if self.eat(TokenKind::Equals) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.note_class_binding(&name, ty_name_class(&ty_name), init.as_deref());

        Ok(Node::new(
            NodeKind::VarDecl {
                name,
                ty_name: Some(ty_name),
                init,
            },
            span,
        ))
    }

    /// Expression statement, or assignment when an `=` follows.
    ///
    /// `x = e` becomes VarAssign, `obj.f = e` becomes MemberAssign; any
    /// other left side is rejected.
    pub(in crate::parser) fn parse_assign_or_expr(&mut self) -> PResult<Node> {
        let expr = self.parse_expression()?;
        if !self.at(TokenKind::Equals) {
            return Ok(expr);
        }
        self.bump();
        let value = self.parse_expression()?;
        let span = expr.span;

        match expr.kind {
            NodeKind::Ident { name } => {
                self.note_class_binding(&name, None, Some(&value));
                Ok(Node::new(
                    NodeKind::VarAssign {
                        name,
                        value: Box::new(value),
                    },
                    span,
                ))
            }
            NodeKind::Member { object, member } => Ok(Node::new(
                NodeKind::MemberAssign {
                    object,
                    member,
                    value: Box::new(value),
                },
                span,
            )),
            _ => Err(self.error_at(span, "invalid assignment target")),
        }
    }

    /// Track `variable → class` facts for method-call receiver threading.
    fn note_class_binding(
        &mut self,
        name: &str,
        declared_class: Option<&str>,
        init: Option<&Node>,
    ) {
        if let Some(Node {
            kind: NodeKind::New { class, .. },
            ..
        }) = init
        {
            self.classes.insert(name.to_string(), class.clone());
        } else if let Some(class) = declared_class {
            self.classes.insert(name.to_string(), class.to_string());
        }
    }

    /// `print ( expr )`
    fn parse_print(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwPrint, "`print`")?;
        self.expect(TokenKind::ParenOpen, "`(`")?;
        let value = self.parse_expression()?;
        self.expect(TokenKind::ParenClose, "`)`")?;
        Ok(Node::new(
            NodeKind::Print {
                value: Box::new(value),
            },
            start,
        ))
    }

    /// `return [expr]`
    fn parse_return(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwReturn, "`return`")?;
        let value = if self.at_expr_start() {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Ok(Node::new(NodeKind::Return { value }, start))
    }

    /// `throw expr`
    fn parse_throw(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwThrow, "`throw`")?;
        let value = self.parse_expression()?;
        Ok(Node::new(
            NodeKind::Throw {
                value: Box::new(value),
            },
            start,
        ))
    }

    /// `if expr statement* [else statement*] end`
    fn parse_if(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwIf, "`if`")?;
        let cond = self.parse_expression()?;

        let then_body = self.parse_statements_until(&[TokenKind::KwElse, TokenKind::KwEnd])?;
        let else_body = if self.eat(TokenKind::KwElse) {
            self.parse_statements_until(&[TokenKind::KwEnd])?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::If {
                cond: Box::new(cond),
                then_body,
                else_body,
            },
            start,
        ))
    }

    /// `while expr statement* end`
    fn parse_while(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwWhile, "`while`")?;
        let cond = self.parse_expression()?;
        let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::While {
                cond: Box::new(cond),
                body,
            },
            start,
        ))
    }

    /// `do statement* while expr end`
    fn parse_do_while(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwDo, "`do`")?;
        let body = self.parse_statements_until(&[TokenKind::KwWhile])?;
        self.expect(TokenKind::KwWhile, "`while`")?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::DoWhile {
                body,
                cond: Box::new(cond),
            },
            start,
        ))
    }

    /// The three `for` flavors:
    /// - `for (init; cond; update) statement* end`
    /// - `for x in range(start, end [, step]) statement* end`
    /// - `for x in expr statement* end` (also `for x in a..b`)
    fn parse_for(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwFor, "`for`")?;

        if self.at(TokenKind::ParenOpen) {
            return self.parse_for_c(start);
        }

        let (var, _) = self.expect_ident("loop variable")?;
        self.expect(TokenKind::KwIn, "`in`")?;

        if self.eat(TokenKind::KwRange) {
            self.expect(TokenKind::ParenOpen, "`(`")?;
            let from = self.parse_expression()?;
            self.expect(TokenKind::Comma, "`,`")?;
            let to = self.parse_expression()?;
            let step = if self.eat(TokenKind::Comma) {
                Some(Box::new(self.parse_expression()?))
            } else {
                None
            };
            self.expect(TokenKind::ParenClose, "`)`")?;

            let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
            self.expect(TokenKind::KwEnd, "`end`")?;
            return Ok(Node::new(
                NodeKind::ForRange {
                    var,
                    start: Box::new(from),
                    end: Box::new(to),
                    step,
                    body,
                },
                start,
            ));
        }

        let first = self.parse_expression()?;
        if self.eat(TokenKind::DotDot) {
            let to = self.parse_expression()?;
            let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
            self.expect(TokenKind::KwEnd, "`end`")?;
            return Ok(Node::new(
                NodeKind::ForRange {
                    var,
                    start: Box::new(first),
                    end: Box::new(to),
                    step: None,
                    body,
                },
                start,
            ));
        }

        let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd, "`end`")?;
        Ok(Node::new(
            NodeKind::ForEach {
                var,
                iterable: Box::new(first),
                body,
            },
            start,
        ))
    }

    fn parse_for_c(&mut self, start: lyn_core::Span) -> PResult<Node> {
        self.expect(TokenKind::ParenOpen, "`(`")?;

        let init = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_for_clause()?))
        };
        self.expect(TokenKind::Semicolon, "`;`")?;

        let cond = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::Semicolon, "`;`")?;

        let update = if self.at(TokenKind::ParenClose) {
            None
        } else {
            Some(Box::new(self.parse_for_clause()?))
        };
        self.expect(TokenKind::ParenClose, "`)`")?;

        let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::ForC {
                init,
                cond,
                update,
                body,
            },
            start,
        ))
    }

    /// Init/update clause of a C-style `for`: declaration, assignment, or
    /// bare expression.
    fn parse_for_clause(&mut self) -> PResult<Node> {
        if self.at(TokenKind::Ident) && self.nth(1) == TokenKind::Colon {
            self.parse_var_decl()
        } else {
            self.parse_assign_or_expr()
        }
    }

    /// `switch expr (case expr statement*)* [default statement*] end`
    fn parse_switch(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwSwitch, "`switch`")?;
        let scrutinee = self.parse_expression()?;

        let mut cases = Vec::new();
        let mut default_body = None;
        loop {
            self.skip_separators();
            match self.current() {
                TokenKind::KwCase => {
                    let case_start = self.bump().span;
                    let value = self.parse_expression()?;
                    let body = self.parse_statements_until(&[
                        TokenKind::KwCase,
                        TokenKind::KwDefault,
                        TokenKind::KwEnd,
                    ])?;
                    cases.push(Node::new(
                        NodeKind::Case {
                            value: Box::new(value),
                            body,
                        },
                        case_start,
                    ));
                }
                TokenKind::KwDefault => {
                    self.bump();
                    default_body = Some(self.parse_statements_until(&[TokenKind::KwEnd])?);
                }
                TokenKind::KwEnd => break,
                _ => return Err(self.error_expected("`case`, `default`, or `end`")),
            }
        }
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::Switch {
                scrutinee: Box::new(scrutinee),
                cases,
                default_body,
            },
            start,
        ))
    }

    /// `try statement* [catch [( [Type] name )] statement*]
    ///  [finally statement*] end`
    fn parse_try(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwTry, "`try`")?;
        let try_body = self.parse_statements_until(&[
            TokenKind::KwCatch,
            TokenKind::KwFinally,
            TokenKind::KwEnd,
        ])?;

        let mut error_ty = None;
        let mut error_name = None;
        let catch_body = if self.eat(TokenKind::KwCatch) {
            if self.eat(TokenKind::ParenOpen) {
                let (first, _) = self.expect_ident("error binding")?;
                if self.at(TokenKind::Ident) {
                    let (second, _) = self.expect_ident("error binding")?;
                    error_ty = Some(first);
                    error_name = Some(second);
                } else {
                    error_name = Some(first);
                }
                self.expect(TokenKind::ParenClose, "`)`")?;
            }
            self.parse_statements_until(&[TokenKind::KwFinally, TokenKind::KwEnd])?
        } else {
            Vec::new()
        };

        let finally_body = if self.eat(TokenKind::KwFinally) {
            self.parse_statements_until(&[TokenKind::KwEnd])?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::TryCatch {
                try_body,
                error_ty,
                error_name,
                catch_body,
                finally_body,
            },
            start,
        ))
    }

    /// `match expr (when pattern => statement*)* [otherwise => statement*] end`
    fn parse_match(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwMatch, "`match`")?;
        let scrutinee = self.parse_expression()?;

        let mut cases = Vec::new();
        let mut otherwise = None;
        loop {
            self.skip_separators();
            match self.current() {
                TokenKind::KwWhen => {
                    let case_start = self.bump().span;
                    let pattern = self.parse_expression()?;
                    self.expect(TokenKind::FatArrow, "`=>`")?;
                    let body = self.parse_statements_until(&[
                        TokenKind::KwWhen,
                        TokenKind::KwOtherwise,
                        TokenKind::KwEnd,
                    ])?;
                    cases.push(Node::new(
                        NodeKind::MatchCase {
                            pattern: Box::new(pattern),
                            body,
                        },
                        case_start,
                    ));
                }
                TokenKind::KwOtherwise => {
                    self.bump();
                    self.expect(TokenKind::FatArrow, "`=>`")?;
                    otherwise = Some(self.parse_statements_until(&[TokenKind::KwEnd])?);
                }
                TokenKind::KwEnd => break,
                _ => return Err(self.error_expected("`when`, `otherwise`, or `end`")),
            }
        }
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::Match {
                scrutinee: Box::new(scrutinee),
                cases,
                otherwise,
            },
            start,
        ))
    }

    /// `ui(...)`, `css(...)`, `register_event(...)` parse as calls; the
    /// emitter treats them like any other unresolved function.
    fn parse_builtin_call(&mut self) -> PResult<Node> {
        let token = self.bump();
        let callee = match token.kind {
            TokenKind::KwUi => "ui",
            TokenKind::KwCss => "css",
            TokenKind::KwRegisterEvent => "register_event",
            _ => unreachable!("parse_builtin_call called on wrong token"),
        };
        let args = self.parse_call_args()?;
        Ok(Node::new(
            NodeKind::Call {
                callee: callee.to_string(),
                args,
            },
            token.span,
        ))
    }
}

/// Class name from a declared type, if the type is class-like.
fn ty_name_class(ty_name: &str) -> Option<&str> {
    match ty_name {
        "int" | "float" | "bool" | "str" | "string" | "void" => None,
        _ => Some(ty_name),
    }
}
