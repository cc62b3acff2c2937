//! Expression parsing: precedence climbing, postfix chains, lambda
//! lookahead and curry folding.

use crate::ast::{BinOp, Node, NodeKind, UnaryOp};
use crate::lexer::TokenKind;
use crate::parser::core::{PResult, Parser};

impl Parser<'_, '_> {
    /// Entry point for any expression position.
    pub(in crate::parser) fn parse_expression(&mut self) -> PResult<Node> {
        self.enter_recursion()?;
        let result = self.parse_compose();
        self.exit_recursion();
        result
    }

    /// Lowest tier: function composition `f >> g`, left-associative.
    fn parse_compose(&mut self) -> PResult<Node> {
        let mut lhs = self.parse_simple()?;
        while self.at(TokenKind::Shr) {
            self.bump();
            let rhs = self.parse_simple()?;
            let span = lhs.span;
            lhs = Node::new(
                NodeKind::Compose {
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Additive, comparison and logical operators share one tier and fold
    /// left-associatively.
    fn parse_simple(&mut self) -> PResult<Node> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.current() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Ge => BinOp::Ge,
                TokenKind::Le => BinOp::Le,
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                TokenKind::KwAnd => BinOp::And,
                TokenKind::KwOr => BinOp::Or,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_term()?;
            let span = lhs.span;
            lhs = Node::new(
                NodeKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    /// Multiplicative tier.
    fn parse_term(&mut self) -> PResult<Node> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_unary()?;
            let span = lhs.span;
            lhs = Node::new(
                NodeKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Node> {
        let op = match self.current() {
            TokenKind::KwNot => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.bump().span;
        let operand = self.parse_unary()?;
        Ok(Node::new(
            NodeKind::Unary {
                op,
                operand: Box::new(operand),
            },
            start,
        ))
    }

    /// Postfix chain: after any primary, repeatedly accept `.name`,
    /// `(args)`, `[expr]`.
    fn parse_postfix(&mut self) -> PResult<Node> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current() {
                TokenKind::Dot => {
                    self.bump();
                    let (member, _) = self.expect_ident("member name")?;
                    if self.at(TokenKind::ParenOpen) {
                        expr = self.finish_method_call(expr, member)?;
                    } else {
                        let span = expr.span;
                        expr = Node::new(
                            NodeKind::Member {
                                object: Box::new(expr),
                                member,
                            },
                            span,
                        );
                    }
                }
                TokenKind::ParenOpen => {
                    expr = self.finish_call(expr)?;
                }
                TokenKind::BracketOpen => {
                    self.bump();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::BracketClose, "`]`")?;
                    let span = expr.span;
                    expr = Node::new(
                        NodeKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `.name(args)` on an object.
    ///
    /// When the receiver's static class is known, the call rewrites to
    /// `Class.name` with the receiver threaded as first argument. A
    /// receiver of unknown class keeps the qualified spelling
    /// (`alias.name`), which is how module-qualified calls stay
    /// resolvable. Non-identifier receivers always thread.
    fn finish_method_call(&mut self, object: Node, method: String) -> PResult<Node> {
        let args = self.parse_call_args()?;
        let span = object.span;

        if let NodeKind::Ident { name } = &object.kind {
            if let Some(class) = self.classes.get(name).cloned() {
                let mut call_args = vec![object];
                call_args.extend(args);
                return Ok(Node::new(
                    NodeKind::Call {
                        callee: format!("{class}.{method}"),
                        args: call_args,
                    },
                    span,
                ));
            }
            return Ok(Node::new(
                NodeKind::Call {
                    callee: format!("{name}.{method}"),
                    args,
                },
                span,
            ));
        }

        let mut call_args = vec![object];
        call_args.extend(args);
        Ok(Node::new(
            NodeKind::Call {
                callee: method,
                args: call_args,
            },
            span,
        ))
    }

    /// `(args)` after an expression: a plain call on an identifier, or a
    /// curry fold when argument groups stack (`f(1)(2)`).
    fn finish_call(&mut self, expr: Node) -> PResult<Node> {
        let span = expr.span;
        match expr.kind {
            NodeKind::Ident { name } => {
                let args = self.parse_call_args()?;
                Ok(Node::new(
                    NodeKind::Call {
                        callee: name,
                        args,
                    },
                    span,
                ))
            }
            NodeKind::Call { callee, args } => {
                let more = self.parse_call_args()?;
                let mut applied = args;
                applied.extend(more);
                Ok(Node::new(
                    NodeKind::Curry {
                        callee,
                        applied,
                        total: None,
                    },
                    span,
                ))
            }
            NodeKind::Curry {
                callee,
                mut applied,
                total,
            } => {
                let more = self.parse_call_args()?;
                applied.extend(more);
                Ok(Node::new(
                    NodeKind::Curry {
                        callee,
                        applied,
                        total,
                    },
                    span,
                ))
            }
            _ => Err(self.error_at(span, "only named functions can be called")),
        }
    }

    /// `( [expr {, expr}] )`
    pub(in crate::parser) fn parse_call_args(&mut self) -> PResult<Vec<Node>> {
        self.expect(TokenKind::ParenOpen, "`(`")?;
        let mut args = Vec::new();
        if !self.at(TokenKind::ParenClose) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::ParenClose, "`)`")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Node> {
        match self.current() {
            TokenKind::Number => {
                let token = self.bump();
                Ok(Node::number(self.lexer.number_value(&token), token.span))
            }
            TokenKind::Str => {
                let token = self.bump();
                Ok(Node::string(self.lexer.string_value(&token), token.span))
            }
            TokenKind::KwTrue => {
                let token = self.bump();
                Ok(Node::boolean(true, token.span))
            }
            TokenKind::KwFalse => {
                let token = self.bump();
                Ok(Node::boolean(false, token.span))
            }
            TokenKind::KwThis => {
                let token = self.bump();
                Ok(Node::new(NodeKind::This, token.span))
            }
            TokenKind::Ident => {
                let token = self.bump();
                Ok(Node::ident(self.lexer.text(&token), token.span))
            }
            TokenKind::KwNew => {
                let start = self.bump().span;
                let (class, _) = self.expect_ident("class name")?;
                let args = self.parse_call_args()?;
                Ok(Node::new(NodeKind::New { class, args }, start))
            }
            TokenKind::BracketOpen => {
                let start = self.bump().span;
                let mut elements = Vec::new();
                if !self.at(TokenKind::BracketClose) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::BracketClose, "`]`")?;
                Ok(Node::new(NodeKind::ArrayLit { elements }, start))
            }
            TokenKind::ParenOpen => {
                if self.lambda_ahead() {
                    self.parse_lambda()
                } else {
                    self.bump();
                    let inner = self.parse_expression()?;
                    self.expect(TokenKind::ParenClose, "`)`")?;
                    Ok(inner)
                }
            }
            _ => Err(self.error_expected("an expression")),
        }
    }

    /// Speculative scan deciding `(` between grouping and lambda.
    ///
    /// The full signature pattern must match before committing:
    /// `( name [: type] , ... ) [-> type]` followed by `=>` or `{`.
    /// The lexer state is restored either way.
    fn lambda_ahead(&mut self) -> bool {
        let state = self.lexer.save();
        let ok = self.scan_lambda_signature();
        self.lexer.restore(state);
        ok
    }

    fn scan_lambda_signature(&mut self) -> bool {
        if !self.eat(TokenKind::ParenOpen) {
            return false;
        }
        if !self.eat(TokenKind::ParenClose) {
            loop {
                if !self.eat(TokenKind::Ident) {
                    return false;
                }
                if self.eat(TokenKind::Colon) && !self.eat_type_name_token() {
                    return false;
                }
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
            if !self.eat(TokenKind::ParenClose) {
                return false;
            }
        }
        if self.eat(TokenKind::Arrow) && !self.eat_type_name_token() {
            return false;
        }
        self.at(TokenKind::FatArrow) || self.at(TokenKind::BraceOpen)
    }

    fn eat_type_name_token(&mut self) -> bool {
        matches!(
            self.current(),
            TokenKind::Ident | TokenKind::KwInt | TokenKind::KwFloat
        ) && {
            self.bump();
            true
        }
    }

    /// `( params ) [-> type] => expr` or `( params ) [-> type] { expr }`
    fn parse_lambda(&mut self) -> PResult<Node> {
        let start = self.current_span();
        let params = self.parse_param_list()?;
        let return_ty = if self.eat(TokenKind::Arrow) {
            Some(self.expect_type_name()?)
        } else {
            None
        };

        let body = if self.eat(TokenKind::FatArrow) {
            self.parse_expression()?
        } else {
            self.expect(TokenKind::BraceOpen, "`=>` or `{`")?;
            let body = self.parse_expression()?;
            self.expect(TokenKind::BraceClose, "`}`")?;
            body
        };

        Ok(Node::new(
            NodeKind::Lambda {
                params,
                return_ty,
                body: Box::new(body),
            },
            start,
        ))
    }
}
