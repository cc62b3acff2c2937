//! Program shape and top-level definitions.

use crate::ast::{AdviceKind, ImportSymbol, Node, NodeKind, Param};
use crate::lexer::TokenKind;
use crate::parser::core::{PResult, Parser};

impl Parser<'_, '_> {
    /// `program := item* "main" statement* "end"`
    ///
    /// Anything after the closing `end` is a syntax error.
    pub(in crate::parser) fn parse_program(&mut self) -> PResult<Node> {
        let start = self.current_span();
        let mut body = Vec::new();

        self.skip_separators();
        loop {
            match self.current() {
                TokenKind::KwFunc => body.push(self.parse_function()?),
                TokenKind::KwClass => body.push(self.parse_class()?),
                TokenKind::KwModule => body.push(self.parse_module()?),
                TokenKind::KwImport => body.push(self.parse_import()?),
                TokenKind::KwFrom => body.push(self.parse_from_import()?),
                TokenKind::KwAspect => body.push(self.parse_aspect()?),
                _ => break,
            }
            self.skip_separators();
        }

        if self.at(TokenKind::Ident) && self.lexer.text(&self.current_token()) == "main" {
            self.bump();
        } else {
            return Err(self.error_expected("`main`"));
        }

        let stmts = self.parse_statements_until(&[TokenKind::KwEnd])?;
        body.extend(stmts);
        self.expect(TokenKind::KwEnd, "`end`")?;

        self.skip_separators();
        if !self.at_eof() {
            return Err(self.error_expected("end of file"));
        }

        Ok(Node::program(body, start))
    }

    /// `func name(params) [-> type] statement* end`
    pub(in crate::parser) fn parse_function(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwFunc, "`func`")?;
        let (name, _) = self.expect_ident("function name")?;

        let params = self.parse_param_list()?;
        let return_ty = if self.eat(TokenKind::Arrow) {
            Some(self.expect_type_name()?)
        } else {
            None
        };

        let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::FunctionDef {
                name,
                params,
                return_ty,
                body,
            },
            start,
        ))
    }

    /// `( name [: type] , ... )`
    pub(in crate::parser) fn parse_param_list(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::ParenOpen, "`(`")?;
        let mut params = Vec::new();
        if !self.at(TokenKind::ParenClose) {
            loop {
                let (name, span) = self.expect_ident("parameter name")?;
                let ty_name = if self.eat(TokenKind::Colon) {
                    Some(self.expect_type_name()?)
                } else {
                    None
                };
                params.push(Param {
                    name,
                    ty_name,
                    span,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::ParenClose, "`)`")?;
        Ok(params)
    }

    /// `class Name [: Base] member* end` where members are functions and
    /// field declarations.
    pub(in crate::parser) fn parse_class(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwClass, "`class`")?;
        let (name, _) = self.expect_ident("class name")?;
        let base = if self.eat(TokenKind::Colon) {
            Some(self.expect_ident("base class name")?.0)
        } else {
            None
        };

        let mut members = Vec::new();
        loop {
            self.skip_separators();
            match self.current() {
                TokenKind::KwEnd => break,
                TokenKind::KwFunc => members.push(self.parse_function()?),
                TokenKind::Ident if self.nth(1) == TokenKind::Colon => {
                    members.push(self.parse_var_decl()?);
                }
                _ => return Err(self.error_expected("`func`, a field declaration, or `end`")),
            }
        }
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::ClassDef {
                name,
                base,
                members,
            },
            start,
        ))
    }

    /// `module Name decl* end`. An `export` prefix is accepted on any
    /// declaration; visibility is resolved at link time, not here.
    pub(in crate::parser) fn parse_module(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwModule, "`module`")?;
        let (name, _) = self.expect_ident("module name")?;

        let mut decls = Vec::new();
        loop {
            self.skip_separators();
            if self.at(TokenKind::KwExport) {
                self.bump();
            }
            match self.current() {
                TokenKind::KwEnd => break,
                TokenKind::KwFunc => decls.push(self.parse_function()?),
                TokenKind::KwClass => decls.push(self.parse_class()?),
                TokenKind::Ident if self.nth(1) == TokenKind::Colon => {
                    decls.push(self.parse_var_decl()?);
                }
                _ => return Err(self.error_expected("a declaration or `end`")),
            }
        }
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(NodeKind::ModuleDecl { name, decls }, start))
    }

    /// `import Name [as Alias]`
    pub(in crate::parser) fn parse_import(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwImport, "`import`")?;
        let (module, _) = self.expect_ident("module name")?;
        let alias = if self.eat(TokenKind::KwAs) {
            Some(self.expect_ident("import alias")?.0)
        } else {
            None
        };
        Ok(Node::new(
            NodeKind::Import {
                module,
                alias,
                symbols: None,
            },
            start,
        ))
    }

    /// `from Name import sym [as alias] , ...`
    pub(in crate::parser) fn parse_from_import(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwFrom, "`from`")?;
        let (module, _) = self.expect_ident("module name")?;
        self.expect(TokenKind::KwImport, "`import`")?;

        let mut symbols = Vec::new();
        loop {
            let (name, _) = self.expect_ident("imported symbol")?;
            let alias = if self.eat(TokenKind::KwAs) {
                Some(self.expect_ident("symbol alias")?.0)
            } else {
                None
            };
            symbols.push(ImportSymbol { name, alias });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok(Node::new(
            NodeKind::Import {
                module,
                alias: None,
                symbols: Some(symbols),
            },
            start,
        ))
    }

    /// `aspect Name (pointcut | advice)* end`
    ///
    /// Pointcuts and advice may appear in any order; each advice must name
    /// a pointcut of this aspect.
    pub(in crate::parser) fn parse_aspect(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwAspect, "`aspect`")?;
        let (name, _) = self.expect_ident("aspect name")?;

        let mut pointcuts: Vec<Node> = Vec::new();
        let mut advice: Vec<Node> = Vec::new();
        loop {
            self.skip_separators();
            match self.current() {
                TokenKind::KwEnd => break,
                TokenKind::KwPointcut => pointcuts.push(self.parse_pointcut()?),
                TokenKind::KwAdvice => advice.push(self.parse_advice()?),
                _ => return Err(self.error_expected("`pointcut`, `advice`, or `end`")),
            }
        }
        self.expect(TokenKind::KwEnd, "`end`")?;

        // Advice can only reference pointcuts of the enclosing aspect.
        for adv in &advice {
            let NodeKind::Advice { pointcut, .. } = &adv.kind else {
                continue;
            };
            let declared = pointcuts.iter().any(|p| {
                matches!(&p.kind, NodeKind::Pointcut { name, .. } if name == pointcut)
            });
            if !declared {
                return Err(self.error_at(
                    adv.span,
                    format!("advice references undeclared pointcut `{pointcut}`"),
                ));
            }
        }

        Ok(Node::new(
            NodeKind::AspectDef {
                name,
                pointcuts,
                advice,
            },
            start,
        ))
    }

    /// `pointcut Name "glob"`
    fn parse_pointcut(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwPointcut, "`pointcut`")?;
        let (name, _) = self.expect_ident("pointcut name")?;

        let token = self.expect(TokenKind::Str, "pointcut pattern string")?;
        let pattern = self.lexer.string_value(&token).to_string();
        if pattern.is_empty() {
            return Err(self.error_at(token.span, "pointcut pattern must not be empty"));
        }

        Ok(Node::new(NodeKind::Pointcut { name, pattern }, start))
    }

    /// `advice (before|after|around) PointcutName statement* end`
    fn parse_advice(&mut self) -> PResult<Node> {
        let start = self.current_span();
        self.expect(TokenKind::KwAdvice, "`advice`")?;

        let kind = match self.current() {
            TokenKind::KwBefore => AdviceKind::Before,
            TokenKind::KwAfter => AdviceKind::After,
            TokenKind::KwAround => AdviceKind::Around,
            _ => return Err(self.error_expected("`before`, `after`, or `around`")),
        };
        self.bump();

        let (pointcut, _) = self.expect_ident("pointcut name")?;
        let body = self.parse_statements_until(&[TokenKind::KwEnd])?;
        self.expect(TokenKind::KwEnd, "`end`")?;

        Ok(Node::new(
            NodeKind::Advice {
                kind,
                pointcut,
                body,
            },
            start,
        ))
    }
}
