//! The Lyn abstract syntax tree.
//!
//! A program is a single-rooted tree of [`Node`]s. Every child slot is a
//! `Box` or `Vec`, so each node has exactly one owner at every observation
//! point: `clone` produces a fully disjoint tree and dropping the root
//! releases the whole subtree post-order. Passes that re-root subtrees
//! (weaver, macro expander, optimizer) move nodes out of their old slot
//! before attaching them anywhere else.
//!
//! Nodes carry the span of the first token of their production and an
//! inferred-type slot that stays `None` until the inference pass runs.

mod print;
mod stats;
mod ty;


use lyn_core::Span;

pub use print::pretty;
pub use stats::TreeStats;
pub use ty::Ty;

/// One AST node: variant data plus source span and inferred type.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// `None` until type inference runs.
    pub ty: Option<Ty>,
}

/// Direction of an advice relative to its joinpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AdviceKind {
    Before,
    After,
    Around,
}

impl AdviceKind {
    pub fn name(self) -> &'static str {
        match self {
            AdviceKind::Before => "before",
            AdviceKind::After => "after",
            AdviceKind::Around => "around",
        }
    }
}

/// Binary operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::Eq | BinOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

/// Unary operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Neg => "-",
        }
    }
}

/// Function or lambda parameter: a name with an optional type name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Param {
    pub name: String,
    pub ty_name: Option<String>,
    pub span: Span,
}

/// One entry of a selective import list: symbol plus optional alias.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportSymbol {
    pub name: String,
    pub alias: Option<String>,
}

/// The closed set of node variants.
#[derive(Debug, Clone, serde::Serialize)]
pub enum NodeKind {
    // Top-level
    Program {
        body: Vec<Node>,
    },
    FunctionDef {
        name: String,
        params: Vec<Param>,
        return_ty: Option<String>,
        body: Vec<Node>,
    },
    ClassDef {
        name: String,
        base: Option<String>,
        members: Vec<Node>,
    },
    ModuleDecl {
        name: String,
        decls: Vec<Node>,
    },
    Import {
        module: String,
        alias: Option<String>,
        symbols: Option<Vec<ImportSymbol>>,
    },
    AspectDef {
        name: String,
        pointcuts: Vec<Node>,
        advice: Vec<Node>,
    },

    // Statements
    Block {
        body: Vec<Node>,
    },
    If {
        cond: Box<Node>,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
    },
    While {
        cond: Box<Node>,
        body: Vec<Node>,
    },
    DoWhile {
        body: Vec<Node>,
        cond: Box<Node>,
    },
    ForRange {
        var: String,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Vec<Node>,
    },
    ForEach {
        var: String,
        iterable: Box<Node>,
        body: Vec<Node>,
    },
    ForC {
        init: Option<Box<Node>>,
        cond: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Vec<Node>,
    },
    Switch {
        scrutinee: Box<Node>,
        cases: Vec<Node>,
        default_body: Option<Vec<Node>>,
    },
    Case {
        value: Box<Node>,
        body: Vec<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    VarDecl {
        name: String,
        ty_name: Option<String>,
        init: Option<Box<Node>>,
    },
    VarAssign {
        name: String,
        value: Box<Node>,
    },
    MemberAssign {
        object: Box<Node>,
        member: String,
        value: Box<Node>,
    },
    Print {
        value: Box<Node>,
    },
    Break,
    Continue,
    TryCatch {
        try_body: Vec<Node>,
        error_ty: Option<String>,
        error_name: Option<String>,
        catch_body: Vec<Node>,
        finally_body: Vec<Node>,
    },
    Throw {
        value: Box<Node>,
    },

    // Expressions
    Number {
        value: f64,
    },
    Str {
        value: String,
    },
    Bool {
        value: bool,
    },
    Null,
    Ident {
        name: String,
    },
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Member {
        object: Box<Node>,
        member: String,
    },
    Index {
        object: Box<Node>,
        index: Box<Node>,
    },
    ArrayLit {
        elements: Vec<Node>,
    },
    Call {
        callee: String,
        args: Vec<Node>,
    },
    Lambda {
        params: Vec<Param>,
        return_ty: Option<String>,
        body: Box<Node>,
    },
    Compose {
        left: Box<Node>,
        right: Box<Node>,
    },
    Curry {
        callee: String,
        applied: Vec<Node>,
        /// Arity of the callee once inference resolves it.
        total: Option<usize>,
    },
    New {
        class: String,
        args: Vec<Node>,
    },
    This,

    // Aspect members
    Pointcut {
        name: String,
        pattern: String,
    },
    Advice {
        kind: AdviceKind,
        pointcut: String,
        body: Vec<Node>,
    },

    // Pattern matching
    Match {
        scrutinee: Box<Node>,
        cases: Vec<Node>,
        otherwise: Option<Vec<Node>>,
    },
    MatchCase {
        pattern: Box<Node>,
        body: Vec<Node>,
    },
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
        }
    }

    pub fn number(value: f64, span: Span) -> Self {
        Self::new(NodeKind::Number { value }, span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self::new(
            NodeKind::Str {
                value: value.into(),
            },
            span,
        )
    }

    pub fn boolean(value: bool, span: Span) -> Self {
        Self::new(NodeKind::Bool { value }, span)
    }

    pub fn ident(name: impl Into<String>, span: Span) -> Self {
        Self::new(NodeKind::Ident { name: name.into() }, span)
    }

    pub fn block(body: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::Block { body }, span)
    }

    pub fn program(body: Vec<Node>, span: Span) -> Self {
        Self::new(NodeKind::Program { body }, span)
    }

    /// Variant name, used by the pretty-printer and error messages.
    pub fn variant_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::FunctionDef { .. } => "FunctionDef",
            NodeKind::ClassDef { .. } => "ClassDef",
            NodeKind::ModuleDecl { .. } => "ModuleDecl",
            NodeKind::Import { .. } => "Import",
            NodeKind::AspectDef { .. } => "AspectDef",
            NodeKind::Block { .. } => "Block",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::DoWhile { .. } => "DoWhile",
            NodeKind::ForRange { .. } => "ForRange",
            NodeKind::ForEach { .. } => "ForEach",
            NodeKind::ForC { .. } => "ForC",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::Case { .. } => "Case",
            NodeKind::Return { .. } => "Return",
            NodeKind::VarDecl { .. } => "VarDecl",
            NodeKind::VarAssign { .. } => "VarAssign",
            NodeKind::MemberAssign { .. } => "MemberAssign",
            NodeKind::Print { .. } => "Print",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::TryCatch { .. } => "TryCatch",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Number { .. } => "Number",
            NodeKind::Str { .. } => "Str",
            NodeKind::Bool { .. } => "Bool",
            NodeKind::Null => "Null",
            NodeKind::Ident { .. } => "Ident",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Member { .. } => "Member",
            NodeKind::Index { .. } => "Index",
            NodeKind::ArrayLit { .. } => "ArrayLit",
            NodeKind::Call { .. } => "Call",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::Compose { .. } => "Compose",
            NodeKind::Curry { .. } => "Curry",
            NodeKind::New { .. } => "New",
            NodeKind::This => "This",
            NodeKind::Pointcut { .. } => "Pointcut",
            NodeKind::Advice { .. } => "Advice",
            NodeKind::Match { .. } => "Match",
            NodeKind::MatchCase { .. } => "MatchCase",
        }
    }

    /// Literal number payload, if this is a `Number` node.
    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Number { value } => Some(value),
            _ => None,
        }
    }

    /// Whether the node is a literal the optimizer treats as
    /// compile-time-known.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Number { .. } | NodeKind::Str { .. } | NodeKind::Bool { .. } | NodeKind::Null
        )
    }

    /// All direct children, in source order.
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.push_children(|n| out.push(n));
        out
    }

    /// All direct children, mutably, in source order.
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        // Mirrors `push_children`; kept as a separate exhaustive match
        // because closures cannot be generic over mutability.
        let mut out: Vec<&mut Node> = Vec::new();
        match &mut self.kind {
            NodeKind::Program { body }
            | NodeKind::Block { body }
            | NodeKind::ModuleDecl { decls: body, .. } => out.extend(body.iter_mut()),
            NodeKind::FunctionDef { body, .. } => out.extend(body.iter_mut()),
            NodeKind::ClassDef { members, .. } => out.extend(members.iter_mut()),
            NodeKind::Import { .. } => {}
            NodeKind::AspectDef {
                pointcuts, advice, ..
            } => {
                out.extend(pointcuts.iter_mut());
                out.extend(advice.iter_mut());
            }
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                out.push(cond);
                out.extend(then_body.iter_mut());
                out.extend(else_body.iter_mut());
            }
            NodeKind::While { cond, body } => {
                out.push(cond);
                out.extend(body.iter_mut());
            }
            NodeKind::DoWhile { body, cond } => {
                out.extend(body.iter_mut());
                out.push(cond);
            }
            NodeKind::ForRange {
                start,
                end,
                step,
                body,
                ..
            } => {
                out.push(start);
                out.push(end);
                if let Some(step) = step {
                    out.push(step);
                }
                out.extend(body.iter_mut());
            }
            NodeKind::ForEach {
                iterable, body, ..
            } => {
                out.push(iterable);
                out.extend(body.iter_mut());
            }
            NodeKind::ForC {
                init,
                cond,
                update,
                body,
            } => {
                if let Some(init) = init {
                    out.push(init);
                }
                if let Some(cond) = cond {
                    out.push(cond);
                }
                if let Some(update) = update {
                    out.push(update);
                }
                out.extend(body.iter_mut());
            }
            NodeKind::Switch {
                scrutinee,
                cases,
                default_body,
            } => {
                out.push(scrutinee);
                out.extend(cases.iter_mut());
                if let Some(default_body) = default_body {
                    out.extend(default_body.iter_mut());
                }
            }
            NodeKind::Case { value, body } => {
                out.push(value);
                out.extend(body.iter_mut());
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    out.push(value);
                }
            }
            NodeKind::VarDecl { init, .. } => {
                if let Some(init) = init {
                    out.push(init);
                }
            }
            NodeKind::VarAssign { value, .. } => out.push(value),
            NodeKind::MemberAssign { object, value, .. } => {
                out.push(object);
                out.push(value);
            }
            NodeKind::Print { value } => out.push(value),
            NodeKind::Break | NodeKind::Continue => {}
            NodeKind::TryCatch {
                try_body,
                catch_body,
                finally_body,
                ..
            } => {
                out.extend(try_body.iter_mut());
                out.extend(catch_body.iter_mut());
                out.extend(finally_body.iter_mut());
            }
            NodeKind::Throw { value } => out.push(value),
            NodeKind::Number { .. }
            | NodeKind::Str { .. }
            | NodeKind::Bool { .. }
            | NodeKind::Null
            | NodeKind::Ident { .. }
            | NodeKind::This
            | NodeKind::Pointcut { .. } => {}
            NodeKind::Binary { lhs, rhs, .. } => {
                out.push(lhs);
                out.push(rhs);
            }
            NodeKind::Unary { operand, .. } => out.push(operand),
            NodeKind::Member { object, .. } => out.push(object),
            NodeKind::Index { object, index } => {
                out.push(object);
                out.push(index);
            }
            NodeKind::ArrayLit { elements } => out.extend(elements.iter_mut()),
            NodeKind::Call { args, .. } => out.extend(args.iter_mut()),
            NodeKind::Lambda { body, .. } => out.push(body),
            NodeKind::Compose { left, right } => {
                out.push(left);
                out.push(right);
            }
            NodeKind::Curry { applied, .. } => out.extend(applied.iter_mut()),
            NodeKind::New { args, .. } => out.extend(args.iter_mut()),
            NodeKind::Advice { body, .. } => out.extend(body.iter_mut()),
            NodeKind::Match {
                scrutinee,
                cases,
                otherwise,
            } => {
                out.push(scrutinee);
                out.extend(cases.iter_mut());
                if let Some(otherwise) = otherwise {
                    out.extend(otherwise.iter_mut());
                }
            }
            NodeKind::MatchCase { pattern, body } => {
                out.push(pattern);
                out.extend(body.iter_mut());
            }
        }
        out
    }

    fn push_children<'a>(&'a self, mut push: impl FnMut(&'a Node)) {
        match &self.kind {
            NodeKind::Program { body }
            | NodeKind::Block { body }
            | NodeKind::ModuleDecl { decls: body, .. } => body.iter().for_each(&mut push),
            NodeKind::FunctionDef { body, .. } => body.iter().for_each(&mut push),
            NodeKind::ClassDef { members, .. } => members.iter().for_each(&mut push),
            NodeKind::Import { .. } => {}
            NodeKind::AspectDef {
                pointcuts, advice, ..
            } => {
                pointcuts.iter().for_each(&mut push);
                advice.iter().for_each(&mut push);
            }
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                push(cond);
                then_body.iter().for_each(&mut push);
                else_body.iter().for_each(&mut push);
            }
            NodeKind::While { cond, body } => {
                push(cond);
                body.iter().for_each(&mut push);
            }
            NodeKind::DoWhile { body, cond } => {
                body.iter().for_each(&mut push);
                push(cond);
            }
            NodeKind::ForRange {
                start,
                end,
                step,
                body,
                ..
            } => {
                push(start);
                push(end);
                if let Some(step) = step {
                    push(step);
                }
                body.iter().for_each(&mut push);
            }
            NodeKind::ForEach {
                iterable, body, ..
            } => {
                push(iterable);
                body.iter().for_each(&mut push);
            }
            NodeKind::ForC {
                init,
                cond,
                update,
                body,
            } => {
                if let Some(init) = init {
                    push(init);
                }
                if let Some(cond) = cond {
                    push(cond);
                }
                if let Some(update) = update {
                    push(update);
                }
                body.iter().for_each(&mut push);
            }
            NodeKind::Switch {
                scrutinee,
                cases,
                default_body,
            } => {
                push(scrutinee);
                cases.iter().for_each(&mut push);
                if let Some(default_body) = default_body {
                    default_body.iter().for_each(&mut push);
                }
            }
            NodeKind::Case { value, body } => {
                push(value);
                body.iter().for_each(&mut push);
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    push(value);
                }
            }
            NodeKind::VarDecl { init, .. } => {
                if let Some(init) = init {
                    push(init);
                }
            }
            NodeKind::VarAssign { value, .. } => push(value),
            NodeKind::MemberAssign { object, value, .. } => {
                push(object);
                push(value);
            }
            NodeKind::Print { value } => push(value),
            NodeKind::Break | NodeKind::Continue => {}
            NodeKind::TryCatch {
                try_body,
                catch_body,
                finally_body,
                ..
            } => {
                try_body.iter().for_each(&mut push);
                catch_body.iter().for_each(&mut push);
                finally_body.iter().for_each(&mut push);
            }
            NodeKind::Throw { value } => push(value),
            NodeKind::Number { .. }
            | NodeKind::Str { .. }
            | NodeKind::Bool { .. }
            | NodeKind::Null
            | NodeKind::Ident { .. }
            | NodeKind::This
            | NodeKind::Pointcut { .. } => {}
            NodeKind::Binary { lhs, rhs, .. } => {
                push(lhs);
                push(rhs);
            }
            NodeKind::Unary { operand, .. } => push(operand),
            NodeKind::Member { object, .. } => push(object),
            NodeKind::Index { object, index } => {
                push(object);
                push(index);
            }
            NodeKind::ArrayLit { elements } => elements.iter().for_each(&mut push),
            NodeKind::Call { args, .. } => args.iter().for_each(&mut push),
            NodeKind::Lambda { body, .. } => push(body),
            NodeKind::Compose { left, right } => {
                push(left);
                push(right);
            }
            NodeKind::Curry { applied, .. } => applied.iter().for_each(&mut push),
            NodeKind::New { args, .. } => args.iter().for_each(&mut push),
            NodeKind::Advice { body, .. } => body.iter().for_each(&mut push),
            NodeKind::Match {
                scrutinee,
                cases,
                otherwise,
            } => {
                push(scrutinee);
                cases.iter().for_each(&mut push);
                if let Some(otherwise) = otherwise {
                    otherwise.iter().for_each(&mut push);
                }
            }
            NodeKind::MatchCase { pattern, body } => {
                push(pattern);
                body.iter().for_each(&mut push);
            }
        }
    }
}
