//! Type inference.
//!
//! A pre-order walk that fills every node's `ty` slot using the scoped
//! symbol table. Signatures are collected in a first pass so calls can
//! resolve forward references; class methods register under
//! `Class.method`, matching the parser's receiver-threading rewrite.
//!
//! Unknown names and unresolvable types are warnings, never fatal: the
//! emitter falls back to its default representation where a type is
//! missing.

use indexmap::IndexMap;
use lyn_core::Span;

use crate::ast::{BinOp, Node, NodeKind, Param, Ty, UnaryOp};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

use super::SymbolTable;

/// Callable signature: arity plus declared return type name.
#[derive(Debug, Clone)]
pub struct FnSig {
    pub arity: usize,
    pub return_ty: Option<String>,
}

pub struct Inferencer<'d> {
    symbols: SymbolTable,
    functions: IndexMap<String, FnSig>,
    current_class: Option<String>,
    current_return: Option<Ty>,
    diag: &'d mut Diagnostics,
}

impl<'d> Inferencer<'d> {
    pub fn new(diag: &'d mut Diagnostics) -> Self {
        Self {
            symbols: SymbolTable::new(),
            functions: IndexMap::new(),
            current_class: None,
            current_return: None,
            diag,
        }
    }

    /// Infer types over the whole tree.
    pub fn run(&mut self, ast: &mut Node) {
        self.collect_signatures(ast, None);
        self.infer_node(ast);
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn functions(&self) -> &IndexMap<String, FnSig> {
        &self.functions
    }

    fn warn(&mut self, kind: DiagnosticKind, span: Span, msg: impl Into<String>) {
        self.diag.warning(Stage::Infer, kind, span, msg).emit();
    }

    /// First pass: function and method signatures, for forward calls.
    fn collect_signatures(&mut self, node: &Node, class: Option<&str>) {
        match &node.kind {
            NodeKind::FunctionDef {
                name,
                params,
                return_ty,
                body,
            } => {
                let full_name = match class {
                    Some(class) => format!("{class}.{name}"),
                    None => name.clone(),
                };
                self.functions.insert(
                    full_name,
                    FnSig {
                        arity: params.len(),
                        return_ty: return_ty.clone(),
                    },
                );
                for stmt in body {
                    self.collect_signatures(stmt, None);
                }
            }
            NodeKind::ClassDef { name, members, .. } => {
                for member in members {
                    self.collect_signatures(member, Some(name));
                }
            }
            _ => {
                for child in node.children() {
                    self.collect_signatures(child, None);
                }
            }
        }
    }

    fn bind_params(&mut self, params: &[Param]) {
        for param in params {
            let ty = match &param.ty_name {
                Some(name) => Ty::from_name(name),
                None if param.name == "self" => self
                    .current_class
                    .clone()
                    .map_or(Ty::Float, Ty::Class),
                // Numbers are the default currency of the language.
                None => Ty::Float,
            };
            self.symbols.add(&param.name, ty, param.span, self.diag);
        }
    }

    fn infer_body(&mut self, body: &mut [Node]) {
        self.symbols.enter_scope();
        for stmt in body {
            self.infer_node(stmt);
        }
        self.symbols.exit_scope(self.diag);
    }

    fn infer_node(&mut self, node: &mut Node) {
        let span = node.span;
        let ty: Option<Ty> = match &mut node.kind {
            // The Program body lives in the global scope.
            NodeKind::Program { body } => {
                for stmt in body {
                    self.infer_node(stmt);
                }
                None
            }
            NodeKind::FunctionDef {
                params,
                return_ty,
                body,
                ..
            } => {
                let saved_return = self.current_return.take();
                self.current_return = return_ty.as_deref().map(Ty::from_name);

                self.symbols.enter_scope();
                let params = params.clone();
                self.bind_params(&params);
                for stmt in body {
                    self.infer_node(stmt);
                }
                self.symbols.exit_scope(self.diag);

                self.current_return = saved_return;
                None
            }
            NodeKind::ClassDef { name, members, .. } => {
                let saved_class = self.current_class.replace(name.clone());
                self.symbols.enter_scope();
                for member in members {
                    self.infer_node(member);
                }
                self.symbols.exit_scope(self.diag);
                self.current_class = saved_class;
                None
            }
            NodeKind::ModuleDecl { decls, .. } => {
                self.infer_body(decls);
                None
            }
            NodeKind::Import { .. } => None,
            NodeKind::AspectDef { .. } => None,
            NodeKind::Block { body } => {
                self.infer_body(body);
                None
            }
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                self.infer_node(cond);
                self.infer_body(then_body);
                self.infer_body(else_body);
                None
            }
            NodeKind::While { cond, body } => {
                self.infer_node(cond);
                self.infer_body(body);
                None
            }
            NodeKind::DoWhile { body, cond } => {
                self.infer_body(body);
                self.infer_node(cond);
                None
            }
            NodeKind::ForRange {
                var,
                start,
                end,
                step,
                body,
            } => {
                self.infer_node(start);
                self.infer_node(end);
                if let Some(step) = step {
                    self.infer_node(step);
                }
                self.symbols.enter_scope();
                let var = var.clone();
                self.symbols.add(&var, Ty::Int, span, self.diag);
                for stmt in body {
                    self.infer_node(stmt);
                }
                self.symbols.exit_scope(self.diag);
                None
            }
            NodeKind::ForEach {
                var,
                iterable,
                body,
            } => {
                self.infer_node(iterable);
                let element_ty = match &iterable.ty {
                    Some(Ty::Array(inner)) => (**inner).clone(),
                    _ => Ty::Float,
                };
                self.symbols.enter_scope();
                let var = var.clone();
                self.symbols.add(&var, element_ty, span, self.diag);
                for stmt in body {
                    self.infer_node(stmt);
                }
                self.symbols.exit_scope(self.diag);
                None
            }
            NodeKind::ForC {
                init,
                cond,
                update,
                body,
            } => {
                self.symbols.enter_scope();
                if let Some(init) = init {
                    self.infer_node(init);
                }
                if let Some(cond) = cond {
                    self.infer_node(cond);
                }
                if let Some(update) = update {
                    self.infer_node(update);
                }
                for stmt in body {
                    self.infer_node(stmt);
                }
                self.symbols.exit_scope(self.diag);
                None
            }
            NodeKind::Switch {
                scrutinee,
                cases,
                default_body,
            } => {
                self.infer_node(scrutinee);
                for case in cases {
                    self.infer_node(case);
                }
                if let Some(default_body) = default_body {
                    self.infer_body(default_body);
                }
                None
            }
            NodeKind::Case { value, body } => {
                self.infer_node(value);
                self.infer_body(body);
                None
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    self.infer_node(value);
                    let expected = self.current_return.clone();
                    if let (Some(expected), Some(actual)) = (expected, &value.ty)
                        && !types_compatible(&expected, actual)
                    {
                        let message = format!(
                            "return value has type {actual}, function declares {expected}"
                        );
                        self.warn(DiagnosticKind::Type, span, message);
                    }
                }
                None
            }
            NodeKind::VarDecl { name, ty_name, init } => {
                let declared = ty_name.as_deref().map(Ty::from_name);
                let init_ty = init.as_deref_mut().and_then(|init| {
                    self.infer_node(init);
                    init.ty.clone()
                });

                if let (Some(declared), Some(actual)) = (&declared, &init_ty)
                    && !types_compatible(declared, actual)
                {
                    let message =
                        format!("initializer has type {actual}, declaration says {declared}");
                    self.warn(DiagnosticKind::Type, span, message);
                }

                let ty = declared.or(init_ty).unwrap_or(Ty::Float);
                let name = name.clone();
                self.symbols.add(&name, ty.clone(), span, self.diag);
                Some(ty)
            }
            NodeKind::VarAssign { name, value } => {
                self.infer_node(value);
                let value_ty = value.ty.clone().unwrap_or(Ty::Float);
                // Assignment to an undeclared name declares it implicitly.
                let name = name.clone();
                self.symbols.assign(&name, value_ty.clone());
                Some(value_ty)
            }
            NodeKind::MemberAssign { object, value, .. } => {
                self.infer_node(object);
                self.infer_node(value);
                None
            }
            NodeKind::Print { value } | NodeKind::Throw { value } => {
                self.infer_node(value);
                None
            }
            NodeKind::Break | NodeKind::Continue => None,
            NodeKind::TryCatch {
                try_body,
                error_ty,
                error_name,
                catch_body,
                finally_body,
            } => {
                self.infer_body(try_body);

                self.symbols.enter_scope();
                if let Some(name) = error_name {
                    let ty = error_ty
                        .as_deref()
                        .map_or(Ty::Str, |ty_name| Ty::from_name(ty_name));
                    let name = name.clone();
                    self.symbols.add(&name, ty, span, self.diag);
                }
                for stmt in catch_body {
                    self.infer_node(stmt);
                }
                self.symbols.exit_scope(self.diag);

                self.infer_body(finally_body);
                None
            }
            NodeKind::Number { value } => {
                let value = *value;
                if value.fract() == 0.0 && value.abs() < 9.0e15 {
                    Some(Ty::Int)
                } else {
                    Some(Ty::Float)
                }
            }
            NodeKind::Str { .. } => Some(Ty::Str),
            NodeKind::Bool { .. } => Some(Ty::Bool),
            NodeKind::Null => Some(Ty::Null),
            NodeKind::Ident { name } => {
                if let Some(ty) = self.symbols.lookup(name) {
                    Some(ty.clone())
                } else if self.functions.contains_key(name.as_str()) {
                    Some(Ty::Function)
                } else {
                    let message = format!("use of undefined variable `{name}`");
                    self.warn(DiagnosticKind::Name, span, message);
                    None
                }
            }
            NodeKind::Binary { op, lhs, rhs } => {
                let op = *op;
                self.infer_node(lhs);
                self.infer_node(rhs);
                binary_result(op, lhs.ty.as_ref(), rhs.ty.as_ref())
            }
            NodeKind::Unary { op, operand } => {
                let op = *op;
                self.infer_node(operand);
                match op {
                    UnaryOp::Not => Some(Ty::Bool),
                    UnaryOp::Neg => operand.ty.clone(),
                }
            }
            NodeKind::Member { object, .. } => {
                self.infer_node(object);
                None
            }
            NodeKind::Index { object, index } => {
                self.infer_node(object);
                self.infer_node(index);
                match &object.ty {
                    Some(Ty::Array(inner)) => Some((**inner).clone()),
                    _ => None,
                }
            }
            NodeKind::ArrayLit { elements } => {
                for element in elements.iter_mut() {
                    self.infer_node(element);
                }
                let first = elements.first().and_then(|e| e.ty.clone());
                match first {
                    Some(ty) if elements.iter().all(|e| e.ty.as_ref() == Some(&ty)) => {
                        Some(Ty::Array(Box::new(ty)))
                    }
                    _ => None,
                }
            }
            NodeKind::Call { callee, args } => {
                for arg in args.iter_mut() {
                    self.infer_node(arg);
                }
                let sig = self.functions.get(callee.as_str()).cloned();
                match sig {
                    Some(sig) => {
                        if args.len() != sig.arity {
                            let message = format!(
                                "`{callee}` expects {} argument(s), got {}",
                                sig.arity,
                                args.len()
                            );
                            self.warn(DiagnosticKind::Type, span, message);
                        }
                        sig.return_ty.as_deref().map(Ty::from_name)
                    }
                    // Unresolved callees (imported or builtin) stay untyped.
                    None => None,
                }
            }
            NodeKind::Curry {
                callee,
                applied,
                total,
            } => {
                for arg in applied.iter_mut() {
                    self.infer_node(arg);
                }
                let sig = self.functions.get(callee.as_str()).cloned();
                match sig {
                    Some(sig) => {
                        *total = Some(sig.arity);
                        if applied.len() > sig.arity {
                            let message = format!(
                                "`{callee}` takes {} argument(s), {} were applied",
                                sig.arity,
                                applied.len()
                            );
                            self.warn(DiagnosticKind::Type, span, message);
                            None
                        } else if applied.len() == sig.arity {
                            sig.return_ty.as_deref().map(Ty::from_name)
                        } else {
                            Some(Ty::Function)
                        }
                    }
                    None => None,
                }
            }
            NodeKind::Lambda { params, body, .. } => {
                self.symbols.enter_scope();
                let params = params.clone();
                self.bind_params(&params);
                self.infer_node(body);
                self.symbols.exit_scope(self.diag);
                Some(Ty::Function)
            }
            NodeKind::Compose { left, right } => {
                self.infer_node(left);
                self.infer_node(right);
                Some(Ty::Function)
            }
            NodeKind::New { class, args } => {
                let class = class.clone();
                for arg in args.iter_mut() {
                    self.infer_node(arg);
                }
                Some(Ty::Class(class))
            }
            NodeKind::This => self.current_class.clone().map(Ty::Class),
            NodeKind::Pointcut { .. } | NodeKind::Advice { .. } => None,
            NodeKind::Match {
                scrutinee,
                cases,
                otherwise,
            } => {
                self.infer_node(scrutinee);
                for case in cases {
                    self.infer_node(case);
                }
                if let Some(otherwise) = otherwise {
                    self.infer_body(otherwise);
                }
                None
            }
            NodeKind::MatchCase { pattern, body } => {
                self.infer_node(pattern);
                self.infer_body(body);
                None
            }
        };

        if ty.is_some() {
            node.ty = ty;
        }
    }
}

fn binary_result(op: BinOp, lhs: Option<&Ty>, rhs: Option<&Ty>) -> Option<Ty> {
    if op.is_comparison() || op.is_logical() {
        return Some(Ty::Bool);
    }
    match op {
        BinOp::Add if matches!(lhs, Some(Ty::Str)) || matches!(rhs, Some(Ty::Str)) => {
            Some(Ty::Str)
        }
        BinOp::Div => match (lhs, rhs) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => Some(Ty::Float),
            _ => None,
        },
        _ => match (lhs, rhs) {
            (Some(Ty::Int), Some(Ty::Int)) => Some(Ty::Int),
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => Some(Ty::Float),
            _ => None,
        },
    }
}

/// Int and Float interchange freely; everything else must match exactly.
fn types_compatible(a: &Ty, b: &Ty) -> bool {
    a == b || (a.is_numeric() && b.is_numeric())
}
