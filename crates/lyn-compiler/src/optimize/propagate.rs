//! Constant propagation over a scoped symbol table.
//!
//! Scope analysis and propagation run in one traversal: Program is scope
//! 0; function bodies, each `if` branch, loop bodies and class bodies open
//! a scope. An entry records whether its variable currently holds a
//! compile-time-known literal; assigning a non-literal invalidates it.
//!
//! An assignment reaching an entry in an *outer* scope only invalidates:
//! the assignment may sit on a conditional path, so its value cannot be
//! trusted after the scope closes. Assignment to a name with no entry at
//! all declares it in the current scope (implicit declaration).

use indexmap::IndexMap;

use crate::ast::{Node, NodeKind};

use super::OptimizeStats;

/// `name → known literal` per scope. `None` means declared but not
/// compile-time-known.
#[derive(Debug, Default)]
struct Scopes {
    stack: Vec<IndexMap<String, Option<Node>>>,
}

impl Scopes {
    fn enter(&mut self) {
        self.stack.push(IndexMap::new());
    }

    fn exit(&mut self) {
        self.stack.pop();
    }

    fn declare(&mut self, name: &str, constant: Option<Node>, stats: &mut OptimizeStats) {
        let scope = self.stack.last_mut().expect("scope stack never empty");
        if !scope.contains_key(name) {
            stats.variables_scoped += 1;
        }
        scope.insert(name.to_string(), constant);
    }

    fn assign(&mut self, name: &str, constant: Option<Node>, stats: &mut OptimizeStats) {
        let top = self.stack.len() - 1;
        for (level, scope) in self.stack.iter_mut().enumerate().rev() {
            if let Some(slot) = scope.get_mut(name) {
                // Outer-scope entries only ever degrade: this assignment
                // may be conditional from the outer scope's viewpoint.
                *slot = if level == top { constant } else { None };
                return;
            }
        }
        self.declare(name, constant, stats);
    }

    fn constant(&self, name: &str) -> Option<&Node> {
        for scope in self.stack.iter().rev() {
            if let Some(slot) = scope.get(name) {
                return slot.as_ref();
            }
        }
        None
    }

    /// Drop the constant flag of an existing entry without declaring
    /// anything new.
    fn invalidate_existing(&mut self, name: &str) {
        for scope in self.stack.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = None;
                return;
            }
        }
    }
}

/// Names written anywhere below `node`, loop-carried or not.
fn collect_assigned(node: &Node, out: &mut Vec<String>) {
    match &node.kind {
        NodeKind::VarAssign { name, .. } | NodeKind::VarDecl { name, .. } => {
            out.push(name.clone());
        }
        _ => {}
    }
    for child in node.children() {
        collect_assigned(child, out);
    }
}

/// A loop condition must not see constants that the loop body rewrites.
fn invalidate_assigned_in(stmts: &[Node], scopes: &mut Scopes) {
    let mut names = Vec::new();
    for stmt in stmts {
        collect_assigned(stmt, &mut names);
    }
    for name in names {
        scopes.invalidate_existing(&name);
    }
}

pub(super) fn run(ast: &mut Node, stats: &mut OptimizeStats) {
    let mut scopes = Scopes::default();
    scopes.enter();
    walk(ast, &mut scopes, stats);
}

fn literal_of(node: &Node) -> Option<Node> {
    node.is_literal().then(|| node.clone())
}

fn walk_body(body: &mut [Node], scopes: &mut Scopes, stats: &mut OptimizeStats) {
    scopes.enter();
    for stmt in body {
        walk(stmt, scopes, stats);
    }
    scopes.exit();
}

fn walk(node: &mut Node, scopes: &mut Scopes, stats: &mut OptimizeStats) {
    match &mut node.kind {
        NodeKind::Ident { name } => {
            if let Some(constant) = scopes.constant(name) {
                let mut replacement = constant.clone();
                replacement.span = node.span;
                *node = replacement;
                stats.constants_propagated += 1;
            }
        }
        NodeKind::VarDecl { name, init, .. } => {
            if let Some(init) = init {
                walk(init, scopes, stats);
            }
            let constant = init.as_deref().and_then(literal_of);
            let name = name.clone();
            scopes.declare(&name, constant, stats);
        }
        NodeKind::VarAssign { name, value } => {
            walk(value, scopes, stats);
            let constant = literal_of(value);
            let name = name.clone();
            scopes.assign(&name, constant, stats);
        }
        NodeKind::Program { body } => {
            // Program statements live in the scope opened by `run`.
            for stmt in body {
                walk(stmt, scopes, stats);
            }
        }
        NodeKind::FunctionDef { params, body, .. } => {
            scopes.enter();
            for param in params {
                let name = param.name.clone();
                scopes.declare(&name, None, stats);
            }
            for stmt in body {
                walk(stmt, scopes, stats);
            }
            scopes.exit();
        }
        NodeKind::ClassDef { members, .. } => {
            scopes.enter();
            for member in members {
                walk(member, scopes, stats);
            }
            scopes.exit();
        }
        NodeKind::Block { body } | NodeKind::ModuleDecl { decls: body, .. } => {
            walk_body(body, scopes, stats);
        }
        NodeKind::If {
            cond,
            then_body,
            else_body,
        } => {
            walk(cond, scopes, stats);
            walk_body(then_body, scopes, stats);
            walk_body(else_body, scopes, stats);
        }
        NodeKind::While { cond, body } => {
            invalidate_assigned_in(body, scopes);
            walk(cond, scopes, stats);
            walk_body(body, scopes, stats);
        }
        NodeKind::DoWhile { body, cond } => {
            invalidate_assigned_in(body, scopes);
            walk_body(body, scopes, stats);
            walk(cond, scopes, stats);
        }
        NodeKind::ForRange {
            var,
            start,
            end,
            step,
            body,
        } => {
            walk(start, scopes, stats);
            walk(end, scopes, stats);
            if let Some(step) = step {
                walk(step, scopes, stats);
            }
            invalidate_assigned_in(body, scopes);
            scopes.enter();
            let var = var.clone();
            scopes.declare(&var, None, stats);
            for stmt in body {
                walk(stmt, scopes, stats);
            }
            scopes.exit();
        }
        NodeKind::ForEach {
            var,
            iterable,
            body,
        } => {
            walk(iterable, scopes, stats);
            invalidate_assigned_in(body, scopes);
            scopes.enter();
            let var = var.clone();
            scopes.declare(&var, None, stats);
            for stmt in body {
                walk(stmt, scopes, stats);
            }
            scopes.exit();
        }
        NodeKind::ForC {
            init,
            cond,
            update,
            body,
        } => {
            scopes.enter();
            if let Some(init) = init {
                walk(init, scopes, stats);
            }
            // Loop-carried names must not look constant past the init.
            if let Some(init) = init {
                invalidate_assigned_in(std::slice::from_ref(&**init), scopes);
            }
            if let Some(update) = update {
                invalidate_assigned_in(std::slice::from_ref(&**update), scopes);
            }
            invalidate_assigned_in(body, scopes);
            if let Some(cond) = cond {
                walk(cond, scopes, stats);
            }
            for stmt in body {
                walk(stmt, scopes, stats);
            }
            if let Some(update) = update {
                walk(update, scopes, stats);
            }
            scopes.exit();
        }
        NodeKind::Lambda { params, body, .. } => {
            scopes.enter();
            for param in params {
                let name = param.name.clone();
                scopes.declare(&name, None, stats);
            }
            walk(body, scopes, stats);
            scopes.exit();
        }
        NodeKind::TryCatch {
            try_body,
            error_name,
            catch_body,
            finally_body,
            ..
        } => {
            walk_body(try_body, scopes, stats);
            scopes.enter();
            if let Some(name) = error_name {
                let name = name.clone();
                scopes.declare(&name, None, stats);
            }
            for stmt in catch_body {
                walk(stmt, scopes, stats);
            }
            scopes.exit();
            walk_body(finally_body, scopes, stats);
        }
        NodeKind::Switch {
            scrutinee,
            cases,
            default_body,
        } => {
            walk(scrutinee, scopes, stats);
            for case in cases {
                walk(case, scopes, stats);
            }
            if let Some(default_body) = default_body {
                walk_body(default_body, scopes, stats);
            }
        }
        NodeKind::Case { value, body } => {
            walk(value, scopes, stats);
            walk_body(body, scopes, stats);
        }
        NodeKind::Match {
            scrutinee,
            cases,
            otherwise,
        } => {
            walk(scrutinee, scopes, stats);
            for case in cases {
                walk(case, scopes, stats);
            }
            if let Some(otherwise) = otherwise {
                walk_body(otherwise, scopes, stats);
            }
        }
        NodeKind::MatchCase { pattern, body } => {
            walk(pattern, scopes, stats);
            walk_body(body, scopes, stats);
        }
        _ => {
            for child in node.children_mut() {
                walk(child, scopes, stats);
            }
        }
    }
}
