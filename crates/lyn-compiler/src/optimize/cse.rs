//! Common-subexpression detection.
//!
//! Expressions hash structurally (variant tag mixed with operand hashes
//! and literal/identifier payloads); hash hits confirm with a recursive
//! structural equality check before counting. The table is cleared at
//! every control-flow join, so only straight-line duplicates count.
//!
//! Matching the reference compiler, this pass detects and counts; it does
//! not bind duplicates to temporaries.

use std::hash::{DefaultHasher, Hash, Hasher};

use indexmap::IndexMap;

use crate::ast::{Node, NodeKind};

use super::OptimizeStats;

/// Hash-bucketed expression table for one straight-line region.
#[derive(Debug, Default)]
struct ExprTable {
    buckets: IndexMap<u64, Vec<Node>>,
}

impl ExprTable {
    fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Record `expr`; returns `true` when a structurally identical
    /// expression was already present.
    fn record(&mut self, expr: &Node) -> bool {
        let hash = structural_hash(expr);
        let bucket = self.buckets.entry(hash).or_default();
        if bucket.iter().any(|seen| structural_eq(seen, expr)) {
            return true;
        }
        bucket.push(expr.clone());
        false
    }
}

pub(super) fn run(ast: &mut Node, stats: &mut OptimizeStats) {
    let mut table = ExprTable::default();
    scan_statement_with(ast, &mut table, stats);
}

/// Whether a subtree is a pure expression: safe to compare occurrences
/// across statements.
fn is_pure(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Number { .. }
        | NodeKind::Str { .. }
        | NodeKind::Bool { .. }
        | NodeKind::Null
        | NodeKind::Ident { .. }
        | NodeKind::This => true,
        NodeKind::Binary { lhs, rhs, .. } => is_pure(lhs) && is_pure(rhs),
        NodeKind::Unary { operand, .. } => is_pure(operand),
        NodeKind::Member { object, .. } => is_pure(object),
        NodeKind::Index { object, index } => is_pure(object) && is_pure(index),
        NodeKind::ArrayLit { elements } => elements.iter().all(is_pure),
        _ => false,
    }
}

/// Collect candidate subexpressions of one expression tree into the
/// table. Only compound pure expressions are worth a slot.
fn scan_expr(node: &Node, table: &mut ExprTable, stats: &mut OptimizeStats) {
    if matches!(node.kind, NodeKind::Binary { .. }) && is_pure(node) && table.record(node) {
        stats.common_subexprs_eliminated += 1;
        // Inner duplicates are implied by the outer hit.
        return;
    }
    for child in node.children() {
        scan_expr(child, table, stats);
    }
}

fn scan_body(body: &[Node], stats: &mut OptimizeStats) {
    let mut table = ExprTable::default();
    for stmt in body {
        scan_statement_with(stmt, &mut table, stats);
    }
}

fn scan_statement_with(node: &Node, table: &mut ExprTable, stats: &mut OptimizeStats) {
    match &node.kind {
        NodeKind::Program { body } => {
            for stmt in body {
                scan_statement_with(stmt, table, stats);
            }
        }
        NodeKind::FunctionDef { body, .. } => {
            // A function body is its own straight-line region.
            scan_body(body, stats);
        }
        NodeKind::ClassDef { members, .. } => {
            for member in members {
                scan_statement_with(member, table, stats);
            }
        }
        NodeKind::ModuleDecl { decls, .. } => scan_body(decls, stats),
        NodeKind::Block { body } => {
            for stmt in body {
                scan_statement_with(stmt, table, stats);
            }
        }
        // Control-flow joins clear the table; each arm is a fresh region.
        NodeKind::If {
            cond,
            then_body,
            else_body,
        } => {
            scan_expr(cond, table, stats);
            table.clear();
            scan_body(then_body, stats);
            scan_body(else_body, stats);
        }
        NodeKind::While { cond, body } => {
            scan_expr(cond, table, stats);
            table.clear();
            scan_body(body, stats);
        }
        NodeKind::DoWhile { body, cond } => {
            table.clear();
            scan_body(body, stats);
            scan_expr(cond, &mut ExprTable::default(), stats);
        }
        NodeKind::ForRange {
            start,
            end,
            step,
            body,
            ..
        } => {
            scan_expr(start, table, stats);
            scan_expr(end, table, stats);
            if let Some(step) = step {
                scan_expr(step, table, stats);
            }
            table.clear();
            scan_body(body, stats);
        }
        NodeKind::ForEach {
            iterable, body, ..
        } => {
            scan_expr(iterable, table, stats);
            table.clear();
            scan_body(body, stats);
        }
        NodeKind::ForC {
            init,
            cond,
            update,
            body,
        } => {
            table.clear();
            let mut header = ExprTable::default();
            if let Some(init) = init {
                scan_statement_with(init, &mut header, stats);
            }
            if let Some(cond) = cond {
                scan_expr(cond, &mut header, stats);
            }
            if let Some(update) = update {
                scan_statement_with(update, &mut header, stats);
            }
            scan_body(body, stats);
        }
        NodeKind::Switch {
            scrutinee,
            cases,
            default_body,
        } => {
            scan_expr(scrutinee, table, stats);
            table.clear();
            for case in cases {
                if let NodeKind::Case { body, .. } = &case.kind {
                    scan_body(body, stats);
                }
            }
            if let Some(default_body) = default_body {
                scan_body(default_body, stats);
            }
        }
        NodeKind::Match {
            scrutinee,
            cases,
            otherwise,
        } => {
            scan_expr(scrutinee, table, stats);
            table.clear();
            for case in cases {
                if let NodeKind::MatchCase { body, .. } = &case.kind {
                    scan_body(body, stats);
                }
            }
            if let Some(otherwise) = otherwise {
                scan_body(otherwise, stats);
            }
        }
        NodeKind::TryCatch {
            try_body,
            catch_body,
            finally_body,
            ..
        } => {
            table.clear();
            scan_body(try_body, stats);
            scan_body(catch_body, stats);
            scan_body(finally_body, stats);
        }
        // Plain statements contribute their expressions to the running
        // region.
        NodeKind::VarDecl { init, .. } => {
            if let Some(init) = init {
                scan_expr(init, table, stats);
            }
        }
        NodeKind::VarAssign { value, .. }
        | NodeKind::Print { value }
        | NodeKind::Throw { value } => scan_expr(value, table, stats),
        NodeKind::MemberAssign { object, value, .. } => {
            scan_expr(object, table, stats);
            scan_expr(value, table, stats);
        }
        NodeKind::Return { value } => {
            if let Some(value) = value {
                scan_expr(value, table, stats);
            }
        }
        _ => {
            for child in node.children() {
                scan_expr(child, table, stats);
            }
        }
    }
}

fn structural_hash(node: &Node) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_into(node, &mut hasher);
    hasher.finish()
}

fn hash_into(node: &Node, hasher: &mut DefaultHasher) {
    std::mem::discriminant(&node.kind).hash(hasher);
    match &node.kind {
        NodeKind::Number { value } => value.to_bits().hash(hasher),
        NodeKind::Str { value } => value.hash(hasher),
        NodeKind::Bool { value } => value.hash(hasher),
        NodeKind::Null | NodeKind::This => {}
        NodeKind::Ident { name } => name.hash(hasher),
        NodeKind::Binary { op, lhs, rhs } => {
            op.hash(hasher);
            hash_into(lhs, hasher);
            hash_into(rhs, hasher);
        }
        NodeKind::Unary { op, operand } => {
            op.hash(hasher);
            hash_into(operand, hasher);
        }
        NodeKind::Member { object, member } => {
            member.hash(hasher);
            hash_into(object, hasher);
        }
        NodeKind::Index { object, index } => {
            hash_into(object, hasher);
            hash_into(index, hasher);
        }
        NodeKind::ArrayLit { elements } => {
            elements.len().hash(hasher);
            for element in elements {
                hash_into(element, hasher);
            }
        }
        // Impure kinds never reach the table.
        _ => {}
    }
}

/// Recursive structural equality over pure expression shapes. Spans and
/// inferred types are ignored.
fn structural_eq(a: &Node, b: &Node) -> bool {
    match (&a.kind, &b.kind) {
        (NodeKind::Number { value: x }, NodeKind::Number { value: y }) => {
            x.to_bits() == y.to_bits()
        }
        (NodeKind::Str { value: x }, NodeKind::Str { value: y }) => x == y,
        (NodeKind::Bool { value: x }, NodeKind::Bool { value: y }) => x == y,
        (NodeKind::Null, NodeKind::Null) | (NodeKind::This, NodeKind::This) => true,
        (NodeKind::Ident { name: x }, NodeKind::Ident { name: y }) => x == y,
        (
            NodeKind::Binary {
                op: op_a,
                lhs: lhs_a,
                rhs: rhs_a,
            },
            NodeKind::Binary {
                op: op_b,
                lhs: lhs_b,
                rhs: rhs_b,
            },
        ) => op_a == op_b && structural_eq(lhs_a, lhs_b) && structural_eq(rhs_a, rhs_b),
        (
            NodeKind::Unary {
                op: op_a,
                operand: operand_a,
            },
            NodeKind::Unary {
                op: op_b,
                operand: operand_b,
            },
        ) => op_a == op_b && structural_eq(operand_a, operand_b),
        (
            NodeKind::Member {
                object: obj_a,
                member: member_a,
            },
            NodeKind::Member {
                object: obj_b,
                member: member_b,
            },
        ) => member_a == member_b && structural_eq(obj_a, obj_b),
        (
            NodeKind::Index {
                object: obj_a,
                index: idx_a,
            },
            NodeKind::Index {
                object: obj_b,
                index: idx_b,
            },
        ) => structural_eq(obj_a, obj_b) && structural_eq(idx_a, idx_b),
        (NodeKind::ArrayLit { elements: xs }, NodeKind::ArrayLit { elements: ys }) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structural_eq(x, y))
        }
        _ => false,
    }
}
