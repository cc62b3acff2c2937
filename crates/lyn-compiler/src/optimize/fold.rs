//! Constant folding.
//!
//! Post-order: operands fold first, so nested all-literal expressions
//! collapse to a single literal in one run. Comparisons and logical
//! operators yield `1.0`/`0.0`. Division by a literal zero is preserved
//! with a warning so the failure stays observable at runtime.

use crate::ast::{BinOp, Node, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

use super::OptimizeStats;

pub(super) fn run(node: &mut Node, stats: &mut OptimizeStats, diag: &mut Diagnostics) {
    for child in node.children_mut() {
        run(child, stats, diag);
    }

    let NodeKind::Binary { op, lhs, rhs } = &node.kind else {
        return;
    };
    let (Some(left), Some(right)) = (lhs.as_number(), rhs.as_number()) else {
        return;
    };

    if *op == BinOp::Div && right == 0.0 {
        diag.warning(
            Stage::Optimize,
            DiagnosticKind::Runtime,
            node.span,
            "division by zero is not folded",
        )
        .emit();
        return;
    }

    let value = evaluate(*op, left, right);
    let span = node.span;
    let ty = node.ty.take();
    *node = Node::number(value, span);
    node.ty = ty;
    stats.constants_folded += 1;
}

fn evaluate(op: BinOp, left: f64, right: f64) -> f64 {
    match op {
        BinOp::Add => left + right,
        BinOp::Sub => left - right,
        BinOp::Mul => left * right,
        BinOp::Div => left / right,
        BinOp::Lt => bool_value(left < right),
        BinOp::Gt => bool_value(left > right),
        BinOp::Le => bool_value(left <= right),
        BinOp::Ge => bool_value(left >= right),
        BinOp::Eq => bool_value(left == right),
        BinOp::Ne => bool_value(left != right),
        BinOp::And => bool_value(left != 0.0 && right != 0.0),
        BinOp::Or => bool_value(left != 0.0 || right != 0.0),
    }
}

fn bool_value(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
