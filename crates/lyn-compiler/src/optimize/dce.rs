//! Dead-code elimination.
//!
//! Three shapes of dead code go away:
//! - statements after the first `return` in a function body
//! - the unreachable branch of an `if` whose condition is a literal
//!   number (the live branch replaces the `if` in the statement list)
//! - the body of a `while` whose condition is literal zero

use crate::ast::{Node, NodeKind};

use super::OptimizeStats;

pub(super) fn run(node: &mut Node, stats: &mut OptimizeStats) {
    match &mut node.kind {
        NodeKind::Program { body }
        | NodeKind::Block { body }
        | NodeKind::ModuleDecl { decls: body, .. } => process_list(body, stats),
        NodeKind::FunctionDef { body, .. } => {
            truncate_after_return(body, stats);
            process_list(body, stats);
        }
        NodeKind::ClassDef { members, .. } => process_list(members, stats),
        NodeKind::If {
            then_body,
            else_body,
            ..
        } => {
            process_list(then_body, stats);
            process_list(else_body, stats);
        }
        NodeKind::While { cond, body } => {
            if cond.as_number() == Some(0.0) && !body.is_empty() {
                body.clear();
                stats.dead_blocks_removed += 1;
            }
            process_list(body, stats);
        }
        NodeKind::DoWhile { body, .. }
        | NodeKind::ForRange { body, .. }
        | NodeKind::ForEach { body, .. }
        | NodeKind::ForC { body, .. } => process_list(body, stats),
        NodeKind::TryCatch {
            try_body,
            catch_body,
            finally_body,
            ..
        } => {
            process_list(try_body, stats);
            process_list(catch_body, stats);
            process_list(finally_body, stats);
        }
        NodeKind::Switch {
            cases,
            default_body,
            ..
        } => {
            for case in cases {
                if let NodeKind::Case { body, .. } = &mut case.kind {
                    process_list(body, stats);
                }
            }
            if let Some(default_body) = default_body {
                process_list(default_body, stats);
            }
        }
        NodeKind::Match {
            cases, otherwise, ..
        } => {
            for case in cases {
                if let NodeKind::MatchCase { body, .. } = &mut case.kind {
                    process_list(body, stats);
                }
            }
            if let Some(otherwise) = otherwise {
                process_list(otherwise, stats);
            }
        }
        _ => {}
    }
}

/// Statements strictly after the first top-level `return` are unreachable.
fn truncate_after_return(body: &mut Vec<Node>, stats: &mut OptimizeStats) {
    if let Some(pos) = body
        .iter()
        .position(|stmt| matches!(stmt.kind, NodeKind::Return { .. }))
        && pos + 1 < body.len()
    {
        body.truncate(pos + 1);
        stats.dead_blocks_removed += 1;
    }
}

/// Process a statement list, replacing literal-condition `if`s with their
/// live branch.
fn process_list(list: &mut Vec<Node>, stats: &mut OptimizeStats) {
    let mut i = 0;
    while i < list.len() {
        run(&mut list[i], stats);

        let literal_cond = match &list[i].kind {
            NodeKind::If { cond, .. } => cond.as_number(),
            _ => None,
        };
        let Some(value) = literal_cond else {
            i += 1;
            continue;
        };

        let NodeKind::If {
            then_body,
            else_body,
            ..
        } = &mut list[i].kind
        else {
            unreachable!("checked above");
        };
        let live = if value != 0.0 {
            std::mem::take(then_body)
        } else {
            std::mem::take(else_body)
        };
        let live_len = live.len();
        list.splice(i..=i, live);
        stats.dead_blocks_removed += 1;
        // Spliced statements were already processed inside the `if`.
        i += live_len;
    }
}
