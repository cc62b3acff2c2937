//! Tree measurement for diagnostics output.

use super::{Node, NodeKind};

/// Size figures for one tree, gathered by a single post-order walk.
///
/// Creation/free counters of the node lifecycle are subsumed by ownership;
/// what remains observable is the shape and footprint of a living tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// Total nodes in the tree, root included.
    pub nodes: usize,
    /// Longest root-to-leaf path, in nodes.
    pub max_depth: usize,
    /// Approximate heap footprint: node structs plus owned string bytes.
    pub bytes: usize,
}

impl TreeStats {
    pub fn measure(root: &Node) -> TreeStats {
        let mut stats = TreeStats::default();
        walk(root, 1, &mut stats);
        stats
    }
}

fn walk(node: &Node, depth: usize, stats: &mut TreeStats) {
    stats.nodes += 1;
    stats.max_depth = stats.max_depth.max(depth);
    stats.bytes += std::mem::size_of::<Node>() + owned_string_bytes(node);

    for child in node.children() {
        walk(child, depth + 1, stats);
    }
}

fn owned_string_bytes(node: &Node) -> usize {
    match &node.kind {
        NodeKind::FunctionDef { name, params, return_ty, .. } => {
            name.len()
                + params
                    .iter()
                    .map(|p| p.name.len() + p.ty_name.as_deref().map_or(0, str::len))
                    .sum::<usize>()
                + return_ty.as_deref().map_or(0, str::len)
        }
        NodeKind::ClassDef { name, base, .. } => {
            name.len() + base.as_deref().map_or(0, str::len)
        }
        NodeKind::ModuleDecl { name, .. } => name.len(),
        NodeKind::Import {
            module,
            alias,
            symbols,
        } => {
            module.len()
                + alias.as_deref().map_or(0, str::len)
                + symbols.as_deref().map_or(0, |list| {
                    list.iter()
                        .map(|s| s.name.len() + s.alias.as_deref().map_or(0, str::len))
                        .sum()
                })
        }
        NodeKind::AspectDef { name, .. } => name.len(),
        NodeKind::ForRange { var, .. } | NodeKind::ForEach { var, .. } => var.len(),
        NodeKind::VarDecl { name, ty_name, .. } => {
            name.len() + ty_name.as_deref().map_or(0, str::len)
        }
        NodeKind::VarAssign { name, .. } => name.len(),
        NodeKind::MemberAssign { member, .. } | NodeKind::Member { member, .. } => member.len(),
        NodeKind::TryCatch {
            error_ty,
            error_name,
            ..
        } => error_ty.as_deref().map_or(0, str::len) + error_name.as_deref().map_or(0, str::len),
        NodeKind::Str { value } => value.len(),
        NodeKind::Ident { name } => name.len(),
        NodeKind::Call { callee, .. } => callee.len(),
        NodeKind::Lambda { params, return_ty, .. } => {
            params
                .iter()
                .map(|p| p.name.len() + p.ty_name.as_deref().map_or(0, str::len))
                .sum::<usize>()
                + return_ty.as_deref().map_or(0, str::len)
        }
        NodeKind::Curry { callee, .. } => callee.len(),
        NodeKind::New { class, .. } => class.len(),
        NodeKind::Pointcut { name, pattern } => name.len() + pattern.len(),
        NodeKind::Advice { pointcut, .. } => pointcut.len(),
        _ => 0,
    }
}
