//! Aspect weaver.
//!
//! Two passes over the AST, both pre-order:
//!
//! 1. **Collect** detaches every `AspectDef` from the tree into the
//!    weaver's aspect list. Detaching keeps the one-owner invariant and
//!    makes weaving idempotent: a second run finds no aspect definitions
//!    and changes nothing.
//! 2. **Apply** tests every `FunctionDef` name against every pointcut of
//!    every collected aspect and splices deep copies of matching advice
//!    bodies into the function body: `before` at position 0, `after` at
//!    the end. `around` currently applies as `before`.

mod glob;

#[cfg(test)]
mod weave_tests;

use crate::ast::{AdviceKind, Node, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

pub use glob::glob_match;

/// Counters and failure state for one weaving run.
#[derive(Debug, Clone, Default)]
pub struct WeaveStats {
    pub aspects_collected: usize,
    pub joinpoints_found: usize,
    pub advice_applied: usize,
    /// First failure message, if any. Weaving failures are not fatal; the
    /// driver may continue with the AST as-is.
    pub error: Option<String>,
}

/// The weaver owns the collected aspect list for the duration of one run.
#[derive(Debug, Default)]
pub struct Weaver {
    aspects: Vec<Node>,
    stats: WeaveStats,
}

impl Weaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weave all aspects in `ast` into its function definitions.
    /// Returns `false` when a failure was recorded in the stats.
    pub fn weave(&mut self, ast: &mut Node, diag: &mut Diagnostics) -> bool {
        self.collect(ast);
        self.validate(diag);
        self.apply(ast);
        self.stats.error.is_none()
    }

    pub fn stats(&self) -> &WeaveStats {
        &self.stats
    }

    /// Pre-order traversal of every scope that can contain aspect
    /// definitions, moving each `AspectDef` into the aspect list.
    fn collect(&mut self, node: &mut Node) {
        match &mut node.kind {
            NodeKind::Program { body }
            | NodeKind::Block { body }
            | NodeKind::FunctionDef { body, .. } => self.collect_from_list(body),
            NodeKind::If {
                then_body,
                else_body,
                ..
            } => {
                self.collect_from_list(then_body);
                self.collect_from_list(else_body);
            }
            NodeKind::While { body, .. }
            | NodeKind::DoWhile { body, .. }
            | NodeKind::ForRange { body, .. }
            | NodeKind::ForEach { body, .. }
            | NodeKind::ForC { body, .. } => self.collect_from_list(body),
            _ => {}
        }
    }

    fn collect_from_list(&mut self, list: &mut Vec<Node>) {
        let mut i = 0;
        while i < list.len() {
            if matches!(list[i].kind, NodeKind::AspectDef { .. }) {
                let aspect = list.remove(i);
                self.stats.aspects_collected += 1;
                self.aspects.push(aspect);
            } else {
                self.collect(&mut list[i]);
                i += 1;
            }
        }
    }

    /// Every advice of a collected aspect must reference a pointcut of the
    /// same aspect. The parser guarantees this for parsed trees; trees
    /// assembled programmatically go through the same check here.
    fn validate(&mut self, diag: &mut Diagnostics) {
        for aspect in &self.aspects {
            let NodeKind::AspectDef {
                name,
                pointcuts,
                advice,
            } = &aspect.kind
            else {
                continue;
            };
            for adv in advice {
                let NodeKind::Advice { pointcut, .. } = &adv.kind else {
                    continue;
                };
                let declared = pointcuts.iter().any(|p| {
                    matches!(&p.kind, NodeKind::Pointcut { name, .. } if name == pointcut)
                });
                if !declared {
                    let message = format!(
                        "aspect `{name}`: advice references undeclared pointcut `{pointcut}`"
                    );
                    diag.warning(Stage::Weave, DiagnosticKind::Undefined, adv.span, message.clone())
                        .emit();
                    self.stats.error.get_or_insert(message);
                }
            }
        }
    }

    /// Pre-order traversal applying collected advice at every function
    /// definition whose name matches a pointcut.
    fn apply(&mut self, node: &mut Node) {
        if let NodeKind::FunctionDef { name, body, .. } = &mut node.kind {
            let name = name.clone();
            self.apply_to_function(&name, body);
        }
        for child in node.children_mut() {
            self.apply(child);
        }
    }

    fn apply_to_function(&mut self, name: &str, body: &mut Vec<Node>) {
        // Splices collected first: inserting while iterating over
        // `self.aspects` would alias the borrow.
        let mut before: Vec<Node> = Vec::new();
        let mut after: Vec<Node> = Vec::new();

        for aspect in &self.aspects {
            let NodeKind::AspectDef {
                pointcuts, advice, ..
            } = &aspect.kind
            else {
                continue;
            };
            for pointcut in pointcuts {
                let NodeKind::Pointcut {
                    name: pointcut_name,
                    pattern,
                } = &pointcut.kind
                else {
                    continue;
                };
                if !glob_match(pattern, name) {
                    continue;
                }
                self.stats.joinpoints_found += 1;

                for adv in advice {
                    let NodeKind::Advice {
                        kind,
                        pointcut: advice_target,
                        body: advice_body,
                    } = &adv.kind
                    else {
                        continue;
                    };
                    if advice_target != pointcut_name {
                        continue;
                    }

                    let block = Node::block(advice_body.clone(), adv.span);
                    match kind {
                        AdviceKind::Before | AdviceKind::Around => before.push(block),
                        AdviceKind::After => after.push(block),
                    }
                    self.stats.advice_applied += 1;
                }
            }
        }

        for (i, block) in before.into_iter().enumerate() {
            body.insert(i, block);
        }
        body.extend(after);
    }
}
