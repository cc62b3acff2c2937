//! Compile-time macro evaluator.
//!
//! A `FunctionDef` whose name starts with `macro_` is a macro: registration
//! detaches it from the AST and records its name, parameter names and body
//! in the macro table. Expansion then rewrites every call of a registered
//! macro (with matching arity) into a `Program` node holding deep copies of
//! the body statements, with parameter identifiers substituted by copies of
//! the argument expressions. Arity mismatches warn and leave the call in
//! place.
//!
//! Bodies are owned by the table, not borrowed from the tree, so expansion
//! sites never alias the original definition.

#[cfg(test)]
mod expand_tests;

use indexmap::IndexMap;

use crate::ast::{Node, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

/// Fixed capacity of the macro table.
pub const MAX_MACROS: usize = 64;

/// Name prefix that marks a function definition as a macro.
pub const MACRO_PREFIX: &str = "macro_";

/// Expansion nesting bound; a macro whose body calls another macro expands
/// through this many layers before the evaluator gives up.
const MAX_EXPANSION_DEPTH: usize = 32;

/// One registered macro.
#[derive(Debug, Clone)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
}

/// Counters for one expansion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandStats {
    pub macros_registered: usize,
    pub calls_expanded: usize,
}

/// Macro table plus expansion driver.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: IndexMap<String, MacroDef>,
    stats: ExpandStats,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ExpandStats {
        self.stats
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.macros.get(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Register all macro definitions in `ast` and expand their call
    /// sites.
    pub fn expand(&mut self, ast: &mut Node, diag: &mut Diagnostics) {
        self.register(ast, diag);
        self.substitute(ast, diag, 0);
    }

    /// Detach `macro_*` function definitions into the table.
    fn register(&mut self, node: &mut Node, diag: &mut Diagnostics) {
        match &mut node.kind {
            NodeKind::Program { body }
            | NodeKind::Block { body }
            | NodeKind::FunctionDef { body, .. } => self.register_from_list(body, diag),
            NodeKind::If {
                then_body,
                else_body,
                ..
            } => {
                self.register_from_list(then_body, diag);
                self.register_from_list(else_body, diag);
            }
            NodeKind::While { body, .. }
            | NodeKind::DoWhile { body, .. }
            | NodeKind::ForRange { body, .. }
            | NodeKind::ForEach { body, .. }
            | NodeKind::ForC { body, .. } => self.register_from_list(body, diag),
            _ => {}
        }
    }

    fn register_from_list(&mut self, list: &mut Vec<Node>, diag: &mut Diagnostics) {
        let mut i = 0;
        while i < list.len() {
            let is_macro = matches!(
                &list[i].kind,
                NodeKind::FunctionDef { name, .. } if name.starts_with(MACRO_PREFIX)
            );
            if !is_macro {
                self.register(&mut list[i], diag);
                i += 1;
                continue;
            }

            if self.macros.len() >= MAX_MACROS {
                diag.warning(
                    Stage::Expand,
                    DiagnosticKind::Limit,
                    list[i].span,
                    format!("macro table full ({MAX_MACROS} entries); definition kept as a function"),
                )
                .emit();
                i += 1;
                continue;
            }

            let def = list.remove(i);
            let NodeKind::FunctionDef {
                name, params, body, ..
            } = def.kind
            else {
                unreachable!("checked above");
            };
            if self.macros.contains_key(&name) {
                diag.warning(
                    Stage::Expand,
                    DiagnosticKind::Semantic,
                    def.span,
                    format!("macro `{name}` is defined twice; the last definition wins"),
                )
                .emit();
            }
            self.stats.macros_registered += 1;
            self.macros.insert(
                name.clone(),
                MacroDef {
                    name,
                    params: params.into_iter().map(|p| p.name).collect(),
                    body,
                },
            );
        }
    }

    /// Rewrite macro call sites, innermost trees first.
    fn substitute(&mut self, node: &mut Node, diag: &mut Diagnostics, depth: usize) {
        for child in node.children_mut() {
            self.substitute(child, diag, depth);
        }

        let NodeKind::Call { callee, args } = &node.kind else {
            return;
        };
        let Some(def) = self.macros.get(callee) else {
            return;
        };

        if args.len() != def.params.len() {
            diag.warning(
                Stage::Expand,
                DiagnosticKind::Semantic,
                node.span,
                format!(
                    "macro `{}` expects {} argument(s), got {}; call left unexpanded",
                    def.name,
                    def.params.len(),
                    args.len()
                ),
            )
            .emit();
            return;
        }

        if depth >= MAX_EXPANSION_DEPTH {
            diag.warning(
                Stage::Expand,
                DiagnosticKind::Limit,
                node.span,
                format!("macro expansion nested deeper than {MAX_EXPANSION_DEPTH}; stopping"),
            )
            .emit();
            return;
        }

        let substitutions: IndexMap<&str, &Node> = def
            .params
            .iter()
            .map(String::as_str)
            .zip(args.iter())
            .collect();

        let body: Vec<Node> = def
            .body
            .iter()
            .map(|stmt| {
                let mut copy = stmt.clone();
                substitute_params(&mut copy, &substitutions);
                copy
            })
            .collect();

        self.stats.calls_expanded += 1;
        let span = node.span;

        // The expansion may itself contain macro calls.
        let mut expansion = Node::program(body, span);
        self.substitute(&mut expansion, diag, depth + 1);
        *node = expansion;
    }
}

/// Replace parameter identifiers with deep copies of the bound arguments.
fn substitute_params(node: &mut Node, substitutions: &IndexMap<&str, &Node>) {
    if let NodeKind::Ident { name } = &node.kind {
        if let Some(&arg) = substitutions.get(name.as_str()) {
            *node = arg.clone();
            return;
        }
    }
    for child in node.children_mut() {
        substitute_params(child, substitutions);
    }
}

/// Textual form of literal-bearing nodes, for macro-generated output.
pub fn stringify(node: &Node) -> String {
    match &node.kind {
        NodeKind::Number { value } => value.to_string(),
        NodeKind::Str { value } => value.clone(),
        NodeKind::Bool { value } => value.to_string(),
        NodeKind::Ident { name } => name.clone(),
        _ => "<<unprintable>>".to_string(),
    }
}

/// Concatenation helper exposed alongside `stringify`.
pub fn concat(left: &str, right: &str) -> String {
    let mut out = String::with_capacity(left.len() + right.len());
    out.push_str(left);
    out.push_str(right);
    out
}
