//! Scoped name→type bindings.
//!
//! Consumed by type inference and the optimizer's constant propagation.
//! Scopes stack: the global scope is always present, block-like constructs
//! push and pop around their bodies. Lookup walks innermost-first.

use std::fmt::Write;

use indexmap::IndexMap;
use lyn_core::Span;

use crate::ast::Ty;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<IndexMap<String, Ty>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// A fresh table with only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    /// Pop the innermost scope. Popping the global scope is a semantic
    /// error and leaves the table unchanged.
    pub fn exit_scope(&mut self, diag: &mut Diagnostics) -> bool {
        if self.scopes.len() == 1 {
            diag.error(
                Stage::Infer,
                DiagnosticKind::Semantic,
                Span::empty(0),
                "cannot exit the global scope",
            )
            .emit();
            return false;
        }
        self.scopes.pop();
        true
    }

    /// Bind `name` in the current scope. Redeclaration in the same scope
    /// is a semantic error; the earlier binding survives.
    pub fn add(&mut self, name: &str, ty: Ty, span: Span, diag: &mut Diagnostics) -> bool {
        let scope = self.scopes.last_mut().expect("global scope always exists");
        if scope.contains_key(name) {
            diag.error(
                Stage::Infer,
                DiagnosticKind::Semantic,
                span,
                format!("`{name}` is already declared in this scope"),
            )
            .emit();
            return false;
        }
        scope.insert(name.to_string(), ty);
        true
    }

    /// Rebind `name` in whichever scope currently holds it; falls back to
    /// the current scope. Assignment never reports redeclaration.
    pub fn assign(&mut self, name: &str, ty: Ty) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = ty;
                return;
            }
        }
        let scope = self.scopes.last_mut().expect("global scope always exists");
        scope.insert(name.to_string(), ty);
    }

    /// Innermost-first lookup across all scopes.
    pub fn lookup(&self, name: &str) -> Option<&Ty> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Lookup restricted to the current scope.
    pub fn lookup_current(&self, name: &str) -> Option<&Ty> {
        self.scopes
            .last()
            .expect("global scope always exists")
            .get(name)
    }

    /// Number of scopes on the stack, global included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Human-readable listing, outermost scope first.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (level, scope) in self.scopes.iter().enumerate() {
            let _ = writeln!(out, "scope {level}:");
            for (name, ty) in scope {
                let _ = writeln!(out, "  {name}: {ty}");
            }
        }
        out
    }
}
