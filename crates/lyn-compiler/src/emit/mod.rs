//! C code generator.
//!
//! Consumes the optimized AST and produces one self-contained C
//! translation unit: a small runtime prelude, class structs and methods,
//! hoisted lambdas, function definitions, then `main` built from the
//! Program statements.
//!
//! By the time the emitter runs, the pipeline guarantees the tree holds no
//! macro definitions and no aspect definitions. Shapes C cannot express
//! directly (partially applied curries, composition of non-identifiers)
//! produce a `Runtime` warning and a placeholder value instead of
//! panicking.

#[cfg(test)]
mod emit_tests;

use std::fmt::Write;

use indexmap::{IndexMap, IndexSet};

use crate::ast::{BinOp, Node, NodeKind, Param, Ty, UnaryOp};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Stage};

/// Emit a complete C program for `ast`.
pub fn emit_c(ast: &Node, diag: &mut Diagnostics) -> String {
    let mut emitter = CEmitter::new(diag);
    emitter.emit_program(ast);
    emitter.finish()
}

/// Collected shape of one class: field names and method arities.
#[derive(Debug, Default, Clone)]
struct ClassInfo {
    fields: IndexSet<String>,
    has_init: bool,
    init_arity: usize,
}

struct CEmitter<'d> {
    /// Hoisted output: prelude, structs, prototypes, functions.
    decls: String,
    /// Body of `main` under construction.
    body: String,
    indent: usize,
    diag: &'d mut Diagnostics,
    classes: IndexMap<String, ClassInfo>,
    /// Variables already declared in the current C scope.
    declared: Vec<IndexSet<String>>,
    /// Stack of open `try` catch labels for `throw` lowering.
    catch_labels: Vec<usize>,
    label_count: usize,
    lambda_count: usize,
    compose_count: usize,
}

impl<'d> CEmitter<'d> {
    fn new(diag: &'d mut Diagnostics) -> Self {
        Self {
            decls: String::new(),
            body: String::new(),
            indent: 0,
            diag,
            classes: IndexMap::new(),
            declared: vec![IndexSet::new()],
            catch_labels: Vec::new(),
            label_count: 0,
            lambda_count: 0,
            compose_count: 0,
        }
    }

    fn finish(self) -> String {
        self.decls
    }

    fn warn(&mut self, span: lyn_core::Span, msg: impl Into<String>) {
        self.diag
            .warning(Stage::Emit, DiagnosticKind::Runtime, span, msg)
            .emit();
    }

    // ----- output helpers -------------------------------------------------

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.body.push_str("    ");
        }
        self.body.push_str(text);
        self.body.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent -= 1;
        self.line(text);
    }

    // ----- program layout -------------------------------------------------

    fn emit_program(&mut self, ast: &Node) {
        let NodeKind::Program { body } = &ast.kind else {
            self.warn(ast.span, "emitter expects a Program root");
            return;
        };

        self.emit_prelude();
        self.collect_classes(body);

        let (items, statements): (Vec<&Node>, Vec<&Node>) =
            body.iter().partition(|stmt| is_file_scope_item(stmt));

        for item in &items {
            self.emit_struct_defs(item);
        }
        for item in &items {
            self.emit_prototypes(item, None);
        }
        if !items.is_empty() {
            self.decls.push('\n');
        }
        for item in &items {
            self.emit_item(item);
        }

        // `main` body.
        self.indent = 1;
        self.declared.push(IndexSet::new());
        for stmt in &statements {
            self.emit_statement(stmt);
        }
        self.declared.pop();
        self.indent = 0;

        self.decls.push_str("int main(void) {\n");
        let body = std::mem::take(&mut self.body);
        self.decls.push_str(&body);
        self.decls.push_str("    return 0;\n}\n");
    }

    fn emit_prelude(&mut self) {
        self.decls.push_str(
            "/* Generated by the Lyn compiler. */\n\
             #include <stdbool.h>\n\
             #include <stdio.h>\n\
             #include <stdlib.h>\n\
             #include <string.h>\n\
             \n\
             static bool lyn_error_pending = false;\n\
             static const char *lyn_error_message = \"\";\n\
             \n\
             static void lyn_throw(const char *message) {\n\
             \x20   lyn_error_pending = true;\n\
             \x20   lyn_error_message = message;\n\
             }\n\n",
        );
    }

    /// Field and constructor shapes for every class in the tree.
    fn collect_classes(&mut self, body: &[Node]) {
        for stmt in body {
            let NodeKind::ClassDef { name, members, .. } = &stmt.kind else {
                continue;
            };
            let mut info = ClassInfo::default();
            for member in members {
                match &member.kind {
                    NodeKind::VarDecl { name, .. } => {
                        info.fields.insert(name.clone());
                    }
                    NodeKind::FunctionDef {
                        name: method,
                        params,
                        body,
                        ..
                    } => {
                        if method == "init" {
                            info.has_init = true;
                            info.init_arity = params.len().saturating_sub(1);
                        }
                        for stmt in body {
                            collect_member_targets(stmt, &mut info.fields);
                        }
                    }
                    _ => {}
                }
            }
            self.classes.insert(name.clone(), info);
        }
    }

    fn emit_struct_defs(&mut self, item: &Node) {
        let NodeKind::ClassDef { name, .. } = &item.kind else {
            return;
        };
        let info = self.classes.get(name).cloned().unwrap_or_default();
        let _ = writeln!(self.decls, "struct {name} {{");
        if info.fields.is_empty() {
            self.decls.push_str("    char lyn_empty;\n");
        }
        for field in &info.fields {
            let _ = writeln!(self.decls, "    double {field};");
        }
        self.decls.push_str("};\n\n");
    }

    fn emit_prototypes(&mut self, item: &Node, class: Option<&str>) {
        match &item.kind {
            NodeKind::FunctionDef { .. } => {
                let signature = self.function_signature(item, class);
                let _ = writeln!(self.decls, "{signature};");
            }
            NodeKind::ClassDef { name, members, .. } => {
                for member in members {
                    self.emit_prototypes(member, Some(name));
                }
                let info = self.classes.get(name).cloned().unwrap_or_default();
                if info.has_init {
                    let params = (0..info.init_arity)
                        .map(|i| format!("double a{i}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = writeln!(self.decls, "static struct {name} *{name}_new({params});");
                }
            }
            NodeKind::ModuleDecl { name, decls } => {
                for decl in decls {
                    if matches!(decl.kind, NodeKind::FunctionDef { .. }) {
                        let signature = self.function_signature(decl, Some(name));
                        let _ = writeln!(self.decls, "{signature};");
                    }
                }
            }
            _ => {}
        }
    }

    fn emit_item(&mut self, item: &Node) {
        match &item.kind {
            NodeKind::FunctionDef { .. } => self.emit_function(item, None),
            NodeKind::ClassDef { name, members, .. } => {
                let name = name.clone();
                for member in members {
                    if matches!(member.kind, NodeKind::FunctionDef { .. }) {
                        self.emit_function(member, Some(&name));
                    }
                }
                self.emit_constructor(&name);
            }
            NodeKind::ModuleDecl { name, decls } => {
                let name = name.clone();
                for decl in decls {
                    if matches!(decl.kind, NodeKind::FunctionDef { .. }) {
                        self.emit_function(decl, Some(&name));
                    }
                }
            }
            NodeKind::Import { module, .. } => {
                let _ = writeln!(self.decls, "/* import {module} (resolved at link time) */");
            }
            _ => {}
        }
    }

    fn emit_constructor(&mut self, class: &str) {
        let Some(info) = self.classes.get(class).cloned() else {
            return;
        };
        if !info.has_init {
            return;
        }
        let params = (0..info.init_arity)
            .map(|i| format!("double a{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let args = (0..info.init_arity)
            .map(|i| format!("a{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(self.decls, "static struct {class} *{class}_new({params}) {{");
        let _ = writeln!(
            self.decls,
            "    struct {class} *self = malloc(sizeof(struct {class}));"
        );
        self.decls
            .push_str("    if (!self) {\n        fprintf(stderr, \"out of memory\\n\");\n        exit(1);\n    }\n");
        let sep = if args.is_empty() { "" } else { ", " };
        let _ = writeln!(self.decls, "    {class}_init(self{sep}{args});");
        self.decls.push_str("    return self;\n}\n\n");
    }

    // ----- functions ------------------------------------------------------

    fn function_signature(&mut self, func: &Node, class: Option<&str>) -> String {
        let NodeKind::FunctionDef {
            name,
            params,
            return_ty,
            body,
        } = &func.kind
        else {
            return String::new();
        };

        let c_name = match class {
            Some(class) => format!("{class}_{name}"),
            None => name.clone(),
        };
        let ret = match return_ty.as_deref() {
            Some(ty_name) => c_type(&Ty::from_name(ty_name)),
            None if returns_value(body) => "double".to_string(),
            None => "void".to_string(),
        };
        let params = self.param_list(params, class);
        format!("static {ret} {c_name}({params})")
    }

    fn param_list(&mut self, params: &[Param], class: Option<&str>) -> String {
        if params.is_empty() {
            return "void".to_string();
        }
        params
            .iter()
            .map(|param| {
                let ty = match (&param.ty_name, class) {
                    (Some(ty_name), _) => c_type(&Ty::from_name(ty_name)),
                    (None, Some(class)) if param.name == "self" => {
                        format!("struct {class} *")
                    }
                    (None, _) => "double".to_string(),
                };
                if ty.ends_with('*') {
                    format!("{ty}{}", param.name)
                } else {
                    format!("{ty} {}", param.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn emit_function(&mut self, func: &Node, class: Option<&str>) {
        let NodeKind::FunctionDef { params, body, .. } = &func.kind else {
            return;
        };

        // Body first: emitting it may hoist lambda/compose definitions
        // into `decls`, which must land before this function's text.
        let saved_body = std::mem::take(&mut self.body);
        let saved_indent = self.indent;
        self.indent = 1;
        self.declared.push(params.iter().map(|p| p.name.clone()).collect());
        for stmt in body {
            self.emit_statement(stmt);
        }
        self.declared.pop();
        self.indent = saved_indent;
        let emitted = std::mem::replace(&mut self.body, saved_body);

        let signature = self.function_signature(func, class);
        let _ = writeln!(self.decls, "{signature} {{");
        self.decls.push_str(&emitted);
        self.decls.push_str("}\n\n");
    }

    // ----- statements -----------------------------------------------------

    fn emit_statement(&mut self, stmt: &Node) {
        match &stmt.kind {
            NodeKind::Program { body } | NodeKind::Block { body } => {
                self.open("{");
                self.declared.push(IndexSet::new());
                for stmt in body {
                    self.emit_statement(stmt);
                }
                self.declared.pop();
                self.close("}");
            }
            NodeKind::FunctionDef { .. }
            | NodeKind::ClassDef { .. }
            | NodeKind::ModuleDecl { .. } => {
                // Nested definitions were hoisted to file scope by the
                // program emitter when they sat directly in the Program
                // body; anything deeper is out of C's reach.
                self.warn(stmt.span, "nested definitions are not emitted");
            }
            NodeKind::Import { module, .. } => {
                let module = module.clone();
                self.line(&format!("/* import {module} */"));
            }
            NodeKind::AspectDef { .. } | NodeKind::Pointcut { .. } | NodeKind::Advice { .. } => {
                self.warn(stmt.span, "aspect definitions must be woven before emission");
            }
            NodeKind::VarDecl { name, ty_name, init } => {
                let c_ty = ty_name
                    .as_deref()
                    .map_or_else(|| "double".to_string(), |n| c_type(&Ty::from_name(n)));
                let name = name.clone();
                self.note_declared(&name);
                match init {
                    Some(init) if matches!(init.kind, NodeKind::ArrayLit { .. }) => {
                        let value = self.expr(init);
                        self.line(&format!("double {name}[] = {value};"));
                    }
                    Some(init) => {
                        let value = self.expr(init);
                        let sep = if c_ty.ends_with('*') { "" } else { " " };
                        self.line(&format!("{c_ty}{sep}{name} = {value};"));
                    }
                    None => {
                        let sep = if c_ty.ends_with('*') { "" } else { " " };
                        self.line(&format!("{c_ty}{sep}{name} = 0;"));
                    }
                }
            }
            NodeKind::VarAssign { name, value } => {
                let name = name.clone();
                if matches!(value.kind, NodeKind::ArrayLit { .. }) {
                    let initializer = self.expr(value);
                    self.note_declared(&name);
                    self.line(&format!("double {name}[] = {initializer};"));
                    return;
                }
                // Lambdas and compositions bind as function pointers; the
                // parameter list comes from the value's shape.
                if let Some(arity) = fn_pointer_arity(value)
                    && !self.is_declared(&name)
                {
                    let rhs = self.expr(value);
                    let params = if arity == 0 {
                        "void".to_string()
                    } else {
                        vec!["double"; arity].join(", ")
                    };
                    self.note_declared(&name);
                    self.line(&format!("double (*{name})({params}) = {rhs};"));
                    return;
                }
                let c_ty = self.value_c_type(value);
                let rhs = self.expr(value);
                if self.is_declared(&name) {
                    self.line(&format!("{name} = {rhs};"));
                } else {
                    self.note_declared(&name);
                    let sep = if c_ty.ends_with('*') { "" } else { " " };
                    self.line(&format!("{c_ty}{sep}{name} = {rhs};"));
                }
            }
            NodeKind::MemberAssign {
                object,
                member,
                value,
            } => {
                let object = self.expr(object);
                let member = member.clone();
                let value = self.expr(value);
                self.line(&format!("{object}->{member} = {value};"));
            }
            NodeKind::Print { value } => self.emit_print(value),
            NodeKind::Return { value } => match value {
                Some(value) => {
                    let value = self.expr(value);
                    self.line(&format!("return {value};"));
                }
                None => self.line("return;"),
            },
            NodeKind::Break => self.line("break;"),
            NodeKind::Continue => self.line("continue;"),
            NodeKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let cond = self.truth(cond);
                self.open(&format!("if ({cond}) {{"));
                self.emit_scope(then_body);
                if else_body.is_empty() {
                    self.close("}");
                } else {
                    self.indent -= 1;
                    self.line("} else {");
                    self.indent += 1;
                    self.emit_scope(else_body);
                    self.close("}");
                }
            }
            NodeKind::While { cond, body } => {
                let cond = self.truth(cond);
                self.open(&format!("while ({cond}) {{"));
                self.emit_scope(body);
                self.close("}");
            }
            NodeKind::DoWhile { body, cond } => {
                let cond = self.truth(cond);
                self.open("do {");
                self.emit_scope(body);
                self.close(&format!("}} while ({cond});"));
            }
            NodeKind::ForRange {
                var,
                start,
                end,
                step,
                body,
            } => {
                let var = var.clone();
                let start = self.expr(start);
                let end = self.expr(end);
                let step = match step {
                    Some(step) => self.expr(step),
                    None => "1".to_string(),
                };
                self.open(&format!(
                    "for (double {var} = {start}; {var} < {end}; {var} += {step}) {{"
                ));
                self.declared.push(std::iter::once(var).collect());
                for stmt in body {
                    self.emit_statement(stmt);
                }
                self.declared.pop();
                self.close("}");
            }
            NodeKind::ForEach {
                var,
                iterable,
                body,
            } => {
                // Only array-typed iterables have a C rendering; the index
                // variable is hidden behind a generated name.
                let var = var.clone();
                let label = self.next_label();
                let iterable_text = self.expr(iterable);
                self.open(&format!(
                    "for (size_t lyn_i{label} = 0; lyn_i{label} < sizeof({iterable_text}) / sizeof({iterable_text}[0]); lyn_i{label}++) {{"
                ));
                self.line(&format!(
                    "double {var} = {iterable_text}[lyn_i{label}];"
                ));
                self.declared.push(std::iter::once(var).collect());
                for stmt in body {
                    self.emit_statement(stmt);
                }
                self.declared.pop();
                self.close("}");
            }
            NodeKind::ForC {
                init,
                cond,
                update,
                body,
            } => {
                // The header clauses are full statements in Lyn; lower
                // them around/into a while loop to keep the emitter's
                // statement machinery reusable.
                self.open("{");
                self.declared.push(IndexSet::new());
                if let Some(init) = init {
                    self.emit_statement(init);
                }
                let cond = match cond {
                    Some(cond) => self.truth(cond),
                    None => "true".to_string(),
                };
                self.open(&format!("while ({cond}) {{"));
                for stmt in body {
                    self.emit_statement(stmt);
                }
                if let Some(update) = update {
                    self.emit_statement(update);
                }
                self.close("}");
                self.declared.pop();
                self.close("}");
            }
            NodeKind::Switch {
                scrutinee,
                cases,
                default_body,
            } => self.emit_switch(scrutinee, cases, default_body.as_deref()),
            NodeKind::Match {
                scrutinee,
                cases,
                otherwise,
            } => self.emit_match(scrutinee, cases, otherwise.as_deref()),
            NodeKind::TryCatch {
                try_body,
                error_name,
                catch_body,
                finally_body,
                ..
            } => self.emit_try(try_body, error_name.as_deref(), catch_body, finally_body),
            NodeKind::Throw { value } => {
                let message = match &value.kind {
                    NodeKind::Str { value } => format!("\"{}\"", escape_c(value)),
                    _ => "\"error\"".to_string(),
                };
                self.line(&format!("lyn_throw({message});"));
                if let Some(&label) = self.catch_labels.last() {
                    self.line(&format!("goto lyn_catch_{label};"));
                } else {
                    self.line("fprintf(stderr, \"uncaught error: %s\\n\", lyn_error_message);");
                    self.line("exit(1);");
                }
            }
            NodeKind::Case { .. } | NodeKind::MatchCase { .. } => {
                // Emitted by their parents; reaching one loose is a tree
                // construction error upstream.
                self.warn(stmt.span, "case outside switch/match");
            }
            // Expression statement.
            _ => {
                let expr = self.expr(stmt);
                self.line(&format!("(void)({expr});"));
            }
        }
    }

    fn emit_scope(&mut self, body: &[Node]) {
        self.declared.push(IndexSet::new());
        for stmt in body {
            self.emit_statement(stmt);
        }
        self.declared.pop();
    }

    fn emit_print(&mut self, value: &Node) {
        let expr = self.expr(value);
        match value.ty.as_ref() {
            Some(Ty::Str) => self.line(&format!("printf(\"%s\\n\", {expr});")),
            Some(Ty::Bool) => {
                self.line(&format!("printf(\"%s\\n\", ({expr}) ? \"true\" : \"false\");"));
            }
            Some(Ty::Int) => self.line(&format!("printf(\"%ld\\n\", (long)({expr}));")),
            _ => {
                if matches!(value.kind, NodeKind::Str { .. }) {
                    self.line(&format!("printf(\"%s\\n\", {expr});"));
                } else {
                    self.line(&format!("printf(\"%g\\n\", (double)({expr}));"));
                }
            }
        }
    }

    /// Cases lower to a plain `if`/`else if`/`else` chain, never to a
    /// wrapper statement: `break`/`continue` written inside a case must
    /// keep binding to the real enclosing loop.
    fn emit_switch(&mut self, scrutinee: &Node, cases: &[Node], default_body: Option<&[Node]>) {
        let scrutinee_text = self.expr(scrutinee);
        let mut first = true;
        for case in cases {
            let NodeKind::Case { value, body } = &case.kind else {
                continue;
            };
            let comparison = self.equality(scrutinee, &scrutinee_text, value);
            let keyword = if first { "if" } else { "} else if" };
            if !first {
                self.indent -= 1;
            }
            self.open(&format!("{keyword} ({comparison}) {{"));
            self.emit_scope(body);
            first = false;
        }
        match default_body {
            Some(default_body) if first => {
                self.open("{");
                self.emit_scope(default_body);
                self.close("}");
            }
            Some(default_body) => {
                self.indent -= 1;
                self.open("} else {");
                self.emit_scope(default_body);
                self.close("}");
            }
            None if !first => self.close("}"),
            None => {}
        }
    }

    fn emit_match(&mut self, scrutinee: &Node, cases: &[Node], otherwise: Option<&[Node]>) {
        let scrutinee_text = self.expr(scrutinee);
        let mut first = true;
        for case in cases {
            let NodeKind::MatchCase { pattern, body } = &case.kind else {
                continue;
            };
            let comparison = self.equality(scrutinee, &scrutinee_text, pattern);
            let keyword = if first { "if" } else { "} else if" };
            if !first {
                self.indent -= 1;
            }
            self.open(&format!("{keyword} ({comparison}) {{"));
            self.emit_scope(body);
            first = false;
        }
        match otherwise {
            Some(otherwise) if first => {
                self.open("{");
                self.emit_scope(otherwise);
                self.close("}");
            }
            Some(otherwise) => {
                self.indent -= 1;
                self.open("} else {");
                self.emit_scope(otherwise);
                self.close("}");
            }
            None if !first => self.close("}"),
            None => {}
        }
    }

    fn emit_try(
        &mut self,
        try_body: &[Node],
        error_name: Option<&str>,
        catch_body: &[Node],
        finally_body: &[Node],
    ) {
        let label = self.next_label();
        self.line("lyn_error_pending = false;");
        self.catch_labels.push(label);
        self.emit_scope(try_body);
        self.catch_labels.pop();
        self.line(&format!("goto lyn_finally_{label};"));
        self.line(&format!("lyn_catch_{label}:;"));
        self.open("{");
        self.line("lyn_error_pending = false;");
        if let Some(name) = error_name {
            self.line(&format!("const char *{name} = lyn_error_message;"));
            self.line(&format!("(void){name};"));
        }
        self.emit_scope(catch_body);
        self.close("}");
        self.line(&format!("lyn_finally_{label}:;"));
        self.emit_scope(finally_body);
    }

    // ----- expressions ----------------------------------------------------

    fn expr(&mut self, node: &Node) -> String {
        match &node.kind {
            NodeKind::Number { value } => format_number(*value),
            NodeKind::Str { value } => format!("\"{}\"", escape_c(value)),
            NodeKind::Bool { value } => if *value { "true" } else { "false" }.to_string(),
            NodeKind::Null => "NULL".to_string(),
            NodeKind::Ident { name } => name.clone(),
            NodeKind::This => "self".to_string(),
            NodeKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            NodeKind::Unary { op, operand } => {
                let operand_text = self.expr(operand);
                match op {
                    UnaryOp::Not => format!("!({operand_text})"),
                    UnaryOp::Neg => format!("-({operand_text})"),
                }
            }
            NodeKind::Member { object, member } => {
                let object = self.expr(object);
                format!("{object}->{member}")
            }
            NodeKind::Index { object, index } => {
                let object = self.expr(object);
                let index = self.expr(index);
                format!("{object}[(size_t)({index})]")
            }
            NodeKind::ArrayLit { elements } => {
                let elements = elements
                    .iter()
                    .map(|e| self.expr(e))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{elements}}}")
            }
            NodeKind::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({args})", mangle(callee))
            }
            NodeKind::Curry {
                callee,
                applied,
                total,
            } => {
                if *total == Some(applied.len()) {
                    let args = applied
                        .iter()
                        .map(|a| self.expr(a))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{}({args})", mangle(callee))
                } else {
                    self.warn(
                        node.span,
                        format!("partially applied call of `{callee}` cannot be emitted"),
                    );
                    "0".to_string()
                }
            }
            NodeKind::New { class, args } => {
                let args = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{class}_new({args})")
            }
            NodeKind::Lambda { params, body, .. } => self.hoist_lambda(params, body),
            NodeKind::Compose { left, right } => self.hoist_compose(node, left, right),
            _ => {
                self.warn(
                    node.span,
                    format!("`{}` has no expression rendering", node.variant_name()),
                );
                "0".to_string()
            }
        }
    }

    fn binary(&mut self, op: BinOp, lhs: &Node, rhs: &Node) -> String {
        let left = self.expr(lhs);
        let right = self.expr(rhs);
        match op {
            BinOp::And => format!("(({left}) && ({right}))"),
            BinOp::Or => format!("(({left}) || ({right}))"),
            BinOp::Add if is_string_typed(lhs) || is_string_typed(rhs) => {
                // String concatenation needs a runtime buffer; constant
                // folding has already joined literal-only cases.
                self.warn(
                    lhs.span,
                    "string concatenation of non-literals is not supported by the C backend",
                );
                left
            }
            BinOp::Eq if is_string_typed(lhs) || is_string_typed(rhs) => {
                format!("(strcmp({left}, {right}) == 0)")
            }
            BinOp::Ne if is_string_typed(lhs) || is_string_typed(rhs) => {
                format!("(strcmp({left}, {right}) != 0)")
            }
            _ => format!("(({left}) {} ({right}))", c_operator(op)),
        }
    }

    /// Render an expression as a C truth value.
    fn truth(&mut self, cond: &Node) -> String {
        let text = self.expr(cond);
        match cond.ty.as_ref() {
            Some(Ty::Bool) => text,
            _ => format!("({text}) != 0"),
        }
    }

    /// Equality test between a scrutinee and a case value, string-aware.
    fn equality(&mut self, scrutinee: &Node, scrutinee_text: &str, value: &Node) -> String {
        let value_text = self.expr(value);
        if is_string_typed(scrutinee) || is_string_typed(value) {
            format!("(strcmp({scrutinee_text}, {value_text}) == 0)")
        } else {
            format!("(({scrutinee_text}) == ({value_text}))")
        }
    }

    fn hoist_lambda(&mut self, params: &[Param], body: &Node) -> String {
        let name = format!("lyn_lambda_{}", self.lambda_count);
        self.lambda_count += 1;

        let param_text = if params.is_empty() {
            "void".to_string()
        } else {
            params
                .iter()
                .map(|p| format!("double {}", p.name))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let saved_body = std::mem::take(&mut self.body);
        let saved_indent = self.indent;
        self.indent = 0;
        self.declared.push(params.iter().map(|p| p.name.clone()).collect());
        let value = self.expr(body);
        self.declared.pop();
        self.indent = saved_indent;
        self.body = saved_body;

        let _ = writeln!(
            self.decls,
            "static double {name}({param_text}) {{\n    return {value};\n}}\n"
        );
        name
    }

    /// `f >> g` becomes a wrapper calling `g(f(x))`. Only named functions
    /// compose; anything else is out of C's reach without closures.
    fn hoist_compose(&mut self, node: &Node, left: &Node, right: &Node) -> String {
        let (NodeKind::Ident { name: first }, NodeKind::Ident { name: second }) =
            (&left.kind, &right.kind)
        else {
            self.warn(node.span, "only named functions can be composed");
            return "0".to_string();
        };

        let name = format!("lyn_compose_{}", self.compose_count);
        self.compose_count += 1;
        let _ = writeln!(
            self.decls,
            "static double {name}(double x) {{\n    return {second}({first}(x));\n}}\n"
        );
        name
    }

    // ----- bookkeeping ----------------------------------------------------

    fn next_label(&mut self) -> usize {
        self.label_count += 1;
        self.label_count
    }

    fn note_declared(&mut self, name: &str) {
        self.declared
            .last_mut()
            .expect("declaration scope stack never empty")
            .insert(name.to_string());
    }

    fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().rev().any(|scope| scope.contains(name))
    }

    /// C type of an assignment's right side, for implicit declarations.
    fn value_c_type(&self, value: &Node) -> String {
        match (&value.ty, &value.kind) {
            // Callable values that are not a lambda/compose literal have
            // no spellable pointer type here; a placeholder slot keeps
            // the program compiling after the emitted warning.
            (Some(Ty::Function), _) => "double".to_string(),
            (Some(ty), _) => c_type(ty),
            (None, NodeKind::Str { .. }) => "const char *".to_string(),
            (None, NodeKind::Bool { .. }) => "bool".to_string(),
            (None, NodeKind::New { class, .. }) => format!("struct {class} *"),
            _ => "double".to_string(),
        }
    }
}

// ----- free helpers -------------------------------------------------------

fn is_string_typed(node: &Node) -> bool {
    matches!(node.ty, Some(Ty::Str)) || matches!(node.kind, NodeKind::Str { .. })
}

fn is_file_scope_item(stmt: &Node) -> bool {
    matches!(
        stmt.kind,
        NodeKind::FunctionDef { .. }
            | NodeKind::ClassDef { .. }
            | NodeKind::ModuleDecl { .. }
            | NodeKind::Import { .. }
    )
}

/// `self.field = ...` targets seen anywhere in a method body.
fn collect_member_targets(node: &Node, fields: &mut IndexSet<String>) {
    if let NodeKind::MemberAssign { object, member, .. } = &node.kind {
        let is_receiver = matches!(object.kind, NodeKind::This)
            || matches!(&object.kind, NodeKind::Ident { name } if name == "self");
        if is_receiver {
            fields.insert(member.clone());
        }
    }
    for child in node.children() {
        collect_member_targets(child, fields);
    }
}

fn returns_value(body: &[Node]) -> bool {
    body.iter().any(|stmt| match &stmt.kind {
        NodeKind::Return { value } => value.is_some(),
        NodeKind::If {
            then_body,
            else_body,
            ..
        } => returns_value(then_body) || returns_value(else_body),
        NodeKind::While { body, .. }
        | NodeKind::DoWhile { body, .. }
        | NodeKind::ForRange { body, .. }
        | NodeKind::ForEach { body, .. }
        | NodeKind::ForC { body, .. } => returns_value(body),
        _ => false,
    })
}

fn c_type(ty: &Ty) -> String {
    match ty {
        Ty::Int | Ty::Float => "double".to_string(),
        Ty::Bool => "bool".to_string(),
        Ty::Str => "const char *".to_string(),
        Ty::Null => "void *".to_string(),
        Ty::Void => "void".to_string(),
        Ty::Array(inner) => format!("{} *", c_type(inner)),
        Ty::Class(name) => format!("struct {name} *"),
        Ty::Function => "double (*)(double)".to_string(),
    }
}

fn c_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn escape_c(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// Function-pointer parameter count for values that bind as callables.
fn fn_pointer_arity(value: &Node) -> Option<usize> {
    match &value.kind {
        NodeKind::Lambda { params, .. } => Some(params.len()),
        NodeKind::Compose { .. } => Some(1),
        _ => None,
    }
}

/// Qualified call names (`Class.method`, `module.fn`) become C identifiers.
fn mangle(callee: &str) -> String {
    callee.replace('.', "_")
}
