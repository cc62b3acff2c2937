//! Indent-structured AST pretty-printer.
//!
//! One line per node: variant name plus salient fields, children indented
//! two spaces. Nodes with several heterogeneous child groups label them
//! (`cond:`, `then:`, ...) so the dump stays unambiguous. Inferred types,
//! when present, are appended as `:: ty`.

use std::fmt::Write;

use super::{Node, NodeKind, Param};

/// Render the tree rooted at `node`.
pub fn pretty(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    indent(out, depth);
    out.push_str(text);
    out.push('\n');
}

fn write_body(out: &mut String, nodes: &[Node], depth: usize) {
    for node in nodes {
        write_node(out, node, depth);
    }
}

fn write_group(out: &mut String, label: &str, nodes: &[Node], depth: usize) {
    line(out, depth, label);
    write_body(out, nodes, depth + 1);
}

fn params_text(params: &[Param]) -> String {
    let mut out = String::from("(");
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&p.name);
        if let Some(ty) = &p.ty_name {
            let _ = write!(out, ": {ty}");
        }
    }
    out.push(')');
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let mut header = header_text(node);
    if let Some(ty) = &node.ty {
        let _ = write!(header, " :: {ty}");
    }
    line(out, depth, &header);

    let depth = depth + 1;
    match &node.kind {
        NodeKind::Program { body }
        | NodeKind::Block { body }
        | NodeKind::FunctionDef { body, .. } => write_body(out, body, depth),
        NodeKind::ClassDef { members, .. } => write_body(out, members, depth),
        NodeKind::ModuleDecl { decls, .. } => write_body(out, decls, depth),
        NodeKind::Import { .. } => {}
        NodeKind::AspectDef {
            pointcuts, advice, ..
        } => {
            write_body(out, pointcuts, depth);
            write_body(out, advice, depth);
        }
        NodeKind::If {
            cond,
            then_body,
            else_body,
        } => {
            write_group(out, "cond:", std::slice::from_ref(cond), depth);
            write_group(out, "then:", then_body, depth);
            if !else_body.is_empty() {
                write_group(out, "else:", else_body, depth);
            }
        }
        NodeKind::While { cond, body } => {
            write_group(out, "cond:", std::slice::from_ref(cond), depth);
            write_group(out, "body:", body, depth);
        }
        NodeKind::DoWhile { body, cond } => {
            write_group(out, "body:", body, depth);
            write_group(out, "cond:", std::slice::from_ref(cond), depth);
        }
        NodeKind::ForRange {
            start,
            end,
            step,
            body,
            ..
        } => {
            write_group(out, "from:", std::slice::from_ref(start), depth);
            write_group(out, "to:", std::slice::from_ref(end), depth);
            if let Some(step) = step {
                write_group(out, "step:", std::slice::from_ref(step), depth);
            }
            write_group(out, "body:", body, depth);
        }
        NodeKind::ForEach {
            iterable, body, ..
        } => {
            write_group(out, "in:", std::slice::from_ref(iterable), depth);
            write_group(out, "body:", body, depth);
        }
        NodeKind::ForC {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(init) = init {
                write_group(out, "init:", std::slice::from_ref(init), depth);
            }
            if let Some(cond) = cond {
                write_group(out, "cond:", std::slice::from_ref(cond), depth);
            }
            if let Some(update) = update {
                write_group(out, "update:", std::slice::from_ref(update), depth);
            }
            write_group(out, "body:", body, depth);
        }
        NodeKind::Switch {
            scrutinee,
            cases,
            default_body,
        } => {
            write_group(out, "scrutinee:", std::slice::from_ref(scrutinee), depth);
            write_body(out, cases, depth);
            if let Some(default_body) = default_body {
                write_group(out, "default:", default_body, depth);
            }
        }
        NodeKind::Case { value, body } => {
            write_group(out, "value:", std::slice::from_ref(value), depth);
            write_group(out, "body:", body, depth);
        }
        NodeKind::Return { value } => {
            if let Some(value) = value {
                write_node(out, value, depth);
            }
        }
        NodeKind::VarDecl { init, .. } => {
            if let Some(init) = init {
                write_node(out, init, depth);
            }
        }
        NodeKind::VarAssign { value, .. }
        | NodeKind::Print { value }
        | NodeKind::Throw { value } => write_node(out, value, depth),
        NodeKind::MemberAssign { object, value, .. } => {
            write_group(out, "object:", std::slice::from_ref(object), depth);
            write_group(out, "value:", std::slice::from_ref(value), depth);
        }
        NodeKind::Break | NodeKind::Continue => {}
        NodeKind::TryCatch {
            try_body,
            error_ty,
            error_name,
            catch_body,
            finally_body,
        } => {
            write_group(out, "try:", try_body, depth);
            let mut catch_label = String::from("catch");
            if let Some(ty) = error_ty {
                let _ = write!(catch_label, " {ty}");
            }
            if let Some(name) = error_name {
                let _ = write!(catch_label, " {name}");
            }
            catch_label.push(':');
            write_group(out, &catch_label, catch_body, depth);
            if !finally_body.is_empty() {
                write_group(out, "finally:", finally_body, depth);
            }
        }
        NodeKind::Number { .. }
        | NodeKind::Str { .. }
        | NodeKind::Bool { .. }
        | NodeKind::Null
        | NodeKind::Ident { .. }
        | NodeKind::This
        | NodeKind::Pointcut { .. } => {}
        NodeKind::Binary { lhs, rhs, .. } => {
            write_node(out, lhs, depth);
            write_node(out, rhs, depth);
        }
        NodeKind::Unary { operand, .. } => write_node(out, operand, depth),
        NodeKind::Member { object, .. } => write_node(out, object, depth),
        NodeKind::Index { object, index } => {
            write_node(out, object, depth);
            write_node(out, index, depth);
        }
        NodeKind::ArrayLit { elements } => write_body(out, elements, depth),
        NodeKind::Call { args, .. } | NodeKind::New { args, .. } => write_body(out, args, depth),
        NodeKind::Lambda { body, .. } => write_node(out, body, depth),
        NodeKind::Compose { left, right } => {
            write_node(out, left, depth);
            write_node(out, right, depth);
        }
        NodeKind::Curry { applied, .. } => write_body(out, applied, depth),
        NodeKind::Advice { body, .. } => write_body(out, body, depth),
        NodeKind::Match {
            scrutinee,
            cases,
            otherwise,
        } => {
            write_group(out, "scrutinee:", std::slice::from_ref(scrutinee), depth);
            write_body(out, cases, depth);
            if let Some(otherwise) = otherwise {
                write_group(out, "otherwise:", otherwise, depth);
            }
        }
        NodeKind::MatchCase { pattern, body } => {
            write_group(out, "pattern:", std::slice::from_ref(pattern), depth);
            write_group(out, "body:", body, depth);
        }
    }
}

fn header_text(node: &Node) -> String {
    match &node.kind {
        NodeKind::FunctionDef {
            name,
            params,
            return_ty,
            ..
        } => {
            let mut h = format!("FunctionDef {name}{}", params_text(params));
            if let Some(ret) = return_ty {
                let _ = write!(h, " -> {ret}");
            }
            h
        }
        NodeKind::ClassDef { name, base, .. } => match base {
            Some(base) => format!("ClassDef {name} : {base}"),
            None => format!("ClassDef {name}"),
        },
        NodeKind::ModuleDecl { name, .. } => format!("ModuleDecl {name}"),
        NodeKind::Import {
            module,
            alias,
            symbols,
        } => {
            let mut h = format!("Import {module}");
            if let Some(alias) = alias {
                let _ = write!(h, " as {alias}");
            }
            if let Some(symbols) = symbols {
                h.push_str(" { ");
                for (i, sym) in symbols.iter().enumerate() {
                    if i > 0 {
                        h.push_str(", ");
                    }
                    h.push_str(&sym.name);
                    if let Some(alias) = &sym.alias {
                        let _ = write!(h, " as {alias}");
                    }
                }
                h.push_str(" }");
            }
            h
        }
        NodeKind::AspectDef { name, .. } => format!("AspectDef {name}"),
        NodeKind::ForRange { var, .. } => format!("ForRange {var}"),
        NodeKind::ForEach { var, .. } => format!("ForEach {var}"),
        NodeKind::VarDecl { name, ty_name, .. } => match ty_name {
            Some(ty) => format!("VarDecl {name}: {ty}"),
            None => format!("VarDecl {name}"),
        },
        NodeKind::VarAssign { name, .. } => format!("VarAssign {name}"),
        NodeKind::MemberAssign { member, .. } => format!("MemberAssign .{member}"),
        NodeKind::Number { value } => format!("Number {value}"),
        NodeKind::Str { value } => format!("Str {value:?}"),
        NodeKind::Bool { value } => format!("Bool {value}"),
        NodeKind::Ident { name } => format!("Ident {name}"),
        NodeKind::Binary { op, .. } => format!("Binary {}", op.symbol()),
        NodeKind::Unary { op, .. } => format!("Unary {}", op.symbol()),
        NodeKind::Member { member, .. } => format!("Member .{member}"),
        NodeKind::Call { callee, .. } => format!("Call {callee}"),
        NodeKind::Lambda {
            params, return_ty, ..
        } => {
            let mut h = format!("Lambda {}", params_text(params));
            if let Some(ret) = return_ty {
                let _ = write!(h, " -> {ret}");
            }
            h
        }
        NodeKind::Curry { callee, applied, total } => match total {
            Some(total) => format!("Curry {callee} [{}/{total}]", applied.len()),
            None => format!("Curry {callee} [{}/?]", applied.len()),
        },
        NodeKind::New { class, .. } => format!("New {class}"),
        NodeKind::Pointcut { name, pattern } => format!("Pointcut {name} {pattern:?}"),
        NodeKind::Advice { kind, pointcut, .. } => {
            format!("Advice {} {pointcut}", kind.name())
        }
        _ => node.variant_name().to_string(),
    }
}
