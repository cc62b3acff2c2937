use crate::ast::{Node, pretty};
use crate::diagnostics::Diagnostics;
use crate::parser::parse;

/// Parse a source that must be syntactically valid.
pub(super) fn parse_ok(source: &str) -> Node {
    let mut diag = Diagnostics::new();
    let ast = parse(source, &mut diag);
    assert!(
        !diag.has_errors(),
        "unexpected parse errors:\n{}",
        diag.printer().source(source).render()
    );
    ast.expect("parse returned no tree without reporting errors")
}

/// Pretty-printed AST of a valid source.
pub(super) fn snapshot(source: &str) -> String {
    pretty(&parse_ok(source))
}

/// First error message of a source that must fail to parse.
pub(super) fn parse_err(source: &str) -> String {
    let mut diag = Diagnostics::new();
    let ast = parse(source, &mut diag);
    assert!(ast.is_none(), "expected a parse failure");
    diag.first_error()
        .expect("aborted parse must report an error")
        .message()
        .to_string()
}
