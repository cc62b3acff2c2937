use indoc::indoc;

use crate::ast::{Node, pretty};
use crate::diagnostics::Diagnostics;
use crate::parser::parse;

use super::{MacroTable, concat, stringify};

fn parse_ok(source: &str) -> Node {
    let mut diag = Diagnostics::new();
    parse(source, &mut diag).expect("test source must parse")
}

fn expand(source: &str) -> (Node, super::ExpandStats, Diagnostics) {
    let mut ast = parse_ok(source);
    let mut diag = Diagnostics::new();
    let mut table = MacroTable::new();
    table.expand(&mut ast, &mut diag);
    (ast, table.stats(), diag)
}

#[test]
fn macro_definitions_are_removed_and_registered() {
    let input = indoc! {r#"
    func macro_twice(x)
      print(x)
      print(x)
    end
    main
    end
    "#};

    let (ast, stats, _) = expand(input);
    assert_eq!(stats.macros_registered, 1);
    insta::assert_snapshot!(pretty(&ast), @"Program");
}

#[test]
fn call_sites_expand_with_parameter_substitution() {
    let input = indoc! {r#"
    func macro_twice(x)
      print(x)
      print(x)
    end
    main
      macro_twice(7)
    end
    "#};

    let (ast, stats, _) = expand(input);
    assert_eq!(stats.calls_expanded, 1);

    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      Program
        Print
          Number 7
        Print
          Number 7
    ");
}

#[test]
fn arguments_substitute_as_whole_expressions() {
    let input = indoc! {r#"
    func macro_show(v)
      print(v)
    end
    main
      macro_show(a + b)
    end
    "#};

    let (ast, _, _) = expand(input);
    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      Program
        Print
          Binary +
            Ident a
            Ident b
    ");
}

#[test]
fn arity_mismatch_warns_and_keeps_the_call() {
    let input = indoc! {r#"
    func macro_twice(x)
      print(x)
      print(x)
    end
    main
      macro_twice(1, 2)
    end
    "#};

    let (ast, stats, diag) = expand(input);
    assert_eq!(stats.calls_expanded, 0);
    assert!(diag.has_warnings());
    assert!(!diag.has_errors());

    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      Call macro_twice
        Number 1
        Number 2
    ");
}

#[test]
fn non_macro_functions_are_untouched() {
    let input = indoc! {r#"
    func helper(x)
      return x
    end
    main
      print(helper(1))
    end
    "#};

    let (ast, stats, _) = expand(input);
    assert_eq!(stats.macros_registered, 0);
    assert_eq!(stats.calls_expanded, 0);
    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      FunctionDef helper(x)
        Return
          Ident x
      Print
        Call helper
          Number 1
    ");
}

#[test]
fn macros_can_call_macros() {
    let input = indoc! {r#"
    func macro_inner(x)
      print(x)
    end
    func macro_outer(y)
      macro_inner(y)
      macro_inner(y)
    end
    main
      macro_outer(3)
    end
    "#};

    let (ast, stats, _) = expand(input);
    assert_eq!(stats.macros_registered, 2);
    assert_eq!(stats.calls_expanded, 3);

    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      Program
        Program
          Print
            Number 3
        Program
          Print
            Number 3
    ");
}

#[test]
fn expansions_are_disjoint_copies() {
    let input = indoc! {r#"
    func macro_say(x)
      print(x)
    end
    main
      macro_say(1)
      macro_say(1)
    end
    "#};

    let (mut ast, stats, _) = expand(input);
    assert_eq!(stats.calls_expanded, 2);

    let crate::ast::NodeKind::Program { body } = &mut ast.kind else {
        panic!("root must be a Program");
    };
    assert_eq!(body.len(), 2);

    // Clearing the first expansion leaves the second intact.
    let crate::ast::NodeKind::Program { body: first } = &mut body[0].kind else {
        panic!("expansion must be a Program node");
    };
    first.clear();
    let crate::ast::NodeKind::Program { body: second } = &body[1].kind else {
        panic!("expansion must be a Program node");
    };
    assert_eq!(second.len(), 1);
}

#[test]
fn stringify_handles_literal_kinds() {
    use lyn_core::Span;

    let span = Span::new(0, 1);
    assert_eq!(stringify(&Node::number(42.0, span)), "42");
    assert_eq!(stringify(&Node::number(3.5, span)), "3.5");
    assert_eq!(stringify(&Node::string("hi", span)), "hi");
    assert_eq!(stringify(&Node::boolean(true, span)), "true");
    assert_eq!(stringify(&Node::ident("x", span)), "x");

    let unprintable = Node::new(
        crate::ast::NodeKind::Binary {
            op: crate::ast::BinOp::Add,
            lhs: Box::new(Node::number(1.0, span)),
            rhs: Box::new(Node::number(2.0, span)),
        },
        span,
    );
    assert_eq!(stringify(&unprintable), "<<unprintable>>");
}

#[test]
fn concat_joins_strings() {
    assert_eq!(concat("macro_", "twice"), "macro_twice");
    assert_eq!(concat("", "x"), "x");
}
