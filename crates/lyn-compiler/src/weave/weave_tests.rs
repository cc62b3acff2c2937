use indoc::indoc;

use crate::ast::{Node, pretty};
use crate::diagnostics::Diagnostics;
use crate::parser::parse;

use super::Weaver;

fn parse_ok(source: &str) -> Node {
    let mut diag = Diagnostics::new();
    parse(source, &mut diag).expect("test source must parse")
}

fn weave(source: &str) -> (Node, super::WeaveStats) {
    let mut ast = parse_ok(source);
    let mut diag = Diagnostics::new();
    let mut weaver = Weaver::new();
    assert!(weaver.weave(&mut ast, &mut diag));
    (ast, weaver.stats().clone())
}

#[test]
fn before_advice_splices_at_position_zero() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice before trace
        print("enter")
      end
    end
    func test_one()
      print("body")
    end
    func helper()
      print("helper")
    end
    main
    end
    "#};

    let (ast, stats) = weave(input);
    assert_eq!(stats.aspects_collected, 1);
    assert_eq!(stats.joinpoints_found, 1);
    assert_eq!(stats.advice_applied, 1);
    assert!(stats.error.is_none());

    insta::assert_snapshot!(pretty(&ast), @r#"
    Program
      FunctionDef test_one()
        Block
          Print
            Str "enter"
        Print
          Str "body"
      FunctionDef helper()
        Print
          Str "helper"
    "#);
}

#[test]
fn after_advice_splices_at_the_end() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice after trace
        print("exit")
      end
    end
    func test_one()
      print("body")
    end
    main
    end
    "#};

    let (ast, _) = weave(input);
    insta::assert_snapshot!(pretty(&ast), @r#"
    Program
      FunctionDef test_one()
        Print
          Str "body"
        Block
          Print
            Str "exit"
    "#);
}

#[test]
fn around_advice_applies_as_before() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice around trace
        print("around")
      end
    end
    func test_one()
      print("body")
    end
    main
    end
    "#};

    let (ast, stats) = weave(input);
    assert_eq!(stats.advice_applied, 1);
    insta::assert_snapshot!(pretty(&ast), @r#"
    Program
      FunctionDef test_one()
        Block
          Print
            Str "around"
        Print
          Str "body"
    "#);
}

#[test]
fn exact_pattern_matches_single_function() {
    let input = indoc! {r#"
    aspect pin
      pointcut only "helper"
      advice before only
        print("pinned")
      end
    end
    func helper()
      print("h")
    end
    func helper_two()
      print("h2")
    end
    main
    end
    "#};

    let (_, stats) = weave(input);
    assert_eq!(stats.joinpoints_found, 1);
    assert_eq!(stats.advice_applied, 1);
}

#[test]
fn one_pointcut_many_matches() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice before trace
        print("enter")
      end
    end
    func test_one()
      print(1)
    end
    func test_two()
      print(2)
    end
    main
    end
    "#};

    let (_, stats) = weave(input);
    assert_eq!(stats.joinpoints_found, 2);
    assert_eq!(stats.advice_applied, 2);
}

#[test]
fn weaving_removes_aspect_definitions() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice before trace
        print("enter")
      end
    end
    main
    end
    "#};

    let (ast, stats) = weave(input);
    assert_eq!(stats.aspects_collected, 1);
    insta::assert_snapshot!(pretty(&ast), @"Program");
}

#[test]
fn weaving_twice_is_idempotent() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice before trace
        print("enter")
      end
    end
    func test_one()
      print("body")
    end
    main
    end
    "#};

    let (mut once, _) = weave(input);
    let after_first = pretty(&once);

    let mut diag = Diagnostics::new();
    let mut second = Weaver::new();
    assert!(second.weave(&mut once, &mut diag));
    assert_eq!(second.stats().aspects_collected, 0);
    assert_eq!(second.stats().advice_applied, 0);
    assert_eq!(pretty(&once), after_first);
}

#[test]
fn aspects_nested_in_function_bodies_are_collected() {
    let input = indoc! {r#"
    func outer()
      aspect inner
        pointcut all "test_*"
        advice before all
          print("nested")
        end
      end
      print("outer")
    end
    func test_one()
      print(1)
    end
    main
    end
    "#};

    let (ast, stats) = weave(input);
    assert_eq!(stats.aspects_collected, 1);
    assert_eq!(stats.advice_applied, 1);

    insta::assert_snapshot!(pretty(&ast), @r#"
    Program
      FunctionDef outer()
        Print
          Str "outer"
      FunctionDef test_one()
        Block
          Print
            Str "nested"
        Print
          Number 1
    "#);
}

#[test]
fn advice_bodies_are_copied_not_shared() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice before trace
        print("enter")
      end
    end
    func test_one()
      print(1)
    end
    func test_two()
      print(2)
    end
    main
    end
    "#};

    let (mut ast, _) = weave(input);

    // Mutate the splice in test_one; test_two must be unaffected.
    let crate::ast::NodeKind::Program { body } = &mut ast.kind else {
        panic!("root must be a Program");
    };
    let crate::ast::NodeKind::FunctionDef { body: first, .. } = &mut body[0].kind else {
        panic!("expected FunctionDef");
    };
    first.remove(0);

    let crate::ast::NodeKind::FunctionDef { body: second, .. } = &body[1].kind else {
        panic!("expected FunctionDef");
    };
    assert_eq!(second.len(), 2, "test_two keeps its advice block");
}
