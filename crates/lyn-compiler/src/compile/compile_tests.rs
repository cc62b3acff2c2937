use indoc::indoc;

use crate::CompileOptions;
use crate::compile::{Compilation, compile};

#[test]
fn full_pipeline_produces_c_and_stats() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "test_*"
      advice before trace
        print("enter")
      end
    end
    func macro_hello()
      print("hello")
    end
    func test_one()
      macro_hello()
    end
    main
      test_one()
      print(2 + 3)
    end
    "#};

    let output = compile(input, &CompileOptions::default()).expect("pipeline must succeed");

    assert_eq!(output.weave_stats().aspects_collected, 1);
    assert_eq!(output.weave_stats().advice_applied, 1);
    assert_eq!(output.expand_stats().macros_registered, 1);
    assert_eq!(output.expand_stats().calls_expanded, 1);
    assert_eq!(output.optimize_stats().constants_folded, 1);
    assert!(output.tree_stats().nodes > 0);
    assert!(output.c_source().contains("int main(void)"));
}

#[test]
fn parse_failure_returns_the_diagnostics() {
    let err = Compilation::parse("main\n  x =\nend\n").expect_err("must fail");
    let crate::Error::Syntax { diagnostics } = err;
    assert!(diagnostics.has_errors());
}

#[test]
fn stages_can_be_driven_one_at_a_time() {
    let input = indoc! {r#"
    main
      a = 1
      if (a)
        print(1)
      else
        print(2)
      end
    end
    "#};

    let parsed = Compilation::parse(input).expect("parses");
    let woven = parsed.weave();
    assert_eq!(woven.weave_stats().aspects_collected, 0);

    let expanded = woven.expand();
    assert_eq!(expanded.expand_stats().macros_registered, 0);

    let typed = expanded.infer();
    assert!(!typed.diagnostics().has_errors());

    let optimized = typed.optimize(&CompileOptions {
        opt_level: 2,
        propagate_constants: true,
        ..Default::default()
    });
    assert_eq!(optimized.optimize_stats().constants_propagated, 1);
    assert_eq!(optimized.optimize_stats().dead_blocks_removed, 1);

    let output = optimized.emit();
    assert!(output.c_source().contains("printf"));
    assert!(!output.c_source().contains("else"));
}

#[test]
fn level_zero_pipeline_keeps_the_tree() {
    let input = indoc! {r#"
    main
      print(10 + 5)
    end
    "#};

    let output = compile(
        input,
        &CompileOptions {
            opt_level: 0,
            ..Default::default()
        },
    )
    .expect("pipeline must succeed");

    assert_eq!(output.optimize_stats().total(), 0);
    assert!(output.c_source().contains("((10) + (5))"));
}

#[test]
fn pretty_ast_is_available_at_every_stage() {
    let parsed = Compilation::parse("main\n  print(1)\nend\n").expect("parses");
    assert!(parsed.pretty_ast().starts_with("Program"));
    let woven = parsed.weave();
    assert!(woven.pretty_ast().contains("Print"));
}
