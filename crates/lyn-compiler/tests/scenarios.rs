//! End-to-end pipeline scenarios through the public API.

use indoc::indoc;

use lyn_compiler::{CompileOptions, Compilation, compile};

fn options(opt_level: u8) -> CompileOptions {
    CompileOptions {
        opt_level,
        ..Default::default()
    }
}

#[test]
fn arithmetic_and_printing() {
    let input = indoc! {r#"
    main
      print(10 + 5)
      print(3.14 * 2)
    end
    "#};

    let parsed = Compilation::parse(input).expect("parses");
    insta::assert_snapshot!(parsed.pretty_ast(), @r"
    Program
      Print
        Binary +
          Number 10
          Number 5
      Print
        Binary *
          Number 3.14
          Number 2
    ");

    let output = compile(input, &options(1)).expect("compiles");
    assert_eq!(output.optimize_stats().constants_folded, 2);
    assert!(output.c_source().contains("printf(\"%ld\\n\", (long)(15));"));
    assert!(output.c_source().contains("printf(\"%g\\n\", (double)(6.28));"));
}

#[test]
fn import_forms() {
    let input = indoc! {r#"
    main
      import math_lib
      import math_lib as m
      from math_lib import subtract, divide
      from math_lib import add as suma, multiply as producto
    end
    "#};

    let parsed = Compilation::parse(input).expect("parses");
    insta::assert_snapshot!(parsed.pretty_ast(), @r"
    Program
      Import math_lib
      Import math_lib as m
      Import math_lib { subtract, divide }
      Import math_lib { add as suma, multiply as producto }
    ");
}

#[test]
fn method_calls_thread_the_receiver() {
    let input = indoc! {r#"
    class Point
      func init(self, x, y)
        self.x = x
        self.y = y
      end
      func distance(self, other)
        return self.x - other.x
      end
    end
    main
      p = new Point(3, 4)
      print(p.distance(p))
    end
    "#};

    let parsed = Compilation::parse(input).expect("parses");
    assert!(parsed.pretty_ast().contains("Call Point.distance"));

    let output = compile(input, &options(1)).expect("compiles");
    assert!(!output.diagnostics().has_errors());
    assert!(output.c_source().contains("Point_distance(p, p)"));
}

#[test]
fn aspect_weaving_with_prefix_glob() {
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
      test_one()
      helper()
    end
    "#};

    let woven = Compilation::parse(input).expect("parses").weave();
    assert_eq!(woven.weave_stats().joinpoints_found, 1);
    assert_eq!(woven.weave_stats().advice_applied, 1);
    assert!(woven.weave_stats().error.is_none());

    // test_one begins with the advice block; helper is untouched.
    insta::assert_snapshot!(woven.pretty_ast(), @r#"
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
      Call test_one
      Call helper
    "#);
}

#[test]
fn constant_propagation_plus_dead_code() {
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

    let output = compile(
        input,
        &CompileOptions {
            opt_level: 2,
            propagate_constants: true,
            ..Default::default()
        },
    )
    .expect("compiles");

    let stats = output.optimize_stats();
    assert_eq!(stats.constants_propagated, 1);
    assert_eq!(stats.dead_blocks_removed, 1);
    assert!(stats.variables_scoped >= 1);

    insta::assert_snapshot!(output.pretty_ast(), @r"
    Program
      VarAssign a :: int
        Number 1 :: int
      Print
        Number 1 :: int
    ");
}

#[test]
fn self_assignment_elision() {
    let input = indoc! {r#"
    main
      x = 5
      x = x
    end
    "#};

    let output = compile(input, &options(1)).expect("compiles");
    assert_eq!(output.optimize_stats().redundant_assignments_removed, 1);

    // The elision also holds when constant propagation is on.
    let output = compile(
        input,
        &CompileOptions {
            opt_level: 1,
            propagate_constants: true,
            ..Default::default()
        },
    )
    .expect("compiles");
    assert_eq!(output.optimize_stats().redundant_assignments_removed, 1);
}

#[test]
fn weaving_twice_changes_nothing() {
    use lyn_compiler::Diagnostics;
    use lyn_compiler::ast::pretty;
    use lyn_compiler::weave::Weaver;

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
    main
    end
    "#};

    let mut diag = Diagnostics::new();
    let mut ast = lyn_compiler::parser::parse(input, &mut diag).expect("parses");

    let mut first = Weaver::new();
    assert!(first.weave(&mut ast, &mut diag));
    let after_first = pretty(&ast);

    let mut second = Weaver::new();
    assert!(second.weave(&mut ast, &mut diag));
    assert_eq!(second.stats().aspects_collected, 0);
    assert_eq!(pretty(&ast), after_first);
}

#[test]
fn kitchen_sink_program_compiles_cleanly() {
    let input = indoc! {r#"
    func macro_log(msg)
      print(msg)
    end
    aspect audit
      pointcut entry "compute_*"
      advice before entry
        print("begin")
      end
      advice after entry
        print("finish")
      end
    end
    class Counter
      func init(self, start)
        self.value = start
      end
      func bump(self, amount)
        self.value = self.value + amount
        return self.value
      end
    end
    func compute_total(limit)
      total = 0
      for i in range(0, limit)
        total = total + i
      end
      return total
    end
    main
      macro_log("starting")
      c = new Counter(10)
      print(c.bump(5))
      print(compute_total(4))
      xs = [1, 2, 3]
      for x in xs
        print(x)
      end
      s = "lyn"
      match s
      when "lyn" => print(1)
      otherwise => print(0)
      end
      try
        throw "oops"
      catch (e)
        print(e)
      finally
        print("done")
      end
    end
    "#};

    // Level 1: dead-code elimination would drop the after-advice block
    // that weaving appends behind `return` in compute_total.
    let output = compile(input, &options(1)).expect("compiles");
    assert!(!output.diagnostics().has_errors());

    let c = output.c_source();
    assert!(c.contains("struct Counter"));
    assert!(c.contains("Counter_bump"));
    assert!(c.contains("compute_total"));
    assert!(c.contains("printf(\"%s\\n\", \"begin\");"));
    assert!(c.contains("printf(\"%s\\n\", \"finish\");"));
    assert!(c.contains("printf(\"%s\\n\", \"starting\");"));
    assert!(c.contains("lyn_throw(\"oops\");"));
    assert!(c.contains("int main(void)"));

    // Compile-time-only constructs must not survive to the C text.
    assert!(!c.contains("macro_log"));
    assert!(!c.contains("aspect"));
    assert!(!c.contains("pointcut"));
}

#[test]
fn lexical_errors_abort_before_any_pass_runs() {
    let err = Compilation::parse("main\n  s = \"open\nend\n").expect_err("must fail");
    assert!(err.diagnostics().has_errors());
    let first = err.diagnostics().first_error().expect("error recorded");
    assert_eq!(first.message(), "unterminated string literal");
}

#[test]
fn tree_statistics_are_reported() {
    let output = compile("main\n  print(1 + 2)\nend\n", &options(0)).expect("compiles");
    let stats = output.tree_stats();
    assert_eq!(stats.nodes, 5);
    assert_eq!(stats.max_depth, 4);
    assert!(stats.bytes > 0);
}
