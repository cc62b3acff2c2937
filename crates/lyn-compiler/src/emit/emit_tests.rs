use indoc::indoc;

use crate::compile::{CompileOptions, compile};
use crate::diagnostics::Diagnostics;

fn emit(source: &str) -> String {
    let output = compile(source, &CompileOptions::default()).expect("test source must compile");
    assert!(
        !output.diagnostics().has_errors(),
        "unexpected errors:\n{}",
        output.diagnostics().printer().source(source).render()
    );
    output.c_source().to_string()
}

fn emit_with(source: &str, options: &CompileOptions) -> (String, Diagnostics) {
    let output = compile(source, options).expect("test source must compile");
    (output.c_source().to_string(), output.diagnostics().clone())
}

#[test]
fn folded_arithmetic_prints_through_the_prelude() {
    let input = indoc! {r#"
    main
      print(10 + 5)
      print(3.14 * 2)
    end
    "#};

    insta::assert_snapshot!(emit(input), @r#"
    /* Generated by the Lyn compiler. */
    #include <stdbool.h>
    #include <stdio.h>
    #include <stdlib.h>
    #include <string.h>

    static bool lyn_error_pending = false;
    static const char *lyn_error_message = "";

    static void lyn_throw(const char *message) {
        lyn_error_pending = true;
        lyn_error_message = message;
    }

    int main(void) {
        printf("%ld\n", (long)(15));
        printf("%g\n", (double)(6.28));
        return 0;
    }
    "#);
}

#[test]
fn functions_get_prototypes_and_definitions() {
    let input = indoc! {r#"
    func add(a: int, b: int) -> int
      return a + b
    end
    main
      print(add(2, 3))
    end
    "#};

    let c = emit(input);
    assert!(c.contains("static double add(double a, double b);"));
    assert!(c.contains("static double add(double a, double b) {"));
    assert!(c.contains("return ((a) + (b));"));
    assert!(c.contains("printf(\"%ld\\n\", (long)(add(2, 3)));"));
}

#[test]
fn classes_emit_structs_methods_and_constructors() {
    let input = indoc! {r#"
    class Point
      func init(self, x, y)
        self.x = x
        self.y = y
      end
      func sum(self)
        return self.x + self.y
      end
    end
    main
      p = new Point(3, 4)
      print(p.sum())
    end
    "#};

    let c = emit(input);
    assert!(c.contains("struct Point {"));
    assert!(c.contains("double x;"));
    assert!(c.contains("double y;"));
    assert!(c.contains("static void Point_init(struct Point *self, double x, double y)"));
    assert!(c.contains("self->x = x;"));
    assert!(c.contains("static struct Point *Point_new(double a0, double a1)"));
    assert!(c.contains("Point_init(self, a0, a1);"));
    assert!(c.contains("struct Point *p = Point_new(3, 4);"));
    assert!(c.contains("Point_sum(p)"));
}

#[test]
fn control_flow_lowers_to_c_loops() {
    let input = indoc! {r#"
    main
      x = 0
      while x < 3
        x = x + 1
      end
      for i in range(0, 10, 2)
        print(i)
      end
    end
    "#};

    let c = emit(input);
    assert!(c.contains("double x = 0;"));
    assert!(c.contains("while (((x) < (3))) {"));
    assert!(c.contains("x = ((x) + (1));"));
    assert!(c.contains("for (double i = 0; i < 10; i += 2) {"));
}

#[test]
fn strings_and_booleans_print_with_matching_formats() {
    let input = indoc! {r#"
    main
      s = "hello"
      print(s)
      b = true
      print(b)
    end
    "#};

    let c = emit(input);
    assert!(c.contains("const char *s = \"hello\";"));
    assert!(c.contains("printf(\"%s\\n\", s);"));
    assert!(c.contains("bool b = true;"));
    assert!(c.contains("printf(\"%s\\n\", (b) ? \"true\" : \"false\");"));
}

#[test]
fn lambdas_hoist_to_static_functions() {
    let input = indoc! {r#"
    main
      inc = (x: int) -> int => x + 1
    end
    "#};

    let c = emit(input);
    assert!(c.contains("static double lyn_lambda_0(double x) {"));
    assert!(c.contains("return ((x) + (1));"));
}

#[test]
fn composition_hoists_a_wrapper() {
    let input = indoc! {r#"
    func double_it(x)
      return x * 2
    end
    func inc(x)
      return x + 1
    end
    main
      both = double_it >> inc
    end
    "#};

    let c = emit(input);
    assert!(c.contains("static double lyn_compose_0(double x) {"));
    assert!(c.contains("return inc(double_it(x));"));
}

#[test]
fn fully_applied_curry_flattens_to_a_call() {
    let input = indoc! {r#"
    func add3(a, b, c)
      return a + b + c
    end
    main
      print(add3(1)(2)(3))
    end
    "#};

    let c = emit(input);
    assert!(c.contains("add3(1, 2, 3)"));
}

#[test]
fn partial_curry_warns_at_emission() {
    let input = indoc! {r#"
    func add3(a, b, c)
      return a + b + c
    end
    main
      partial = add3(1)(2)
    end
    "#};

    let (c, diag) = emit_with(input, &CompileOptions::default());
    assert!(diag.has_warnings());
    assert!(
        diag.iter()
            .any(|d| d.message().contains("partially applied call of `add3`"))
    );
    assert!(c.contains("double partial = 0;"));
}

#[test]
fn switch_lowers_to_an_if_chain() {
    let input = indoc! {r#"
    main
      x = 2
      switch x
      case 1
        print("one")
      case 2
        print("two")
      default
        print("many")
      end
    end
    "#};

    let c = emit(input);
    assert!(c.contains("if (((x) == (1))) {"));
    assert!(c.contains("} else if (((x) == (2))) {"));
    assert!(c.contains("} else {"));
    assert!(!c.contains("while (0)"));
}

#[test]
fn continue_in_a_switch_case_binds_to_the_enclosing_loop() {
    // The switch lowering must not introduce a wrapper statement that
    // `continue` would bind to instead of the real loop.
    let input = indoc! {r#"
    main
      x = 0
      while x < 5
        x = x + 1
        switch x
        case 1
          continue
        default
          print(x)
        end
      end
    end
    "#};

    let c = emit(input);
    assert!(c.contains("continue;"));
    assert!(c.contains("if (((x) == (1))) {"));
    assert!(c.contains("} else {"));
    assert!(!c.contains("do {"));
    assert!(!c.contains("while (0)"));
}

#[test]
fn match_lowers_to_an_if_chain() {
    let input = indoc! {r#"
    main
      x = 2
      match x
      when 1 => print("one")
      otherwise => print("other")
      end
    end
    "#};

    let c = emit(input);
    assert!(c.contains("if (((x) == (1))) {"));
    assert!(c.contains("} else {"));
}

#[test]
fn string_patterns_compare_with_strcmp() {
    let input = indoc! {r#"
    main
      s = "b"
      match s
      when "a" => print(1)
      otherwise => print(2)
      end
    end
    "#};

    let c = emit(input);
    assert!(c.contains("strcmp(s, \"a\") == 0"));
}

#[test]
fn try_catch_lowers_to_error_flag_and_labels() {
    let input = indoc! {r#"
    main
      try
        throw "boom"
      catch (e)
        print(e)
      finally
        print("done")
      end
    end
    "#};

    let c = emit(input);
    assert!(c.contains("lyn_throw(\"boom\");"));
    assert!(c.contains("goto lyn_catch_1;"));
    assert!(c.contains("lyn_catch_1:;"));
    assert!(c.contains("const char *e = lyn_error_message;"));
    assert!(c.contains("lyn_finally_1:;"));
}

#[test]
fn arrays_emit_as_c_arrays() {
    let input = indoc! {r#"
    main
      xs = [1, 2, 3]
      print(xs[1])
    end
    "#};

    let c = emit(input);
    assert!(c.contains("double xs[] = {1, 2, 3};"));
    assert!(c.contains("xs[(size_t)(1)]"));
}

#[test]
fn emitted_tree_contains_no_macro_or_aspect_definitions() {
    let input = indoc! {r#"
    aspect tracing
      pointcut trace "work_*"
      advice before trace
        print("enter")
      end
    end
    func macro_twice(x)
      print(x)
      print(x)
    end
    func work_hard()
      macro_twice(1)
    end
    main
      work_hard()
    end
    "#};

    let (c, diag) = emit_with(input, &CompileOptions::default());
    assert!(!diag.has_errors());
    assert!(!c.contains("macro_twice"));
    assert!(!c.contains("aspect"));
    assert!(c.contains("printf(\"%s\\n\", \"enter\");"));
}
