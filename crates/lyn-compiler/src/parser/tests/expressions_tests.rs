use indoc::indoc;

use super::helpers::snapshot;

#[test]
fn arithmetic_and_printing() {
    let input = indoc! {r#"
    main
      print(10 + 5)
      print(3.14 * 2)
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
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
}

#[test]
fn multiplicative_binds_tighter_than_additive() {
    let input = indoc! {r#"
    main
      x = 1 + 2 * 3
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign x
        Binary +
          Number 1
          Binary *
            Number 2
            Number 3
    ");
}

#[test]
fn additive_comparison_logical_share_one_tier() {
    let input = indoc! {r#"
    main
      b = 1 + 2 > 2 and 1
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign b
        Binary and
          Binary >
            Binary +
              Number 1
              Number 2
            Number 2
          Number 1
    ");
}

#[test]
fn parenthesized_grouping() {
    let input = indoc! {r#"
    main
      y = (a + b) * 2
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign y
        Binary *
          Binary +
            Ident a
            Ident b
          Number 2
    ");
}

#[test]
fn unary_not_and_negation() {
    let input = indoc! {r#"
    main
      a = not done
      b = -5
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign a
        Unary not
          Ident done
      VarAssign b
        Unary -
          Number 5
    ");
}

#[test]
fn postfix_chain_member_call_index() {
    let input = indoc! {r#"
    main
      v = table[2].field
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign v
        Member .field
          Index
            Ident table
            Number 2
    ");
}

#[test]
fn array_literal() {
    let input = indoc! {r#"
    main
      xs = [1, 2, 3]
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign xs
        ArrayLit
          Number 1
          Number 2
          Number 3
    ");
}

#[test]
fn receiver_threading_uses_static_class() {
    // A variable bound by `new` carries its class; method calls on it
    // rewrite to `Class.method` with the receiver as first argument.
    let input = indoc! {r#"
    class Point
      func init(self, x, y)
        self.x = x
        self.y = y
      end
    end
    main
      p = new Point(3, 4)
      print(p.distance(p))
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      ClassDef Point
        FunctionDef init(self, x, y)
          MemberAssign .x
            object:
              Ident self
            value:
              Ident x
          MemberAssign .y
            object:
              Ident self
            value:
              Ident y
      VarAssign p
        New Point
          Number 3
          Number 4
      Print
        Call Point.distance
          Ident p
          Ident p
    ");
}

#[test]
fn unknown_receiver_keeps_qualified_name() {
    let input = indoc! {r#"
    main
      import math_lib as m
      x = m.add(2, 3)
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      Import math_lib as m
      VarAssign x
        Call m.add
          Number 2
          Number 3
    ");
}

#[test]
fn lambda_with_types_and_fat_arrow() {
    let input = indoc! {r#"
    main
      f = (x: int) -> int => x + 1
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign f
        Lambda (x: int) -> int
          Binary +
            Ident x
            Number 1
    ");
}

#[test]
fn lambda_with_brace_body() {
    let input = indoc! {r#"
    main
      g = (a: float, b: float) -> float { a * b }
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign g
        Lambda (a: float, b: float) -> float
          Binary *
            Ident a
            Ident b
    ");
}

#[test]
fn parenthesized_identifier_is_not_a_lambda() {
    // The speculative scan must rewind: `(a)` followed by `*` is grouping.
    let input = indoc! {r#"
    main
      z = (a) * 2
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign z
        Binary *
          Ident a
          Number 2
    ");
}

#[test]
fn untyped_lambda_single_param() {
    let input = indoc! {r#"
    main
      id = (x) => x
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign id
        Lambda (x)
          Ident x
    ");
}

#[test]
fn curry_folds_successive_argument_groups() {
    let input = indoc! {r#"
    main
      h = add(1)(2)
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign h
        Curry add [2/?]
          Number 1
          Number 2
    ");
}

#[test]
fn curry_folds_three_groups() {
    let input = indoc! {r#"
    main
      h = volume(2)(3)(4)
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign h
        Curry volume [3/?]
          Number 2
          Number 3
          Number 4
    ");
}

#[test]
fn compose_chains_left_associatively() {
    let input = indoc! {r#"
    main
      c = f >> g >> h
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign c
        Compose
          Compose
            Ident f
            Ident g
          Ident h
    ");
}

#[test]
fn new_and_this() {
    let input = indoc! {r#"
    class Box
      func get(self)
        return this
      end
    end
    main
      b = new Box()
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      ClassDef Box
        FunctionDef get(self)
          Return
            This
      VarAssign b
        New Box
    ");
}

#[test]
fn string_and_boolean_literals() {
    let input = indoc! {r#"
    main
      s = "hello"
      t = true
      f = false
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      VarAssign s
        Str "hello"
      VarAssign t
        Bool true
      VarAssign f
        Bool false
    "#);
}
