use indoc::indoc;

use super::helpers::snapshot;

#[test]
fn if_else_blocks_close_with_end() {
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

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign a
        Number 1
      If
        cond:
          Ident a
        then:
          Print
            Number 1
        else:
          Print
            Number 2
    ");
}

#[test]
fn if_without_else() {
    let input = indoc! {r#"
    main
      if x > 5
        print(x)
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      If
        cond:
          Binary >
            Ident x
            Number 5
        then:
          Print
            Ident x
    ");
}

#[test]
fn while_loop() {
    let input = indoc! {r#"
    main
      while x < 10
        x = x + 1
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      While
        cond:
          Binary <
            Ident x
            Number 10
        body:
          VarAssign x
            Binary +
              Ident x
              Number 1
    ");
}

#[test]
fn do_while_loop() {
    let input = indoc! {r#"
    main
      do
        x = x + 1
      while x < 3
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      DoWhile
        body:
          VarAssign x
            Binary +
              Ident x
              Number 1
        cond:
          Binary <
            Ident x
            Number 3
    ");
}

#[test]
fn for_over_range_with_step() {
    let input = indoc! {r#"
    main
      for i in range(0, 10, 2)
        print(i)
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      ForRange i
        from:
          Number 0
        to:
          Number 10
        step:
          Number 2
        body:
          Print
            Ident i
    ");
}

#[test]
fn for_over_dotted_range() {
    let input = indoc! {r#"
    main
      for i in 1..5
        print(i)
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      ForRange i
        from:
          Number 1
        to:
          Number 5
        body:
          Print
            Ident i
    ");
}

#[test]
fn for_over_collection() {
    let input = indoc! {r#"
    main
      for item in items
        print(item)
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      ForEach item
        in:
          Ident items
        body:
          Print
            Ident item
    ");
}

#[test]
fn c_style_for() {
    let input = indoc! {r#"
    main
      for (i = 0; i < 3; i = i + 1)
        print(i)
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      ForC
        init:
          VarAssign i
            Number 0
        cond:
          Binary <
            Ident i
            Number 3
        update:
          VarAssign i
            Binary +
              Ident i
              Number 1
        body:
          Print
            Ident i
    ");
}

#[test]
fn switch_with_cases_and_default() {
    let input = indoc! {r#"
    main
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

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      Switch
        scrutinee:
          Ident x
        Case
          value:
            Number 1
          body:
            Print
              Str "one"
        Case
          value:
            Number 2
          body:
            Print
              Str "two"
        default:
          Print
            Str "many"
    "#);
}

#[test]
fn try_catch_finally() {
    let input = indoc! {r#"
    main
      try
        risky()
      catch (Error e)
        print("caught")
      finally
        print("done")
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      TryCatch
        try:
          Call risky
        catch Error e:
          Print
            Str "caught"
        finally:
          Print
            Str "done"
    "#);
}

#[test]
fn try_catch_binding_name_only() {
    let input = indoc! {r#"
    main
      try
        risky()
      catch (e)
        print(e)
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      TryCatch
        try:
          Call risky
        catch e:
          Print
            Ident e
    ");
}

#[test]
fn throw_statement() {
    let input = indoc! {r#"
    main
      throw "boom"
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      Throw
        Str "boom"
    "#);
}

#[test]
fn break_and_continue() {
    let input = indoc! {r#"
    main
      while true
        break
        continue
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      While
        cond:
          Bool true
        body:
          Break
          Continue
    ");
}

#[test]
fn match_with_patterns_and_otherwise() {
    let input = indoc! {r#"
    main
      match x
      when 1 => print("one")
      when 2 => print("two")
      otherwise => print("other")
      end
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      Match
        scrutinee:
          Ident x
        MatchCase
          pattern:
            Number 1
          body:
            Print
              Str "one"
        MatchCase
          pattern:
            Number 2
          body:
            Print
              Str "two"
        otherwise:
          Print
            Str "other"
    "#);
}

#[test]
fn var_decl_with_type_and_init() {
    let input = indoc! {r#"
    main
      count : int = 0
      name : str = "lyn"
      ratio : float
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      VarDecl count: int
        Number 0
      VarDecl name: str
        Str "lyn"
      VarDecl ratio: float
    "#);
}

#[test]
fn semicolons_separate_statements() {
    let input = indoc! {r#"
    main
      a = 1; b = 2;
      print(a + b)
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r"
    Program
      VarAssign a
        Number 1
      VarAssign b
        Number 2
      Print
        Binary +
          Ident a
          Ident b
    ");
}

#[test]
fn ui_statements_parse_as_calls() {
    let input = indoc! {r#"
    main
      ui("panel")
      css("body { }")
      register_event("click", handler)
    end
    "#};

    insta::assert_snapshot!(snapshot(input), @r#"
    Program
      Call ui
        Str "panel"
      Call css
        Str "body { }"
      Call register_event
        Str "click"
        Ident handler
    "#);
}
