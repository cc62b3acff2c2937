use indoc::indoc;

use crate::ast::{Node, pretty};
use crate::diagnostics::Diagnostics;
use crate::parser::parse;

use super::{OptLevel, OptimizeOptions, OptimizeStats, Optimizer};

fn level1(source: &str) -> (Node, OptimizeStats) {
    let mut diag = Diagnostics::new();
    let mut ast = parse(source, &mut diag).expect("test source must parse");
    let mut optimizer = Optimizer::new(
        OptimizeOptions {
            level: OptLevel::Basic,
            propagate_constants: false,
            eliminate_common_subexprs: false,
        },
        &mut diag,
    );
    optimizer.optimize(&mut ast);
    (ast, optimizer.stats())
}

#[test]
fn self_assignment_is_elided() {
    let input = indoc! {r#"
    main
      x = 5
      x = x
    end
    "#};

    let (ast, stats) = level1(input);
    assert_eq!(stats.redundant_assignments_removed, 1);

    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      VarAssign x
        Number 5
    ");
}

#[test]
fn distinct_assignment_is_kept() {
    let input = indoc! {r#"
    main
      x = 5
      y = x
    end
    "#};

    let (ast, stats) = level1(input);
    assert_eq!(stats.redundant_assignments_removed, 0);

    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      VarAssign x
        Number 5
      VarAssign y
        Ident x
    ");
}

#[test]
fn named_float_widening_special_case() {
    // Inherited by name from the reference compiler: this exact pair of
    // spellings is elided at Program scope.
    let input = indoc! {r#"
    main
      inferred_int = 10
      explicit_float = inferred_int
    end
    "#};

    let (ast, stats) = level1(input);
    assert_eq!(stats.redundant_assignments_removed, 1);

    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      VarAssign inferred_int
        Number 10
    ");
}

#[test]
fn elision_survives_constant_propagation() {
    // With propagation enabled, the self-assignment must be removed
    // before its right side is rewritten into a literal.
    let input = indoc! {r#"
    main
      x = 5
      x = x
    end
    "#};

    let mut diag = Diagnostics::new();
    let mut ast = parse(input, &mut diag).expect("test source must parse");
    let mut optimizer = Optimizer::new(
        OptimizeOptions {
            level: OptLevel::Basic,
            propagate_constants: true,
            eliminate_common_subexprs: false,
        },
        &mut diag,
    );
    optimizer.optimize(&mut ast);

    assert_eq!(optimizer.stats().redundant_assignments_removed, 1);
    insta::assert_snapshot!(pretty(&ast), @r"
    Program
      VarAssign x
        Number 5
    ");
}

#[test]
fn only_program_scope_is_scanned() {
    let input = indoc! {r#"
    func f()
      x = x
    end
    main
    end
    "#};

    let (_, stats) = level1(input);
    assert_eq!(stats.redundant_assignments_removed, 0);
}

#[test]
fn self_assignment_with_computation_is_kept() {
    let input = indoc! {r#"
    main
      x = 5
      x = x + 0
    end
    "#};

    let (_, stats) = level1(input);
    assert_eq!(stats.redundant_assignments_removed, 0);
}
