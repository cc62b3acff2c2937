use std::fs;

use crate::cli::{ColorChoice, RunParams};
use crate::driver::run;

fn params_for(source: &std::path::Path) -> RunParams {
    RunParams {
        source: source.to_path_buf(),
        debug_level: 0,
        opt_level: 1,
        propagate_constants: false,
        eliminate_common_subexprs: false,
        emit: None,
        dump_ast: false,
        cc: None,
        no_run: false,
        color: ColorChoice::Never,
    }
}

#[test]
fn emit_writes_the_c_file_and_stops() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_path = dir.path().join("hello.lyn");
    fs::write(&source_path, "main\n  print(10 + 5)\nend\n").expect("write source");
    let out_path = dir.path().join("hello.c");

    let mut params = params_for(&source_path);
    params.emit = Some(out_path.clone());

    assert_eq!(run(&params), 0);
    let c = fs::read_to_string(&out_path).expect("emitted C exists");
    assert!(c.contains("int main(void)"));
    assert!(c.contains("printf(\"%ld\\n\", (long)(15));"));
}

#[test]
fn missing_file_is_an_io_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let params = params_for(&dir.path().join("absent.lyn"));
    assert_eq!(run(&params), 1);
}

#[test]
fn empty_file_is_an_io_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_path = dir.path().join("empty.lyn");
    fs::write(&source_path, "  \n").expect("write source");
    assert_eq!(run(&params_for(&source_path)), 1);
}

#[test]
fn syntax_errors_exit_nonzero() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_path = dir.path().join("bad.lyn");
    fs::write(&source_path, "main\n  x =\nend\n").expect("write source");

    let mut params = params_for(&source_path);
    params.emit = Some(dir.path().join("bad.c"));
    assert_eq!(run(&params), 1);
}

#[test]
fn dump_ast_short_circuits_the_build() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source_path = dir.path().join("dump.lyn");
    fs::write(&source_path, "main\n  print(1)\nend\n").expect("write source");

    let mut params = params_for(&source_path);
    params.dump_ast = true;
    assert_eq!(run(&params), 0);
}
