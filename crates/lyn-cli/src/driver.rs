//! Pipeline driver: file I/O, stage dumps, C compiler hand-off.

use std::fs;
use std::path::Path;
use std::process::Command;

use lyn_compiler::{Compilation, CompileOptions, Output};
use lyn_core::Source;

use crate::cli::RunParams;

/// Run one compilation per the CLI parameters. Returns the process exit
/// code: 0 on success, 1 on any fatal failure, otherwise the compiled
/// program's own status.
pub fn run(params: &RunParams) -> i32 {
    let source = match read_source(&params.source) {
        Ok(source) => source,
        Err(message) => {
            eprintln!("error [driver/io]: {message}");
            return 1;
        }
    };

    let parsed = match Compilation::parse(source.text()) {
        Ok(parsed) => parsed,
        Err(error) => {
            let rendered = error
                .diagnostics()
                .printer()
                .source(source.text())
                .path(source.name())
                .colored(params.color.should_colorize())
                .render();
            eprintln!("{rendered}");
            return 1;
        }
    };

    if params.debug_level >= 2 {
        eprintln!("== parsed AST ==\n{}", parsed.pretty_ast());
    }

    let options = CompileOptions {
        opt_level: params.opt_level,
        debug_level: params.debug_level,
        propagate_constants: params.propagate_constants,
        eliminate_common_subexprs: params.eliminate_common_subexprs,
    };

    let woven = parsed.weave();
    if params.debug_level >= 3 {
        eprintln!("== woven AST ==\n{}", woven.pretty_ast());
    }
    let output = woven.expand().infer().optimize(&options).emit();

    report(&source, &output, params);
    if output.diagnostics().has_errors() {
        return 1;
    }

    if params.dump_ast {
        println!("{}", output.pretty_ast());
        return 0;
    }

    if let Some(emit_path) = &params.emit {
        if let Err(error) = fs::write(emit_path, output.c_source()) {
            eprintln!("error [driver/io]: cannot write {}: {error}", emit_path.display());
            return 1;
        }
        if params.debug_level >= 1 {
            eprintln!("wrote {}", emit_path.display());
        }
        return 0;
    }

    build_and_run(&source, &output, params)
}

fn read_source(path: &Path) -> Result<Source, String> {
    let text = fs::read_to_string(path)
        .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
    if text.trim().is_empty() {
        return Err(format!("{} is empty", path.display()));
    }
    Ok(Source::new(path.display().to_string(), text))
}

fn report(source: &Source, output: &Output, params: &RunParams) {
    if !output.diagnostics().is_empty() {
        let rendered = output
            .diagnostics()
            .printer()
            .source(source.text())
            .path(source.name())
            .colored(params.color.should_colorize())
            .render();
        eprintln!("{rendered}");
    }

    if params.debug_level >= 1 {
        let weave = output.weave_stats();
        let expand = output.expand_stats();
        let optimize = output.optimize_stats();
        let tree = output.tree_stats();
        eprintln!(
            "aspects: {} collected, {} joinpoints, {} advice applied",
            weave.aspects_collected, weave.joinpoints_found, weave.advice_applied
        );
        eprintln!(
            "macros: {} registered, {} calls expanded",
            expand.macros_registered, expand.calls_expanded
        );
        eprintln!(
            "optimizer: {} folded, {} dead blocks, {} redundant, {} propagated, {} cse, {} scoped ({} total)",
            optimize.constants_folded,
            optimize.dead_blocks_removed,
            optimize.redundant_assignments_removed,
            optimize.constants_propagated,
            optimize.common_subexprs_eliminated,
            optimize.variables_scoped,
            optimize.total()
        );
        eprintln!(
            "tree: {} nodes, depth {}, ~{} bytes",
            tree.nodes, tree.max_depth, tree.bytes
        );
    }
}

fn build_and_run(source: &Source, output: &Output, params: &RunParams) -> i32 {
    let work_dir = match tempdir() {
        Ok(dir) => dir,
        Err(error) => {
            eprintln!("error [driver/io]: cannot create build directory: {error}");
            return 1;
        }
    };

    let stem = Path::new(source.name())
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("program");
    let c_path = work_dir.join(format!("{stem}.c"));
    let bin_path = work_dir.join(stem);

    if let Err(error) = fs::write(&c_path, output.c_source()) {
        eprintln!("error [driver/io]: cannot write {}: {error}", c_path.display());
        return 1;
    }

    let compiler = params
        .cc
        .clone()
        .or_else(|| std::env::var("CC").ok())
        .unwrap_or_else(|| "cc".to_string());

    let status = Command::new(&compiler)
        .arg(&c_path)
        .arg("-o")
        .arg(&bin_path)
        .arg("-lm")
        .status();
    match status {
        Ok(status) if status.success() => {}
        Ok(status) => {
            eprintln!("error [driver/runtime]: {compiler} exited with {status}");
            return 1;
        }
        Err(error) => {
            eprintln!("error [driver/runtime]: cannot invoke {compiler}: {error}");
            return 1;
        }
    }

    if params.no_run {
        if params.debug_level >= 1 {
            eprintln!("built {}", bin_path.display());
        }
        return 0;
    }

    match Command::new(&bin_path).status() {
        Ok(status) => status.code().unwrap_or(1),
        Err(error) => {
            eprintln!(
                "error [driver/runtime]: cannot run {}: {error}",
                bin_path.display()
            );
            1
        }
    }
}

/// Unique scratch directory under the system temp dir.
fn tempdir() -> std::io::Result<std::path::PathBuf> {
    let base = std::env::temp_dir();
    let unique = format!(
        "lyn-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    );
    let dir = base.join(unique);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
