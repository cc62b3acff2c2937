//! Command-line definition and parameter extraction.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

/// Color output mode.
#[derive(Clone, Copy, Debug, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::io::IsTerminal::is_terminal(&std::io::stdout())
                    && std::io::IsTerminal::is_terminal(&std::io::stderr())
            }
        }
    }
}

pub fn build_cli() -> Command {
    Command::new("lyn")
        .about("Compiles Lyn source to C, then builds and runs it")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("source")
                .value_name("SOURCE")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Lyn source file"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .value_name("LEVEL")
                .default_value("0")
                .value_parser(value_parser!(u8).range(0..=3))
                .help("Debug verbosity (0-3): tokens, AST dumps, stats"),
        )
        .arg(
            Arg::new("optimize")
                .short('o')
                .long("optimize")
                .value_name("LEVEL")
                .default_value("1")
                .value_parser(value_parser!(u8).range(0..=2))
                .help("Optimization level (0-2)"),
        )
        .arg(
            Arg::new("propagate_constants")
                .long("propagate-constants")
                .action(ArgAction::SetTrue)
                .help("Enable constant propagation"),
        )
        .arg(
            Arg::new("cse")
                .long("cse")
                .action(ArgAction::SetTrue)
                .help("Enable common-subexpression detection"),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Write the generated C to PATH and stop"),
        )
        .arg(
            Arg::new("dump_ast")
                .long("dump-ast")
                .action(ArgAction::SetTrue)
                .help("Print the optimized AST and stop"),
        )
        .arg(
            Arg::new("cc")
                .long("cc")
                .value_name("PROG")
                .help("C compiler to invoke (default: $CC, then cc)"),
        )
        .arg(
            Arg::new("no_run")
                .long("no-run")
                .action(ArgAction::SetTrue)
                .help("Build the binary but do not run it"),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .value_name("WHEN")
                .default_value("auto")
                .value_parser(["auto", "always", "never"])
                .help("Colorize diagnostics"),
        )
}

/// Parameters for one compiler run.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub source: PathBuf,
    pub debug_level: u8,
    pub opt_level: u8,
    pub propagate_constants: bool,
    pub eliminate_common_subexprs: bool,
    pub emit: Option<PathBuf>,
    pub dump_ast: bool,
    pub cc: Option<String>,
    pub no_run: bool,
    pub color: ColorChoice,
}

impl RunParams {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let color = match matches.get_one::<String>("color").map(String::as_str) {
            Some("always") => ColorChoice::Always,
            Some("never") => ColorChoice::Never,
            _ => ColorChoice::Auto,
        };
        Self {
            source: matches
                .get_one::<PathBuf>("source")
                .expect("clap enforces the positional")
                .clone(),
            debug_level: *matches.get_one::<u8>("debug").expect("clap default"),
            opt_level: *matches.get_one::<u8>("optimize").expect("clap default"),
            propagate_constants: matches.get_flag("propagate_constants"),
            eliminate_common_subexprs: matches.get_flag("cse"),
            emit: matches.get_one::<PathBuf>("emit").cloned(),
            dump_ast: matches.get_flag("dump_ast"),
            cc: matches.get_one::<String>("cc").cloned(),
            no_run: matches.get_flag("no_run"),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RunParams {
        let matches = build_cli().try_get_matches_from(args).expect("valid args");
        RunParams::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let params = parse(&["lyn", "program.lyn"]);
        assert_eq!(params.source, PathBuf::from("program.lyn"));
        assert_eq!(params.debug_level, 0);
        assert_eq!(params.opt_level, 1);
        assert!(!params.propagate_constants);
        assert!(!params.no_run);
        assert!(params.emit.is_none());
    }

    #[test]
    fn levels_and_flags() {
        let params = parse(&[
            "lyn",
            "-d",
            "2",
            "-o",
            "2",
            "--propagate-constants",
            "--cse",
            "--no-run",
            "program.lyn",
        ]);
        assert_eq!(params.debug_level, 2);
        assert_eq!(params.opt_level, 2);
        assert!(params.propagate_constants);
        assert!(params.eliminate_common_subexprs);
        assert!(params.no_run);
    }

    #[test]
    fn emit_path() {
        let params = parse(&["lyn", "--emit", "out.c", "program.lyn"]);
        assert_eq!(params.emit, Some(PathBuf::from("out.c")));
    }

    #[test]
    fn source_is_required() {
        assert!(build_cli().try_get_matches_from(["lyn"]).is_err());
    }

    #[test]
    fn optimization_level_is_bounded() {
        assert!(build_cli().try_get_matches_from(["lyn", "-o", "7", "x.lyn"]).is_err());
    }
}
