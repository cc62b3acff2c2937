//! Staged compilation driver.
//!
//! One compilation is a chain of consuming stages, each exclusively owning
//! the AST:
//!
//! ```text
//! Compilation::parse → Parsed.weave() → Woven.expand() → Expanded.infer()
//!     → Typed.optimize(..) → Optimized.emit() → Output
//! ```
//!
//! Diagnostics accumulate across the chain in one collection; only parse
//! (and lex, inside it) can fail the chain. Everything later reports and
//! continues, leaving the exit decision to the caller.

#[cfg(test)]
mod compile_tests;

use crate::analyze::Inferencer;
use crate::ast::{Node, TreeStats, pretty};
use crate::diagnostics::Diagnostics;
use crate::emit::emit_c;
use crate::expand::{ExpandStats, MacroTable};
use crate::optimize::{OptLevel, OptimizeOptions, OptimizeStats, Optimizer};
use crate::weave::{WeaveStats, Weaver};
use crate::{Error, Result};

/// Driver configuration, mirroring the CLI surface.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// `0..=2`; clamped by [`OptLevel::from_u8`].
    pub opt_level: u8,
    /// `0..=3`; only the CLI interprets this, the library stays quiet.
    pub debug_level: u8,
    pub propagate_constants: bool,
    pub eliminate_common_subexprs: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            opt_level: 1,
            debug_level: 0,
            propagate_constants: false,
            eliminate_common_subexprs: false,
        }
    }
}

/// Entry point of the staged pipeline.
pub struct Compilation;

impl Compilation {
    /// Lex and parse `source`. The only fallible stage: lexical and
    /// syntax errors abort the chain with the diagnostics collected so
    /// far.
    pub fn parse(source: &str) -> Result<Parsed> {
        let mut diag = Diagnostics::new();
        match crate::parser::parse(source, &mut diag) {
            Some(ast) => Ok(Parsed {
                source: source.to_string(),
                ast,
                diag,
            }),
            None => Err(Error::Syntax { diagnostics: diag }),
        }
    }
}

/// Run the whole pipeline in one call.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Output> {
    Ok(Compilation::parse(source)?
        .weave()
        .expand()
        .infer()
        .optimize(options)
        .emit())
}

macro_rules! stage_accessors {
    ($stage:ident) => {
        impl $stage {
            pub fn ast(&self) -> &Node {
                &self.ast
            }

            pub fn diagnostics(&self) -> &Diagnostics {
                &self.diag
            }

            pub fn source(&self) -> &str {
                &self.source
            }

            /// Pretty-printed AST at this stage, for debug dumps.
            pub fn pretty_ast(&self) -> String {
                pretty(&self.ast)
            }
        }
    };
}

/// A successfully parsed program.
#[derive(Debug)]
pub struct Parsed {
    source: String,
    ast: Node,
    diag: Diagnostics,
}

stage_accessors!(Parsed);

impl Parsed {
    pub fn weave(mut self) -> Woven {
        let mut weaver = Weaver::new();
        weaver.weave(&mut self.ast, &mut self.diag);
        Woven {
            source: self.source,
            ast: self.ast,
            diag: self.diag,
            weave_stats: weaver.stats().clone(),
        }
    }
}

/// Aspects collected and applied; no aspect definitions remain in the
/// tree.
pub struct Woven {
    source: String,
    ast: Node,
    diag: Diagnostics,
    weave_stats: WeaveStats,
}

stage_accessors!(Woven);

impl Woven {
    pub fn weave_stats(&self) -> &WeaveStats {
        &self.weave_stats
    }

    pub fn expand(mut self) -> Expanded {
        let mut table = MacroTable::new();
        table.expand(&mut self.ast, &mut self.diag);
        Expanded {
            source: self.source,
            ast: self.ast,
            diag: self.diag,
            weave_stats: self.weave_stats,
            expand_stats: table.stats(),
        }
    }
}

/// Macros registered and substituted; no `macro_*` definitions remain.
pub struct Expanded {
    source: String,
    ast: Node,
    diag: Diagnostics,
    weave_stats: WeaveStats,
    expand_stats: ExpandStats,
}

stage_accessors!(Expanded);

impl Expanded {
    pub fn expand_stats(&self) -> ExpandStats {
        self.expand_stats
    }

    pub fn infer(mut self) -> Typed {
        let mut inferencer = Inferencer::new(&mut self.diag);
        inferencer.run(&mut self.ast);
        Typed {
            source: self.source,
            ast: self.ast,
            diag: self.diag,
            weave_stats: self.weave_stats,
            expand_stats: self.expand_stats,
        }
    }
}

/// Inferred-type slots filled where resolvable.
pub struct Typed {
    source: String,
    ast: Node,
    diag: Diagnostics,
    weave_stats: WeaveStats,
    expand_stats: ExpandStats,
}

stage_accessors!(Typed);

impl Typed {
    pub fn optimize(mut self, options: &CompileOptions) -> Optimized {
        let optimize_options = OptimizeOptions {
            level: OptLevel::from_u8(options.opt_level),
            propagate_constants: options.propagate_constants,
            eliminate_common_subexprs: options.eliminate_common_subexprs,
        };
        let mut optimizer = Optimizer::new(optimize_options, &mut self.diag);
        optimizer.optimize(&mut self.ast);
        let optimize_stats = optimizer.stats();
        Optimized {
            source: self.source,
            ast: self.ast,
            diag: self.diag,
            weave_stats: self.weave_stats,
            expand_stats: self.expand_stats,
            optimize_stats,
        }
    }
}

/// Optimized tree, ready for code generation.
pub struct Optimized {
    source: String,
    ast: Node,
    diag: Diagnostics,
    weave_stats: WeaveStats,
    expand_stats: ExpandStats,
    optimize_stats: OptimizeStats,
}

stage_accessors!(Optimized);

impl Optimized {
    pub fn optimize_stats(&self) -> OptimizeStats {
        self.optimize_stats
    }

    pub fn emit(mut self) -> Output {
        let tree_stats = TreeStats::measure(&self.ast);
        let c_source = emit_c(&self.ast, &mut self.diag);
        Output {
            source: self.source,
            ast: self.ast,
            diag: self.diag,
            weave_stats: self.weave_stats,
            expand_stats: self.expand_stats,
            optimize_stats: self.optimize_stats,
            tree_stats,
            c_source,
        }
    }
}

/// Final pipeline product: the C translation unit plus everything the
/// driver may want to report.
pub struct Output {
    source: String,
    ast: Node,
    diag: Diagnostics,
    weave_stats: WeaveStats,
    expand_stats: ExpandStats,
    optimize_stats: OptimizeStats,
    tree_stats: TreeStats,
    c_source: String,
}

stage_accessors!(Output);

impl Output {
    pub fn c_source(&self) -> &str {
        &self.c_source
    }

    pub fn weave_stats(&self) -> &WeaveStats {
        &self.weave_stats
    }

    pub fn expand_stats(&self) -> ExpandStats {
        self.expand_stats
    }

    pub fn optimize_stats(&self) -> OptimizeStats {
        self.optimize_stats
    }

    pub fn tree_stats(&self) -> TreeStats {
        self.tree_stats
    }
}
