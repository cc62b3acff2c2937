//! Semantic analysis: the scoped symbol table and type inference.

mod infer;
mod symbol_table;


pub use infer::{FnSig, Inferencer};
pub use symbol_table::SymbolTable;
