//! Grammar productions, implemented as extensions of `Parser`.
//!
//! Split by altitude: `items` for program shape and top-level definitions,
//! `statements` for the statement dispatch, `expressions` for precedence
//! climbing and the postfix machinery.

mod expressions;
mod items;
mod statements;
