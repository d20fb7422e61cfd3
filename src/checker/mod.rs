//! Semantic checker
//!
//! Walks the AST produced by [`crate::parser`] and reports:
//! - name resolution problems (undefined or redeclared names)
//! - type errors in expressions, initializers, calls and returns
//! - composite literal shapes that do not match their array
//! - writes to `const` variables and malformed `switch` statements
//!
//! - [`symbols`]: scope stack and function table
//! - [`types`]: checker-side types
//! - [`check`]: the [`Checker`] and declaration checks, with statement and
//!   expression checks split into their own files

pub mod check;
mod expressions;
mod statements;
pub mod symbols;
pub mod types;

pub use check::Checker;
pub use symbols::{Symbol, SymbolTable};
pub use types::Ty;
