//! simple-lang source code parser
//!
//! This module transforms source text into an arena-backed AST:
//! - [`position`]: Byte offset to line/column resolution
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), with the productions split across
//!   `declarations`, `statements` and `expressions`
//! - [`ast`]: AST node definitions
//!
//! # Language
//!
//! - Types: `int`, `char`, `void` (functions only), fixed-size arrays
//! - Declarations: `const` variables, multi-name declarations, composite
//!   literal initializers, functions with `int`/`char` parameters
//! - Statements: assignment, `if`/`else`, `while`, `for`, `switch`, blocks,
//!   `return`, and the `scanf`/`printf` intrinsics
//! - Expressions: `+ - * /`, relational operators, unary `+`/`-`, calls, indexing
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary
//! operators and local error recovery through `Bad` placeholder nodes.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod position;
mod statements;

pub use parse::Parser;
