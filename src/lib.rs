//! # Introduction
//!
//! simple-lang is the front end of a small C-like teaching language: `const`
//! variables, `int`/`char` scalars and arrays, functions, structured control
//! flow and the `scanf`/`printf` intrinsics. It parses a source file and
//! checks it statically; there is no code generation.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Checker → Diagnostics
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an arena-backed AST,
//!    recovering from syntax errors with placeholder nodes.
//! 2. [`checker`]: resolves names through a scoped symbol table and
//!    type-checks declarations, statements and expressions.
//! 3. [`diagnostics`]: every phase reports into one
//!    [`diagnostics::ErrorReminder`], which keeps at most one diagnostic per
//!    source position and renders them as `(line, column) :: message`.
//!
//! No phase stops at the first problem; [`compile`] always runs both phases
//! and hands back everything that was found.

pub mod checker;
pub mod diagnostics;
pub mod parser;

use checker::Checker;
use diagnostics::{Diagnostic, ErrorReminder};
use parser::ast::File;
use parser::lexer::{Lexer, Token, TokenKind};
use parser::position::SourceFile;
use parser::Parser;
use std::sync::Arc;

/// Knobs for [`compile_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Print each diagnostic to stderr as soon as it is raised.
    pub stream: bool,
}

/// Result of compiling one source unit.
#[derive(Debug)]
pub struct Compilation {
    pub file: File,
    pub errors: ErrorReminder,
}

impl Compilation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse and check `source` with default options.
pub fn compile(name: &str, source: &str) -> Compilation {
    compile_with(name, source, CompileOptions::default())
}

pub fn compile_with(name: &str, source: &str, options: CompileOptions) -> Compilation {
    let errors = if options.stream {
        ErrorReminder::with_sink(|diag: &Diagnostic| eprintln!("{diag}"))
    } else {
        ErrorReminder::new()
    };
    compile_into(name, source, errors)
}

/// Parse and check `source`, reporting into a caller-supplied reminder.
pub fn compile_into(name: &str, source: &str, mut errors: ErrorReminder) -> Compilation {
    let source_file = Arc::new(SourceFile::new(name, source.len()));

    let file = Parser::new(Arc::clone(&source_file), source, &mut errors).parse_file();
    Checker::new(&file, &mut errors).check();

    tracing::info!(
        file = name,
        lines = source_file.line_count(),
        syntax_errors = errors.syntax_error_count(),
        total_errors = errors.len(),
        "compiled"
    );

    Compilation { file, errors }
}

/// Run only the lexer over `source`. The returned tokens end with `Eof`.
pub fn tokenize(name: &str, source: &str) -> (Vec<Token>, ErrorReminder) {
    let source_file = Arc::new(SourceFile::new(name, source.len()));
    let mut lexer = Lexer::new(Arc::clone(&source_file), source);
    let mut errors = ErrorReminder::new();
    let mut tokens = Vec::new();

    loop {
        let token = lexer.scan();
        for diag in lexer.take_diags() {
            errors.add(source_file.position_for(diag.offset), diag.kind, diag.message);
        }
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }

    (tokens, errors)
}
