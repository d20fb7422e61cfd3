//! Diagnostics shared by every phase
//!
//! Lexer, parser and checker all report into one [`ErrorReminder`]. Nothing in
//! the front end fails hard: a diagnostic is recorded and the phase carries on.
//!
//! At most one diagnostic is kept per source position (the latest one wins),
//! which keeps a cascade of errors on one token down to a single line of
//! output. Diagnostics without a usable position go to a side list and are
//! always kept.

use crate::parser::position::Position;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Every kind of diagnostic the front end can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Lexical / syntax
    /// A token other than the expected one was found.
    Expected,
    SemicolonExpected,
    RParenExpected,
    RBrackExpected,
    IllegalCharacter,
    /// String or char literal not closed before newline / end of file.
    UnterminatedLiteral,
    MalformedEscape,
    /// Char literal holding more than one character.
    MultiCharLiteral,
    /// Expressions or statements nested past the parser's depth limit.
    NestingTooDeep,

    // Declarations
    /// Same name declared twice in one code block.
    Redefine,
    /// Composite literal shape or element kind does not line up.
    CompositeLitSizeError,
    /// Char or string literal is empty or contains a disallowed character.
    EmptyCharOrStringLit,
    /// No `main` function in the file.
    MissingMain,

    // Expressions
    Undefine,
    ArgNumberNotMatched,
    ArgTypeNotMatched,
    IndexTypeNotAllowed,
    TypeMismatch,
    /// Relational operator outside a condition.
    RelationalNotAllowed,
    /// Condition is not a relational expression.
    CondValueNotMatched,

    // Statements
    ReturnValueNotAllowed,
    ReturnValueRequired,
    UpdateConstValue,
    SwitchTypeError,
    DefaultExpected,
    DuplicateDefault,
}

impl ErrorKind {
    pub fn is_syntax(self) -> bool {
        matches!(
            self,
            ErrorKind::Expected
                | ErrorKind::SemicolonExpected
                | ErrorKind::RParenExpected
                | ErrorKind::RBrackExpected
                | ErrorKind::IllegalCharacter
                | ErrorKind::UnterminatedLiteral
                | ErrorKind::MalformedEscape
                | ErrorKind::MultiCharLiteral
                | ErrorKind::NestingTooDeep
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single positioned diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pos} :: {message}")]
pub struct Diagnostic {
    pub pos: Position,
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(pos: Position, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            pos,
            kind,
            message: message.into(),
        }
    }
}

/// Receives diagnostics as soon as they are raised.
pub trait DiagnosticSink {
    fn report(&mut self, diag: &Diagnostic);
}

impl<F: FnMut(&Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, diag: &Diagnostic) {
        self(diag)
    }
}

/// Ordered, position-deduplicated diagnostic store.
#[derive(Default)]
pub struct ErrorReminder {
    errors: BTreeMap<(usize, usize), Diagnostic>,
    unpositioned: Vec<Diagnostic>,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl ErrorReminder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream every diagnostic to `sink` at insertion time.
    pub fn with_sink(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
            ..Self::default()
        }
    }

    pub fn add(&mut self, pos: Position, kind: ErrorKind, message: impl Into<String>) {
        self.push(Diagnostic::new(pos, kind, message));
    }

    pub fn push(&mut self, diag: Diagnostic) {
        tracing::trace!(kind = %diag.kind, pos = %diag.pos, "diagnostic");
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&diag);
        }

        if diag.pos.is_valid() {
            self.errors.insert((diag.pos.line, diag.pos.column), diag);
        } else {
            self.unpositioned.push(diag);
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.unpositioned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positioned diagnostics in source order, then the unpositioned ones.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.values().chain(self.unpositioned.iter())
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.iter().map(|d| d.kind).collect()
    }

    pub fn count_of(&self, kind: ErrorKind) -> usize {
        self.iter().filter(|d| d.kind == kind).count()
    }

    /// Lexical and syntax diagnostics among those retained.
    pub fn syntax_error_count(&self) -> usize {
        self.iter().filter(|d| d.kind.is_syntax()).count()
    }

    /// Render every diagnostic, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for diag in self.iter() {
            out.push_str(&diag.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Debug for ErrorReminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReminder")
            .field("errors", &self.errors)
            .field("unpositioned", &self.unpositioned)
            .field("streaming", &self.sink.is_some())
            .finish()
    }
}
