//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, its token-level helpers and the
//! [`Parser::parse_file`] entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses single-token-lookahead recursive descent:
//! - This module: Parser state, `next`/`expect`/error helpers, file loop
//! - `declarations`: function, variable and composite-literal productions
//! - `statements`: every statement production
//! - `expressions`: precedence climbing, unary, primary and operand parsing
//!
//! Parser methods are split across these files using `impl Parser` blocks that
//! share the state defined here.
//!
//! # Error Recovery
//!
//! Parsing never stops early. A production that cannot be completed reports a
//! diagnostic and yields a `Bad` node of its family. [`Parser::expect`] always
//! advances, so malformed input can cost extra diagnostics further on but can
//! never stall the parser.
//!
//! Expressions and statements nest at most [`MAX_NESTING`] levels deep. Input
//! nested deeper is reported once and skipped up to its closing bracket.

use super::ast::{AstArena, DeclId, File};
use super::lexer::{Lexer, TokenKind};
use super::position::{Position, SourceFile};
use crate::diagnostics::{ErrorKind, ErrorReminder};
use std::sync::Arc;

/// Deepest nesting of expressions and statements the parser descends into.
pub const MAX_NESTING: u32 = 100;

/// Recursive descent parser for simple-lang
pub struct Parser<'src, 'e> {
    pub(crate) lexer: Lexer<'src>,
    pub(crate) file: Arc<SourceFile>,
    pub(crate) errors: &'e mut ErrorReminder,
    pub(crate) arena: AstArena,

    /// Current token
    pub(crate) tok: TokenKind,
    /// Literal text of the current token
    pub(crate) lit: String,
    /// Start offset of the current token
    pub(crate) offset: usize,
    /// Resolved position of the current token
    pub(crate) pos: Position,
    /// Current expression/statement nesting
    pub(crate) depth: u32,
}

impl<'src, 'e> Parser<'src, 'e> {
    pub fn new(file: Arc<SourceFile>, src: &'src str, errors: &'e mut ErrorReminder) -> Self {
        let lexer = Lexer::new(Arc::clone(&file), src);
        let mut parser = Self {
            lexer,
            file,
            errors,
            arena: AstArena::new(),
            tok: TokenKind::Illegal,
            lit: String::new(),
            offset: 0,
            pos: Position::unknown(),
            depth: 0,
        };
        parser.next();
        parser
    }

    /// Parse top-level declarations until end of file.
    pub fn parse_file(mut self) -> File {
        let mut decls: Vec<DeclId> = Vec::new();

        while self.tok != TokenKind::Eof {
            let before = self.offset;
            decls.push(self.parse_decl(true));
            if self.offset == before && self.tok != TokenKind::Eof {
                self.next();
            }
        }

        tracing::debug!(
            file = %self.file.name(),
            decls = decls.len(),
            lines = self.file.line_count(),
            "parsed file"
        );

        File {
            name: self.file.name().to_string(),
            decls,
            arena: self.arena,
        }
    }

    // ===== Helper methods =====

    /// Advance to the next token, forwarding any lexical diagnostics.
    pub(crate) fn next(&mut self) {
        let token = self.lexer.scan();

        for diag in self.lexer.take_diags() {
            let pos = self.file.position_for(diag.offset);
            self.errors.add(pos, diag.kind, diag.message);
        }

        self.tok = token.kind;
        self.lit = token.lit;
        self.offset = token.offset;
        self.pos = self.file.position_for(token.offset);
        tracing::trace!(token = self.tok.code(), lit = %self.lit, pos = %self.pos, "next token");
    }

    /// Consume `tok` if it is the current token.
    pub(crate) fn got(&mut self, tok: TokenKind) -> bool {
        if self.tok == tok {
            self.next();
            true
        } else {
            false
        }
    }

    /// Require `tok`, report if missing, and advance either way.
    ///
    /// Returns the position of the token that was examined.
    pub(crate) fn expect(&mut self, tok: TokenKind) -> Position {
        let pos = self.pos.clone();
        if self.tok != tok {
            let kind = match tok {
                TokenKind::Semicolon => ErrorKind::SemicolonExpected,
                TokenKind::RParen => ErrorKind::RParenExpected,
                TokenKind::RBracket => ErrorKind::RBrackExpected,
                _ => ErrorKind::Expected,
            };
            let message = format!("expected {}, found {}", tok, self.found());
            self.error(pos.clone(), kind, message);
        }
        self.next();
        pos
    }

    /// Enter one nesting level.
    ///
    /// Past [`MAX_NESTING`] this reports, skips the nested input and returns
    /// `false`; the caller then yields a `Bad` node without calling
    /// [`Parser::leave_nesting`].
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            let message = format!("nesting exceeds {MAX_NESTING} levels");
            self.error(self.pos.clone(), ErrorKind::NestingTooDeep, message);
            self.skip_nested();
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Skip tokens up to a `;` or closing bracket that belongs to an
    /// enclosing production. That token is not consumed.
    fn skip_nested(&mut self) {
        let mut open = 0usize;
        loop {
            match self.tok {
                TokenKind::Eof => return,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => open += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::Semicolon
                    if open == 0 =>
                {
                    return
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => open -= 1,
                _ => {}
            }
            self.next();
        }
    }

    pub(crate) fn error(&mut self, pos: Position, kind: ErrorKind, message: impl Into<String>) {
        self.errors.add(pos, kind, message);
    }

    /// Report a generic "expected X" at the current token.
    pub(crate) fn error_expected(&mut self, what: &str) {
        let message = format!("expected {}, found {}", what, self.found());
        self.error(self.pos.clone(), ErrorKind::Expected, message);
    }

    /// Description of the current token for diagnostics.
    pub(crate) fn found(&self) -> String {
        if self.tok.is_literal() || self.tok == TokenKind::Illegal {
            format!("{} {}", self.tok, self.lit)
        } else {
            self.tok.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{BinaryOp, DeclKind, ExprKind, StmtKind};

    fn parse(src: &str) -> (File, ErrorReminder) {
        let mut errors = ErrorReminder::new();
        let file = Arc::new(SourceFile::new("t.c", src.len()));
        let ast = Parser::new(file, src, &mut errors).parse_file();
        (ast, errors)
    }

    #[test]
    fn test_parse_empty_file() {
        let (file, errors) = parse("");
        assert!(file.decls.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_parse_main() {
        let (file, errors) = parse("void main() { return; }");
        assert!(errors.is_empty(), "{}", errors.render());
        assert_eq!(file.decls.len(), 1);
        let DeclKind::Func(func) = &file.arena.decls[file.decls[0]].kind else {
            panic!("expected function declaration");
        };
        assert_eq!(func.name.name, "main");
        assert!(func.params.fields.is_empty());
        let StmtKind::Block { stmts } = &file.arena.stmts[func.body].kind else {
            panic!("expected block body");
        };
        assert!(matches!(
            file.arena.stmts[stmts[0]].kind,
            StmtKind::Return { value: None }
        ));
    }

    #[test]
    fn test_expect_reports_dedicated_kinds() {
        let (_, errors) = parse("void main() { int a\n a = (1 + 2; }");
        assert!(errors.count_of(ErrorKind::SemicolonExpected) >= 1);
        assert_eq!(errors.count_of(ErrorKind::RParenExpected), 1);
    }

    #[test]
    fn test_lexical_diagnostics_are_forwarded() {
        let (_, errors) = parse("void main() {\n  int a;\n  printf(\"a\\q\");\n}");
        let diag = errors
            .iter()
            .find(|d| d.kind == ErrorKind::MalformedEscape)
            .expect("malformed escape reported");
        assert_eq!((diag.pos.line, diag.pos.column), (3, 13));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_stray_tokens_at_top_level_terminate() {
        let (file, errors) = parse(") ] } = 3");
        assert!(!errors.is_empty());
        assert!(file.decls.iter().all(|&d| file.arena.is_bad_decl(d)));
    }

    #[test]
    fn test_binary_position_is_leftmost_operand() {
        let (file, errors) = parse("int f() { return 1 + 2 * 3; }");
        assert!(errors.is_empty(), "{}", errors.render());
        let binary = file
            .arena
            .exprs
            .iter()
            .map(|(_, e)| e)
            .find(|e| matches!(e.kind, ExprKind::Binary { op: BinaryOp::Add, .. }))
            .expect("binary expression");
        assert_eq!(binary.pos.column, 18);
    }

    fn in_main(body: &str) -> String {
        format!("void main() {{ int a; {body} }}")
    }

    #[test]
    fn test_deep_parens_reported_once() {
        let depth = 20_000;
        let src = in_main(&format!("a = {}1{};", "(".repeat(depth), ")".repeat(depth)));
        let (file, errors) = parse(&src);
        assert_eq!(errors.kinds(), vec![ErrorKind::NestingTooDeep]);
        assert!(file.funcs().any(|f| f.name.name == "main"));
    }

    #[test]
    fn test_deep_blocks_reported_once() {
        let depth = 20_000;
        let src = in_main(&format!("{}a = 1;{}", "{".repeat(depth), "}".repeat(depth)));
        let (file, errors) = parse(&src);
        assert_eq!(errors.kinds(), vec![ErrorKind::NestingTooDeep]);
        assert!(file.funcs().any(|f| f.name.name == "main"));
    }

    #[test]
    fn test_long_operator_chain_reported_once() {
        let terms = vec!["1"; 5_000].join(" + ");
        let (_, errors) = parse(&in_main(&format!("a = {terms};")));
        assert_eq!(errors.kinds(), vec![ErrorKind::NestingTooDeep]);
    }

    #[test]
    fn test_nesting_within_limit_is_accepted() {
        let depth = (MAX_NESTING / 2) as usize;
        let src = in_main(&format!("a = {}1{};", "(".repeat(depth), ")".repeat(depth)));
        let (_, errors) = parse(&src);
        assert!(errors.is_empty(), "{}", errors.render());
    }
}
