//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! stmt        ::= declaration | simple ";" | if | while | for | switch
//!               | block | printf | scanf | return | ";"
//! simple      ::= expr ["=" expr]
//! block       ::= "{" stmt* "}"
//! if          ::= "if" "(" expr ")" stmt ["else" stmt]
//! while       ::= "while" "(" expr ")" stmt
//! for         ::= "for" "(" [simple] ";" [simple] ";" [simple] ")" stmt
//! switch      ::= "switch" "(" expr ")" "{" case* "}"
//! case        ::= ("case" expr | "default") ":" stmt*
//! printf      ::= "printf" "(" [expr ("," expr)*] ")" ";"
//! scanf       ::= "scanf" "(" expr ")" ";"
//! return      ::= "return" [expr] ";"
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::position::Position;

impl Parser<'_, '_> {
    /// Parse a statement
    pub(crate) fn parse_stmt(&mut self) -> StmtId {
        let pos = self.pos.clone();
        if !self.enter_nesting() {
            return self.arena.alloc_stmt(StmtKind::Bad, pos);
        }
        let stmt = self.parse_stmt_kind(pos);
        self.leave_nesting();
        stmt
    }

    fn parse_stmt_kind(&mut self, pos: Position) -> StmtId {
        match self.tok {
            TokenKind::Const | TokenKind::Int | TokenKind::Char | TokenKind::Void => {
                let decl = self.parse_decl(false);
                self.arena.alloc_stmt(StmtKind::Decl(decl), pos)
            }
            TokenKind::Ident
            | TokenKind::Main
            | TokenKind::IntLit
            | TokenKind::CharLit
            | TokenKind::StrLit
            | TokenKind::LParen
            | TokenKind::Plus
            | TokenKind::Minus => {
                let stmt = self.parse_simple_stmt();
                self.expect(TokenKind::Semicolon);
                stmt
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::LBrace => self.parse_block_stmt(),
            TokenKind::Printf => self.parse_printf_stmt(),
            TokenKind::Scanf => self.parse_scanf_stmt(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Semicolon => {
                self.next();
                self.arena.alloc_stmt(StmtKind::Empty, pos)
            }
            TokenKind::RBrace | TokenKind::Eof => {
                // The enclosing block owns the '}'.
                self.error_expected("statement");
                self.arena.alloc_stmt(StmtKind::Bad, pos)
            }
            _ => {
                self.error_expected("statement");
                self.next();
                self.arena.alloc_stmt(StmtKind::Bad, pos)
            }
        }
    }

    /// Parse an assignment or expression statement without its terminator.
    pub(crate) fn parse_simple_stmt(&mut self) -> StmtId {
        let pos = self.pos.clone();
        let lhs = self.parse_expr();

        if self.got(TokenKind::Assign) {
            let rhs = self.parse_expr();
            return self.arena.alloc_stmt(StmtKind::Assign { lhs, rhs }, pos);
        }
        self.arena.alloc_stmt(StmtKind::Expr(lhs), pos)
    }

    /// Parse `{ stmt* }`. Running into end of file yields a bad statement.
    pub(crate) fn parse_block_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::LBrace);
        let mut stmts = Vec::new();

        while self.tok != TokenKind::RBrace && self.tok != TokenKind::Eof {
            let before = self.offset;
            stmts.push(self.parse_stmt());
            if self.offset == before && self.tok != TokenKind::RBrace && self.tok != TokenKind::Eof {
                self.next();
            }
        }

        if self.tok == TokenKind::Eof {
            self.error_expected("'}'");
            return self.arena.alloc_stmt(StmtKind::Bad, pos);
        }
        self.next();

        self.arena.alloc_stmt(StmtKind::Block { stmts }, pos)
    }

    fn parse_if_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::If);
        let cond = self.parse_paren_cond();
        let then = self.parse_stmt();
        let else_ = if self.got(TokenKind::Else) {
            Some(self.parse_stmt())
        } else {
            None
        };
        self.arena.alloc_stmt(StmtKind::If { cond, then, else_ }, pos)
    }

    fn parse_while_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::While);
        let cond = self.parse_paren_cond();
        let body = self.parse_stmt();
        self.arena.alloc_stmt(StmtKind::While { cond, body }, pos)
    }

    /// `(expr)` of if/while/switch.
    fn parse_paren_cond(&mut self) -> ExprId {
        self.expect(TokenKind::LParen);
        let cond = self.parse_expr();
        self.expect(TokenKind::RParen);
        cond
    }

    fn parse_for_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::For);
        self.expect(TokenKind::LParen);

        let init = self.parse_optional_simple_stmt(TokenKind::Semicolon);
        self.expect(TokenKind::Semicolon);
        let cond = self.parse_optional_simple_stmt(TokenKind::Semicolon);
        self.expect(TokenKind::Semicolon);
        let step = self.parse_optional_simple_stmt(TokenKind::RParen);
        self.expect(TokenKind::RParen);

        let body = self.parse_stmt();
        self.arena.alloc_stmt(
            StmtKind::For {
                init,
                cond,
                step,
                body,
            },
            pos,
        )
    }

    fn parse_optional_simple_stmt(&mut self, terminator: TokenKind) -> Option<StmtId> {
        if self.tok == terminator {
            None
        } else {
            Some(self.parse_simple_stmt())
        }
    }

    fn parse_switch_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::Switch);
        let cond = self.parse_paren_cond();
        self.expect(TokenKind::LBrace);

        let mut cases = Vec::new();
        while self.tok != TokenKind::RBrace && self.tok != TokenKind::Eof {
            match self.tok {
                TokenKind::Case | TokenKind::Default => cases.push(self.parse_case_stmt()),
                _ => {
                    self.error_expected("'case' or 'default'");
                    self.next();
                }
            }
        }
        self.expect(TokenKind::RBrace);

        self.arena.alloc_stmt(StmtKind::Switch { cond, cases }, pos)
    }

    /// Parse one `case expr:` or `default:` clause and its statements.
    fn parse_case_stmt(&mut self) -> StmtId {
        let pos = self.pos.clone();
        let cond = if self.got(TokenKind::Default) {
            None
        } else {
            self.expect(TokenKind::Case);
            Some(self.parse_expr())
        };
        self.expect(TokenKind::Colon);

        let mut body = Vec::new();
        while !matches!(
            self.tok,
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            let before = self.offset;
            body.push(self.parse_stmt());
            if self.offset == before {
                self.next();
            }
        }

        self.arena.alloc_stmt(StmtKind::Case { cond, body }, pos)
    }

    fn parse_printf_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::Printf);
        self.expect(TokenKind::LParen);

        let mut args = Vec::new();
        if self.tok != TokenKind::RParen {
            loop {
                args.push(self.parse_expr());
                if !self.got(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);
        self.expect(TokenKind::Semicolon);

        self.arena.alloc_stmt(StmtKind::Printf { args }, pos)
    }

    fn parse_scanf_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::Scanf);
        self.expect(TokenKind::LParen);
        let target = self.parse_expr();
        self.expect(TokenKind::RParen);
        self.expect(TokenKind::Semicolon);

        self.arena.alloc_stmt(StmtKind::Scan { target }, pos)
    }

    fn parse_return_stmt(&mut self) -> StmtId {
        let pos = self.expect(TokenKind::Return);
        let value = if self.tok != TokenKind::Semicolon {
            Some(self.parse_expr())
        } else {
            None
        };
        self.expect(TokenKind::Semicolon);

        self.arena.alloc_stmt(StmtKind::Return { value }, pos)
    }
}
