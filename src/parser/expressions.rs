//! Expression parsing implementation
//!
//! Binary operators are parsed with precedence climbing. Unary `+`/`-` bind
//! tighter than any binary operator, and a primary expression may be followed
//! by any chain of calls and index suffixes.
//!
//! # Operator Precedence (lowest to highest)
//!
//! 1. Relational: `<`, `<=`, `>`, `>=`, `==`, `!=`
//! 2. Additive: `+`, `-`
//! 3. Multiplicative: `*`, `/`
//!
//! All binary operators are left-associative. A binary node is positioned at
//! its left operand, which is its leftmost token.
//!
//! # Grammar
//!
//! ```text
//! expr    ::= binary(1)
//! binary  ::= unary (op unary)*
//! unary   ::= ("+" | "-") unary | primary
//! primary ::= operand ("(" [expr ("," expr)*] ")" | "[" expr "]")*
//! operand ::= identifier | literal | "(" expr ")"
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl Parser<'_, '_> {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> ExprId {
        self.parse_binary_expr(1)
    }

    /// Parse a binary expression whose operators bind at least `min_prec`.
    pub(crate) fn parse_binary_expr(&mut self, min_prec: u8) -> ExprId {
        let mut left = self.parse_unary_expr();
        // Each operator nests the tree one level deeper on the left.
        let mut levels = 0;

        loop {
            let prec = self.tok.precedence();
            if prec < min_prec {
                break;
            }
            let Some(op) = binary_op(self.tok) else {
                break;
            };
            self.next();

            let right = if self.enter_nesting() {
                levels += 1;
                self.parse_binary_expr(prec + 1)
            } else {
                self.arena.alloc_expr(ExprKind::Bad, self.pos.clone())
            };
            let pos = self.arena.exprs[left].pos.clone();
            left = self.arena.alloc_expr(ExprKind::Binary { op, left, right }, pos);
        }

        for _ in 0..levels {
            self.leave_nesting();
        }
        left
    }

    pub(crate) fn parse_unary_expr(&mut self) -> ExprId {
        let pos = self.pos.clone();
        if !self.enter_nesting() {
            return self.arena.alloc_expr(ExprKind::Bad, pos);
        }
        let expr = self.parse_signed_expr();
        self.leave_nesting();
        expr
    }

    fn parse_signed_expr(&mut self) -> ExprId {
        let op = match self.tok {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_primary_expr(),
        };
        let pos = self.pos.clone();
        self.next();

        let operand = self.parse_unary_expr();
        self.arena.alloc_expr(ExprKind::Unary { op, operand }, pos)
    }

    /// Parse an operand followed by call and index suffixes.
    pub(crate) fn parse_primary_expr(&mut self) -> ExprId {
        let mut expr = self.parse_operand();

        loop {
            match self.tok {
                TokenKind::LParen => expr = self.parse_call_expr(expr),
                TokenKind::LBracket => expr = self.parse_index_expr(expr),
                _ => break,
            }
        }

        expr
    }

    pub(crate) fn parse_operand(&mut self) -> ExprId {
        let pos = self.pos.clone();

        let kind = match self.tok {
            TokenKind::Ident | TokenKind::Main => ExprKind::Ident(std::mem::take(&mut self.lit)),
            TokenKind::IntLit => lit_expr(LitKind::Int, &mut self.lit),
            TokenKind::CharLit => lit_expr(LitKind::Char, &mut self.lit),
            TokenKind::StrLit => lit_expr(LitKind::String, &mut self.lit),
            TokenKind::LParen => {
                self.next();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen);
                return self.arena.alloc_expr(ExprKind::Paren { inner }, pos);
            }
            _ => {
                self.error_expected("operand");
                // Leave closing tokens for the enclosing production.
                if !matches!(
                    self.tok,
                    TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::RBrace
                        | TokenKind::Eof
                ) {
                    self.next();
                }
                return self.arena.alloc_expr(ExprKind::Bad, pos);
            }
        };

        self.next();
        self.arena.alloc_expr(kind, pos)
    }

    fn parse_call_expr(&mut self, callee: ExprId) -> ExprId {
        let pos = self.arena.exprs[callee].pos.clone();
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

        self.arena.alloc_expr(ExprKind::Call { callee, args }, pos)
    }

    fn parse_index_expr(&mut self, base: ExprId) -> ExprId {
        let pos = self.arena.exprs[base].pos.clone();
        self.expect(TokenKind::LBracket);
        let index = self.parse_expr();
        self.expect(TokenKind::RBracket);
        self.arena.alloc_expr(ExprKind::Index { base, index }, pos)
    }
}

fn binary_op(tok: TokenKind) -> Option<BinaryOp> {
    let op = match tok {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Lt => BinaryOp::Lss,
        TokenKind::Le => BinaryOp::Leq,
        TokenKind::Gt => BinaryOp::Gre,
        TokenKind::Ge => BinaryOp::Geq,
        TokenKind::EqEq => BinaryOp::Eql,
        TokenKind::NotEq => BinaryOp::Neq,
        _ => return None,
    };
    Some(op)
}

fn lit_expr(kind: LitKind, lit: &mut String) -> ExprKind {
    ExprKind::BasicLit {
        kind,
        text: std::mem::take(lit),
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorReminder;
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;
    use crate::parser::position::SourceFile;
    use std::sync::Arc;

    /// Parse `src` as the initializer of a global and return it.
    fn parse_init(src: &str) -> (File, ExprId) {
        let text = format!("int x = {src};");
        let mut errors = ErrorReminder::new();
        let file = Arc::new(SourceFile::new("t.c", text.len()));
        let ast = Parser::new(file, &text, &mut errors).parse_file();
        assert!(errors.is_empty(), "{}", errors.render());

        let init = ast
            .arena
            .decls
            .iter()
            .find_map(|(_, d)| match &d.kind {
                DeclKind::SingleVar(single) => single.init,
                _ => None,
            })
            .expect("initializer");
        (ast, init)
    }

    /// Render an expression fully parenthesized.
    fn show(file: &File, expr: ExprId) -> String {
        match &file.arena.exprs[expr].kind {
            ExprKind::Bad => "BAD".to_string(),
            ExprKind::Ident(name) => name.clone(),
            ExprKind::BasicLit { text, .. } => text.clone(),
            ExprKind::CompositeLit { items } => {
                let inner: Vec<_> = items.iter().map(|&i| show(file, i)).collect();
                format!("{{{}}}", inner.join(","))
            }
            ExprKind::Paren { inner } => show(file, *inner),
            ExprKind::Index { base, index } => format!("{}[{}]", show(file, *base), show(file, *index)),
            ExprKind::Call { callee, args } => {
                let args: Vec<_> = args.iter().map(|&a| show(file, a)).collect();
                format!("{}({})", show(file, *callee), args.join(","))
            }
            ExprKind::Unary { op, operand } => {
                let sign = if *op == UnaryOp::Minus { "-" } else { "+" };
                format!("({sign}{})", show(file, *operand))
            }
            ExprKind::Binary { op, left, right } => {
                format!("({} {} {})", show(file, *left), op.symbol(), show(file, *right))
            }
        }
    }

    #[test]
    fn test_precedence() {
        let (file, expr) = parse_init("1 + 2 * 3 - 4 / 2");
        assert_eq!(show(&file, expr), "((1 + (2 * 3)) - (4 / 2))");
    }

    #[test]
    fn test_relational_binds_loosest() {
        let (file, expr) = parse_init("a + 1 < b * 2");
        assert_eq!(show(&file, expr), "((a + 1) < (b * 2))");
    }

    #[test]
    fn test_left_associativity() {
        let (file, expr) = parse_init("8 - 4 - 2");
        assert_eq!(show(&file, expr), "((8 - 4) - 2)");
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let (file, expr) = parse_init("-a * +3");
        assert_eq!(show(&file, expr), "((-a) * (+3))");
    }

    #[test]
    fn test_call_and_index_chains() {
        let (file, expr) = parse_init("f(x, g(1))[0] + a[1][2]");
        assert_eq!(show(&file, expr), "(f(x,g(1))[0] + a[1][2])");
    }

    #[test]
    fn test_parens_override_precedence() {
        let (file, expr) = parse_init("(1 + 2) * 3");
        assert_eq!(show(&file, expr), "((1 + 2) * 3)");
        let ExprKind::Binary { left, .. } = file.arena.exprs[expr].kind else {
            panic!("expected binary");
        };
        assert!(matches!(file.arena.exprs[left].kind, ExprKind::Paren { .. }));
    }
}
