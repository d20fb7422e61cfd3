//! Declaration parsing implementation
//!
//! This module handles parsing of declarations:
//!
//! - Function definitions: `type name(params) { ... }`
//! - Variable declarations: `[const] type name[dims] [= init], ...;`
//! - Parameter lists: `(int a, char b)`
//! - Composite literals: `{{1, 2}, {3, 4}}`
//!
//! # Grammar
//!
//! ```text
//! declaration    ::= ["const"] base_type name (func_rest | var_rest)
//! base_type      ::= "int" | "char" | "void"
//! func_rest      ::= "(" [field ("," field)*] ")" block
//! field          ::= ("int" | "char") identifier
//! var_rest       ::= single_var_rest ("," name single_var_rest)* ";"
//! single_var_rest ::= ("[" int_literal "]")* ["=" (expr | composite_lit)]
//! composite_lit  ::= "{" [item ("," item)*] "}"
//! item           ::= composite_lit | literal | identifier | ("+" | "-") (literal | identifier)
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::diagnostics::ErrorKind;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::position::Position;

impl Parser<'_, '_> {
    /// Parse a declaration.
    ///
    /// `allow_func` is false inside code blocks, where a function definition
    /// is parsed for recovery and then replaced by a bad declaration.
    pub(crate) fn parse_decl(&mut self, allow_func: bool) -> DeclId {
        let pos = self.pos.clone();
        let is_const = self.got(TokenKind::Const);

        let base = match self.tok {
            TokenKind::Int => TypeKind::Int,
            TokenKind::Char => TypeKind::Char,
            TokenKind::Void => TypeKind::Void,
            _ => {
                self.error_expected("declaration");
                self.next();
                return self.arena.alloc_decl(DeclKind::Bad, pos);
            }
        };
        let base_pos = self.pos.clone();
        self.next();

        let name = self.parse_ident();

        if self.tok == TokenKind::LParen {
            let return_type = self.arena.alloc_type(base, base_pos);
            let func = self.parse_func_decl(return_type, name);

            if is_const {
                self.error(pos.clone(), ErrorKind::Expected, "function declaration cannot be const");
                return self.arena.alloc_decl(DeclKind::Bad, pos);
            }
            if !allow_func {
                self.error(pos.clone(), ErrorKind::Expected, "function declared inside a code block");
                return self.arena.alloc_decl(DeclKind::Bad, pos);
            }
            return match func {
                Some(func) => self.arena.alloc_decl(DeclKind::Func(func), pos),
                None => self.arena.alloc_decl(DeclKind::Bad, pos),
            };
        }

        let decl = self.parse_var_decl(is_const, base.clone(), base_pos, name);
        if base == TypeKind::Void {
            self.error(pos.clone(), ErrorKind::Expected, "variable cannot be declared void");
            return self.arena.alloc_decl(DeclKind::Bad, pos);
        }
        self.arena.alloc_decl(decl, pos)
    }

    /// Parse an identifier; `main` is accepted as a name.
    pub(crate) fn parse_ident(&mut self) -> Ident {
        let pos = self.pos.clone();
        let name = match self.tok {
            TokenKind::Ident | TokenKind::Main => std::mem::take(&mut self.lit),
            _ => {
                self.error_expected("identifier");
                "_".to_string()
            }
        };
        self.next();
        Ident { name, pos }
    }

    /// Parse a function after its name. `None` when the body is bad.
    fn parse_func_decl(&mut self, return_type: TypeId, name: Ident) -> Option<FuncDecl> {
        let params = self.parse_field_list();
        let body = self.parse_block_stmt();

        tracing::debug!(
            name = %name.name,
            params = params.fields.len(),
            pos = %name.pos,
            "parsed function declaration"
        );

        if matches!(self.arena.stmts[body].kind, StmtKind::Bad) {
            return None;
        }
        Some(FuncDecl {
            return_type,
            name,
            params,
            body,
        })
    }

    /// Parse a parenthesized parameter list; may be empty.
    pub(crate) fn parse_field_list(&mut self) -> FieldList {
        let pos = self.expect(TokenKind::LParen);
        let mut fields = Vec::new();

        if self.tok != TokenKind::RParen {
            loop {
                fields.push(self.parse_field());
                if !self.got(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);

        FieldList { pos, fields }
    }

    fn parse_field(&mut self) -> Field {
        let pos = self.pos.clone();
        let kind = match self.tok {
            TokenKind::Int => TypeKind::Int,
            TokenKind::Char => TypeKind::Char,
            _ => {
                self.error_expected("parameter type");
                TypeKind::Bad
            }
        };
        let ty = self.arena.alloc_type(kind, pos.clone());

        // `f(int a, )`: leave the ')' for the list.
        if self.tok == TokenKind::RParen {
            let name = Ident {
                name: "_".to_string(),
                pos: pos.clone(),
            };
            return Field { pos, ty, name };
        }
        self.next();
        let name = self.parse_ident();
        Field { pos, ty, name }
    }

    /// Parse the rest of a variable declaration after its first name.
    fn parse_var_decl(&mut self, is_const: bool, base: TypeKind, base_pos: Position, first: Ident) -> DeclKind {
        let mut decls = vec![self.parse_single_var_decl(is_const, base.clone(), base_pos.clone(), first)];

        while self.got(TokenKind::Comma) {
            let name = self.parse_ident();
            decls.push(self.parse_single_var_decl(is_const, base.clone(), base_pos.clone(), name));
        }
        self.expect(TokenKind::Semicolon);

        DeclKind::Var { decls }
    }

    /// Parse dimension suffixes and the optional initializer of one name.
    fn parse_single_var_decl(&mut self, is_const: bool, base: TypeKind, base_pos: Position, name: Ident) -> DeclId {
        let mut dims = Vec::new();
        while self.got(TokenKind::LBracket) {
            dims.push(self.parse_array_size());
            self.expect(TokenKind::RBracket);
        }

        // Wrap innermost first so the outermost dimension ends up on top.
        let mut ty = self.arena.alloc_type(base, base_pos.clone());
        for &size in dims.iter().rev() {
            ty = self.arena.alloc_type(TypeKind::Array { elem: ty, size }, base_pos.clone());
        }

        let init = if self.got(TokenKind::Assign) {
            if self.tok == TokenKind::LBrace {
                Some(self.parse_composite_lit())
            } else {
                Some(self.parse_expr())
            }
        } else {
            None
        };

        let pos = name.pos.clone();
        self.arena.alloc_decl(
            DeclKind::SingleVar(SingleVarDecl {
                is_const,
                ty,
                name,
                init,
            }),
            pos,
        )
    }

    fn parse_array_size(&mut self) -> usize {
        if self.tok != TokenKind::IntLit {
            self.error_expected("array size");
            if self.tok != TokenKind::RBracket {
                self.next();
            }
            return 0;
        }

        let size = match self.lit.parse::<usize>() {
            Ok(size) => size,
            Err(_) => {
                let message = format!("array size {} out of range", self.lit);
                self.error(self.pos.clone(), ErrorKind::Expected, message);
                0
            }
        };
        self.next();
        size
    }

    /// Parse a brace-delimited, possibly nested, composite literal.
    ///
    /// Nesting is tracked with an explicit stack of open literals, so a
    /// malformed `, }` only affects the literal it appears in. A `;`, a
    /// declaration keyword or end of file closes every open level without
    /// being consumed.
    pub(crate) fn parse_composite_lit(&mut self) -> ExprId {
        let mut stack: Vec<(Position, Vec<ExprId>)> = vec![(self.pos.clone(), Vec::new())];
        self.expect(TokenKind::LBrace);

        loop {
            match self.tok {
                TokenKind::LBrace => {
                    stack.push((self.pos.clone(), Vec::new()));
                    self.next();
                    continue;
                }
                _ if self.at_composite_boundary() => {
                    self.error_expected("'}'");
                    return self.close_composite_lits(stack);
                }
                TokenKind::RBrace => {}
                _ => {
                    let item = self.parse_composite_item();
                    if let Some((_, items)) = stack.last_mut() {
                        items.push(item);
                    }
                }
            }

            // After an item: close finished literals, then look for the next item.
            loop {
                match self.tok {
                    TokenKind::RBrace => {
                        self.next();
                        let Some((pos, items)) = stack.pop() else {
                            return self.arena.alloc_expr(ExprKind::Bad, self.pos.clone());
                        };
                        let lit = self.arena.alloc_expr(ExprKind::CompositeLit { items }, pos);
                        match stack.last_mut() {
                            Some((_, parent)) => parent.push(lit),
                            None => return lit,
                        }
                    }
                    TokenKind::Comma => {
                        self.next();
                        if self.tok == TokenKind::RBrace {
                            self.error_expected("literal after ','");
                            continue;
                        }
                        break;
                    }
                    _ if self.at_composite_boundary() => {
                        self.error_expected("'}'");
                        return self.close_composite_lits(stack);
                    }
                    _ => {
                        self.error_expected("',' or '}' in composite literal");
                        self.next();
                        break;
                    }
                }
            }
        }
    }

    /// Tokens that cannot appear inside a composite literal and end the
    /// enclosing declaration.
    fn at_composite_boundary(&self) -> bool {
        matches!(
            self.tok,
            TokenKind::Semicolon
                | TokenKind::Const
                | TokenKind::Int
                | TokenKind::Char
                | TokenKind::Void
                | TokenKind::Eof
        )
    }

    /// Close every still-open literal when the literal is cut short.
    fn close_composite_lits(&mut self, mut stack: Vec<(Position, Vec<ExprId>)>) -> ExprId {
        let mut inner: Option<ExprId> = None;
        while let Some((pos, mut items)) = stack.pop() {
            items.extend(inner);
            inner = Some(self.arena.alloc_expr(ExprKind::CompositeLit { items }, pos));
        }
        match inner {
            Some(lit) => lit,
            None => self.arena.alloc_expr(ExprKind::Bad, self.pos.clone()),
        }
    }

    fn parse_composite_item(&mut self) -> ExprId {
        match self.tok {
            TokenKind::Plus | TokenKind::Minus => {
                let pos = self.pos.clone();
                let op = if self.tok == TokenKind::Plus {
                    UnaryOp::Plus
                } else {
                    UnaryOp::Minus
                };
                self.next();
                let operand = match self.tok {
                    TokenKind::Ident | TokenKind::IntLit | TokenKind::CharLit => self.parse_operand(),
                    _ => {
                        self.error_expected("literal or identifier after sign");
                        let bad = self.arena.alloc_expr(ExprKind::Bad, self.pos.clone());
                        if !self.at_composite_boundary() {
                            self.next();
                        }
                        bad
                    }
                };
                self.arena.alloc_expr(ExprKind::Unary { op, operand }, pos)
            }
            TokenKind::Ident | TokenKind::IntLit | TokenKind::CharLit | TokenKind::StrLit => self.parse_operand(),
            _ => {
                self.error_expected("literal in composite literal");
                let bad = self.arena.alloc_expr(ExprKind::Bad, self.pos.clone());
                if !self.at_composite_boundary() {
                    self.next();
                }
                bad
            }
        }
    }
}
