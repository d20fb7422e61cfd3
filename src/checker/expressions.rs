//! Expression type inference
//!
//! Every check returns the inferred [`Ty`]. [`Ty::Bad`] means a diagnostic
//! was already recorded for the expression, and callers stay quiet about it.
//!
//! Arithmetic is `int`-only: both operands of `+ - * /` and the operand of a
//! unary sign must be `int`. Relational operators are legal only where a
//! condition is expected, see [`Checker::check_cond_expr`].

use super::check::Checker;
use super::types::Ty;
use crate::diagnostics::ErrorKind;
use crate::parser::ast::*;

impl Checker<'_> {
    pub(crate) fn check_expr(&mut self, expr: ExprId) -> Ty {
        let arena = self.arena;
        let node = &arena.exprs[expr];

        match &node.kind {
            ExprKind::Bad => Ty::Bad,
            ExprKind::Ident(name) => self.check_ident_expr(name, node),
            ExprKind::BasicLit { kind, text } => self.check_basic_lit(*kind, text, node),
            ExprKind::CompositeLit { .. } => {
                self.error(
                    node.pos.clone(),
                    ErrorKind::TypeMismatch,
                    "composite literal is only allowed as an array initializer",
                );
                Ty::Bad
            }
            ExprKind::Paren { inner } => self.check_expr(*inner),
            ExprKind::Index { .. } => self.check_index_expr(expr),
            ExprKind::Call { callee, args } => self.check_call_expr(node, *callee, args),
            ExprKind::Unary { op, operand } => {
                let sign = if *op == UnaryOp::Minus { "-" } else { "+" };
                let ty = self.check_expr(*operand);
                self.require_int(*operand, &ty, sign)
            }
            ExprKind::Binary { op, left, right } => {
                if op.is_relational() {
                    self.error(
                        node.pos.clone(),
                        ErrorKind::RelationalNotAllowed,
                        format!("operator {} is only allowed in a condition", op.symbol()),
                    );
                    self.check_expr(*left);
                    self.check_expr(*right);
                    return Ty::Bad;
                }

                let left_ty = self.check_expr(*left);
                let right_ty = self.check_expr(*right);
                let left_ty = self.require_int(*left, &left_ty, op.symbol());
                let right_ty = self.require_int(*right, &right_ty, op.symbol());
                if left_ty.is_bad() || right_ty.is_bad() {
                    Ty::Bad
                } else {
                    left_ty
                }
            }
        }
    }

    /// Report a non-`int` operand of `op`; yields `Int` or `Bad`.
    fn require_int(&mut self, operand: ExprId, ty: &Ty, op: &str) -> Ty {
        match ty {
            Ty::Bad => Ty::Bad,
            Ty::Int => Ty::Int,
            other => {
                let pos = self.arena.exprs[operand].pos.clone();
                self.error(
                    pos,
                    ErrorKind::TypeMismatch,
                    format!("invalid operand for {op}: expected int, found {other}"),
                );
                Ty::Bad
            }
        }
    }

    fn check_ident_expr(&mut self, name: &str, node: &Expr) -> Ty {
        match self.symbols.get_var(name) {
            Some(symbol) => Ty::from_node(self.arena, symbol.ty),
            None => {
                self.error(node.pos.clone(), ErrorKind::Undefine, format!("undefined: {name}"));
                Ty::Bad
            }
        }
    }

    /// Literals: `int` is always valid, char and string content is checked
    /// against the characters the language allows.
    pub(crate) fn check_basic_lit(&mut self, kind: LitKind, text: &str, node: &Expr) -> Ty {
        let (content, what, allowed): (&str, &str, fn(u8) -> bool) = match kind {
            LitKind::Int => return Ty::Int,
            LitKind::Char => (strip_quotes(text, '\''), "char", is_char_lit_byte),
            LitKind::String => (strip_quotes(text, '"'), "string", is_string_lit_byte),
        };

        if content.is_empty() {
            self.error(
                node.pos.clone(),
                ErrorKind::EmptyCharOrStringLit,
                format!("empty {what} literal"),
            );
            return Ty::Bad;
        }
        if let Some(bad) = disallowed_byte(content, kind, allowed) {
            self.error(
                node.pos.clone(),
                ErrorKind::EmptyCharOrStringLit,
                format!("{what} literal contains disallowed character {:?}", bad as char),
            );
            return Ty::Bad;
        }
        Ty::from_lit(kind)
    }

    /// Check a chain of index expressions down to its base array.
    ///
    /// The result is the array's innermost element type however many
    /// dimensions the chain covers; more indices than dimensions is an error.
    pub(crate) fn check_index_expr(&mut self, expr: ExprId) -> Ty {
        let arena = self.arena;

        let mut indices = Vec::new();
        let mut base = expr;
        while let ExprKind::Index { base: inner, index } = arena.exprs[base].kind {
            indices.push(index);
            base = inner;
        }
        indices.reverse();

        let mut indices_ok = true;
        for &index in &indices {
            let ty = self.check_expr(index);
            if !ty.is_bad() && ty != Ty::Int {
                let pos = arena.exprs[index].pos.clone();
                self.error(
                    pos,
                    ErrorKind::IndexTypeNotAllowed,
                    format!("invalid array index: expected int, found {ty}"),
                );
                indices_ok = false;
            }
        }

        let base_node = &arena.exprs[base];
        if !matches!(base_node.kind, ExprKind::Ident(_)) {
            if !self.check_expr(base).is_bad() {
                self.error(
                    base_node.pos.clone(),
                    ErrorKind::TypeMismatch,
                    "only array variables can be indexed",
                );
            }
            return Ty::Bad;
        }

        let base_ty = self.check_expr(base);
        if base_ty.is_bad() {
            return Ty::Bad;
        }
        let dims = base_ty.dims();
        if dims.is_empty() {
            self.error(
                base_node.pos.clone(),
                ErrorKind::TypeMismatch,
                format!("cannot index non-array value of type {base_ty}"),
            );
            return Ty::Bad;
        }
        if indices.len() > dims.len() {
            self.error(
                arena.exprs[expr].pos.clone(),
                ErrorKind::TypeMismatch,
                format!("too many indices for array of type {base_ty}"),
            );
            return Ty::Bad;
        }

        if indices_ok {
            base_ty.leaf().clone()
        } else {
            Ty::Bad
        }
    }

    fn check_call_expr(&mut self, node: &Expr, callee: ExprId, args: &[ExprId]) -> Ty {
        let arena = self.arena;
        let callee_node = &arena.exprs[callee];

        let ExprKind::Ident(name) = &callee_node.kind else {
            self.check_expr(callee);
            self.error(
                callee_node.pos.clone(),
                ErrorKind::TypeMismatch,
                "only functions can be called",
            );
            self.check_args(args);
            return Ty::Bad;
        };

        let Some(DeclKind::Func(func)) = self.symbols.get_func(name).map(|decl| &arena.decls[decl].kind) else {
            self.error(
                callee_node.pos.clone(),
                ErrorKind::Undefine,
                format!("undefined function: {name}"),
            );
            self.check_args(args);
            return Ty::Bad;
        };

        let return_ty = Ty::from_node(arena, func.return_type);
        let params = &func.params.fields;
        if args.len() != params.len() {
            self.error(
                node.pos.clone(),
                ErrorKind::ArgNumberNotMatched,
                format!(
                    "wrong argument count in call to {name}: have {}, want {}",
                    args.len(),
                    params.len()
                ),
            );
            self.check_args(args);
            return return_ty;
        }

        for (&arg, param) in args.iter().zip(params) {
            let arg_ty = self.check_expr(arg);
            let param_ty = Ty::from_node(arena, param.ty);
            if !arg_ty.is_bad() && !param_ty.is_bad() && arg_ty != param_ty {
                self.error(
                    arena.exprs[arg].pos.clone(),
                    ErrorKind::ArgTypeNotMatched,
                    format!(
                        "cannot use {arg_ty} value as {param_ty} argument {} in call to {name}",
                        param.name.name
                    ),
                );
            }
        }
        return_ty
    }

    fn check_args(&mut self, args: &[ExprId]) {
        for &arg in args {
            self.check_expr(arg);
        }
    }

    /// Conditions of `if`, `while` and `for` must be a relational comparison,
    /// optionally parenthesized.
    pub(crate) fn check_cond_expr(&mut self, cond: ExprId) {
        let arena = self.arena;
        let inner = arena.unparen(cond);

        match &arena.exprs[inner].kind {
            ExprKind::Binary { op, left, right } if op.is_relational() => {
                self.check_expr(*left);
                self.check_expr(*right);
            }
            ExprKind::Bad => {}
            _ => {
                self.check_expr(inner);
                self.error(
                    arena.exprs[cond].pos.clone(),
                    ErrorKind::CondValueNotMatched,
                    "condition must be a relational expression",
                );
            }
        }
    }

    /// Infer the type of a composite literal level by level.
    ///
    /// Every level must consist either entirely of nested literals with one
    /// common length, or entirely of `int`/`char` elements of one type. The
    /// result wraps that element type in one array per level.
    pub(crate) fn check_composite_lit(&mut self, lit: ExprId) -> Ty {
        let arena = self.arena;
        let lit_pos = arena.exprs[lit].pos.clone();

        let mut dims = Vec::new();
        let mut level = vec![lit];

        loop {
            let composite_items: Vec<&[ExprId]> = level
                .iter()
                .filter_map(|&e| match &arena.exprs[e].kind {
                    ExprKind::CompositeLit { items } => Some(items.as_slice()),
                    _ => None,
                })
                .collect();

            if composite_items.len() == level.len() {
                let size = composite_items[0].len();
                if composite_items.iter().any(|items| items.len() != size) {
                    self.error(
                        lit_pos,
                        ErrorKind::CompositeLitSizeError,
                        format!("composite literal rows differ in length at dimension {}", dims.len() + 1),
                    );
                    return Ty::Bad;
                }
                if size == 0 {
                    self.error(lit_pos, ErrorKind::CompositeLitSizeError, "empty composite literal");
                    return Ty::Bad;
                }
                dims.push(size);
                level = composite_items.concat();
                continue;
            }

            if !composite_items.is_empty() {
                self.error(
                    lit_pos,
                    ErrorKind::CompositeLitSizeError,
                    format!("composite literal mixes values and nested literals at dimension {}", dims.len() + 1),
                );
                return Ty::Bad;
            }

            return self.check_composite_elems(&level, &dims);
        }
    }

    /// The innermost level: elements of one basic type.
    fn check_composite_elems(&mut self, elems: &[ExprId], dims: &[usize]) -> Ty {
        let arena = self.arena;

        let mut elem_ty: Option<Ty> = None;
        let mut ok = true;
        for &elem in elems {
            let ty = self.check_expr(elem);
            if ty.is_bad() {
                ok = false;
                continue;
            }

            let pos = arena.exprs[elem].pos.clone();
            if !ty.is_basic() {
                self.error(
                    pos,
                    ErrorKind::CompositeLitSizeError,
                    format!("composite literal element must be int or char, found {ty}"),
                );
                ok = false;
                continue;
            }
            match &elem_ty {
                None => elem_ty = Some(ty),
                Some(first) if *first != ty => {
                    self.error(
                        pos,
                        ErrorKind::CompositeLitSizeError,
                        format!("composite literal mixes {first} and {ty} elements"),
                    );
                    ok = false;
                }
                Some(_) => {}
            }
        }

        match elem_ty {
            Some(ty) if ok => Ty::array_of(ty, dims),
            _ => Ty::Bad,
        }
    }
}

/// Strip the surrounding quotes from literal text; unterminated literals keep
/// whatever follows the opening quote.
fn strip_quotes(text: &str, quote: char) -> &str {
    let text = text.strip_prefix(quote).unwrap_or(text);
    text.strip_suffix(quote).unwrap_or(text)
}

/// First byte outside the allow-list. In strings the character after a
/// backslash belongs to an escape the lexer already validated.
fn disallowed_byte(content: &str, kind: LitKind, allowed: fn(u8) -> bool) -> Option<u8> {
    let mut bytes = content.bytes();
    while let Some(b) = bytes.next() {
        if kind == LitKind::String && b == b'\\' {
            bytes.next();
            continue;
        }
        if !allowed(b) {
            return Some(b);
        }
    }
    None
}

fn is_char_lit_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'+' | b'-' | b'*' | b'/')
}

fn is_string_lit_byte(b: u8) -> bool {
    (32..=126).contains(&b) && b != b'"'
}
