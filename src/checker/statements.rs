//! Statement checks
//!
//! A nested block opens its own code block; the statements of a function
//! body share the block that holds the parameters, and `case` bodies share
//! the scope around their `switch`.

use super::check::Checker;
use super::types::Ty;
use crate::diagnostics::ErrorKind;
use crate::parser::ast::*;
use crate::parser::position::Position;

impl Checker<'_> {
    pub(crate) fn check_stmt(&mut self, stmt: StmtId) {
        let arena = self.arena;
        let node = &arena.stmts[stmt];

        match &node.kind {
            StmtKind::Bad | StmtKind::Empty => {}
            StmtKind::Decl(decl) => match &arena.decls[*decl].kind {
                DeclKind::Var { decls } => self.check_var_decl(decls),
                DeclKind::SingleVar(_) => self.check_var_decl(&[*decl]),
                DeclKind::Func(_) | DeclKind::Bad => {}
            },
            StmtKind::Expr(expr) => {
                self.check_expr(*expr);
            }
            StmtKind::Assign { lhs, rhs } => self.check_assign_stmt(*lhs, *rhs),
            StmtKind::Return { value } => self.check_return_stmt(&node.pos, *value),
            StmtKind::Block { stmts } => {
                self.symbols.create_code_block();
                for &stmt in stmts {
                    self.check_stmt(stmt);
                }
                self.symbols.destroy_code_block();
            }
            StmtKind::If { cond, then, else_ } => {
                self.check_cond_expr(*cond);
                self.check_stmt(*then);
                if let Some(else_) = else_ {
                    self.check_stmt(*else_);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_cond_expr(*cond);
                self.check_stmt(*body);
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.check_stmt(*init);
                }
                if let Some(cond) = cond {
                    self.check_for_cond(*cond);
                }
                if let Some(step) = step {
                    self.check_stmt(*step);
                }
                self.check_stmt(*body);
            }
            StmtKind::Switch { cond, cases } => self.check_switch_stmt(&node.pos, *cond, cases),
            // Case clauses are walked by the switch check.
            StmtKind::Case { .. } => {}
            StmtKind::Scan { target } => self.check_scan_stmt(*target),
            StmtKind::Printf { args } => self.check_printf_stmt(&node.pos, args),
        }
    }

    /// The `for` condition is a simple statement; only an expression holding
    /// a relational comparison is accepted.
    fn check_for_cond(&mut self, cond: StmtId) {
        let arena = self.arena;
        match &arena.stmts[cond].kind {
            StmtKind::Expr(expr) => self.check_cond_expr(*expr),
            _ => {
                self.check_stmt(cond);
                self.error(
                    arena.stmts[cond].pos.clone(),
                    ErrorKind::CondValueNotMatched,
                    "for condition must be a relational expression",
                );
            }
        }
    }

    fn check_assign_stmt(&mut self, lhs: ExprId, rhs: ExprId) {
        let arena = self.arena;
        let lhs_node = &arena.exprs[lhs];

        match &lhs_node.kind {
            ExprKind::Ident(name) => {
                if let Some(symbol) = self.symbols.get_var(name) {
                    let is_const = symbol.is_const;
                    let ty = Ty::from_node(arena, symbol.ty);
                    if is_const {
                        self.error(
                            lhs_node.pos.clone(),
                            ErrorKind::UpdateConstValue,
                            format!("cannot assign to {name} (declared const)"),
                        );
                    } else if ty.is_array() {
                        self.error(
                            lhs_node.pos.clone(),
                            ErrorKind::TypeMismatch,
                            format!("cannot assign to array {name}"),
                        );
                    }
                } else {
                    self.check_expr(lhs);
                }
            }
            ExprKind::Index { .. } => {
                let elem_ty = self.check_index_expr(lhs);
                if !elem_ty.is_bad() {
                    let base = index_base(arena, lhs);
                    if let ExprKind::Ident(name) = &arena.exprs[base].kind {
                        if self.symbols.get_var(name).is_some_and(|s| s.is_const) {
                            self.error(
                                lhs_node.pos.clone(),
                                ErrorKind::UpdateConstValue,
                                format!("cannot assign to element of {name} (declared const)"),
                            );
                        }
                    }
                }
            }
            _ => {
                self.check_expr(lhs);
                self.error(
                    lhs_node.pos.clone(),
                    ErrorKind::TypeMismatch,
                    "cannot assign to expression",
                );
            }
        }

        self.check_expr(rhs);
    }

    fn check_return_stmt(&mut self, pos: &Position, value: Option<ExprId>) {
        let Some(ctx) = self.current_func.as_ref() else {
            return;
        };
        let return_ty = ctx.return_ty.clone();
        let func = ctx.name.clone();

        match value {
            Some(value) if return_ty == Ty::Void => {
                self.check_expr(value);
                self.error(
                    pos.clone(),
                    ErrorKind::ReturnValueNotAllowed,
                    format!("too many return values: {func} returns void"),
                );
            }
            Some(value) => {
                let ty = self.check_expr(value);
                if !ty.is_bad() && !return_ty.is_bad() && ty != return_ty {
                    let value_pos = self.arena.exprs[value].pos.clone();
                    self.error(
                        value_pos,
                        ErrorKind::TypeMismatch,
                        format!("cannot use {ty} value as {return_ty} value in return statement"),
                    );
                }
                if let Some(ctx) = self.current_func.as_mut() {
                    ctx.returns_value = true;
                }
            }
            None if return_ty != Ty::Void && !return_ty.is_bad() => {
                self.error(
                    pos.clone(),
                    ErrorKind::ReturnValueRequired,
                    format!("not enough return values: {func} returns {return_ty}"),
                );
            }
            None => {}
        }
    }

    fn check_switch_stmt(&mut self, pos: &Position, cond: ExprId, cases: &[StmtId]) {
        let arena = self.arena;

        let cond_ty = self.check_expr(cond);
        if !cond_ty.is_bad() && !cond_ty.is_basic() {
            self.error(
                arena.exprs[cond].pos.clone(),
                ErrorKind::SwitchTypeError,
                format!("switch on {cond_ty} value; expected int or char"),
            );
        }

        let mut has_default = false;
        for &case in cases {
            let case_node = &arena.stmts[case];
            let StmtKind::Case { cond: label, body } = &case_node.kind else {
                continue;
            };

            match label {
                Some(label) => {
                    let label_ty = self.check_expr(*label);
                    if !label_ty.is_bad() && cond_ty.is_basic() && label_ty != cond_ty {
                        self.error(
                            arena.exprs[*label].pos.clone(),
                            ErrorKind::SwitchTypeError,
                            format!("case of type {label_ty} in switch on {cond_ty}"),
                        );
                    }
                }
                None if has_default => {
                    self.error(
                        case_node.pos.clone(),
                        ErrorKind::DuplicateDefault,
                        "multiple defaults in switch",
                    );
                    return;
                }
                None => has_default = true,
            }

            for &stmt in body {
                self.check_stmt(stmt);
            }
        }

        if !has_default {
            self.error(pos.clone(), ErrorKind::DefaultExpected, "switch is missing a default case");
        }
    }

    /// `scanf` reads into a plain, writable variable.
    fn check_scan_stmt(&mut self, target: ExprId) {
        let arena = self.arena;
        let node = &arena.exprs[target];

        let ExprKind::Ident(name) = &node.kind else {
            self.check_expr(target);
            self.error(
                node.pos.clone(),
                ErrorKind::TypeMismatch,
                "scanf target must be a variable",
            );
            return;
        };

        let ty = self.check_expr(target);
        if ty.is_bad() {
            return;
        }
        if ty.is_array() {
            self.error(
                node.pos.clone(),
                ErrorKind::TypeMismatch,
                format!("scanf target {name} is an array"),
            );
        } else if self.symbols.get_var(name).is_some_and(|s| s.is_const) {
            self.error(
                node.pos.clone(),
                ErrorKind::UpdateConstValue,
                format!("cannot scanf into {name} (declared const)"),
            );
        }
    }

    /// `printf(str)`, `printf(str, expr)` or `printf(expr)`.
    fn check_printf_stmt(&mut self, pos: &Position, args: &[ExprId]) {
        let arena = self.arena;

        if args.is_empty() || args.len() > 2 {
            self.error(
                pos.clone(),
                ErrorKind::ArgNumberNotMatched,
                format!("printf takes one or two arguments, have {}", args.len()),
            );
        }

        for (i, &arg) in args.iter().enumerate() {
            let node = &arena.exprs[arg];
            if let ExprKind::BasicLit {
                kind: LitKind::String,
                text,
            } = &node.kind
            {
                self.check_basic_lit(LitKind::String, text, node);
                if i != 0 {
                    self.error(
                        node.pos.clone(),
                        ErrorKind::TypeMismatch,
                        "string literal is only allowed as the first printf argument",
                    );
                }
                continue;
            }

            if i == 0 && args.len() == 2 {
                self.error(
                    node.pos.clone(),
                    ErrorKind::TypeMismatch,
                    "first of two printf arguments must be a string literal",
                );
            }
            let ty = self.check_expr(arg);
            if !ty.is_bad() && !ty.is_basic() {
                self.error(
                    node.pos.clone(),
                    ErrorKind::TypeMismatch,
                    format!("cannot print {ty} value"),
                );
            }
        }
    }
}

/// Base expression of an index chain.
fn index_base(arena: &AstArena, mut expr: ExprId) -> ExprId {
    while let ExprKind::Index { base, .. } = arena.exprs[expr].kind {
        expr = base;
    }
    expr
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorKind;
    use crate::{compile, Compilation};

    /// Check `body` inside `void main() { ... }`.
    fn body_kinds(body: &str) -> Vec<ErrorKind> {
        let src = format!("void main() {{\n{body}\n}}");
        let Compilation { errors, .. } = compile("t.c", &src);
        errors.kinds()
    }

    #[test]
    fn test_assign_to_const_and_array() {
        assert_eq!(
            body_kinds("const int c = 1;\nint a[2];\nc = 2;\na = 1;"),
            vec![ErrorKind::UpdateConstValue, ErrorKind::TypeMismatch]
        );
    }

    #[test]
    fn test_assign_to_const_array_element() {
        assert_eq!(
            body_kinds("const int a[2] = {1, 2};\na[0] = 3;"),
            vec![ErrorKind::UpdateConstValue]
        );
    }

    #[test]
    fn test_conditions_must_be_relational() {
        assert_eq!(
            body_kinds("int a;\nif (a) a = 1;\nwhile ((a < 1)) a = 2;\nfor (a = 0; a = 1; a = a + 1) ;"),
            vec![ErrorKind::CondValueNotMatched, ErrorKind::CondValueNotMatched]
        );
    }

    #[test]
    fn test_relational_outside_condition() {
        assert_eq!(body_kinds("int a;\na = a < 1;"), vec![ErrorKind::RelationalNotAllowed]);
    }

    #[test]
    fn test_return_rules() {
        let src = "void f() { return 1; }\nint g() { return; }\nint h() { return 'c'; }\nvoid main() {}";
        let Compilation { errors, .. } = compile("t.c", src);
        assert_eq!(
            errors.kinds(),
            vec![
                ErrorKind::ReturnValueNotAllowed,
                ErrorKind::ReturnValueRequired,
                ErrorKind::ReturnValueRequired,
                ErrorKind::TypeMismatch,
            ]
        );
    }

    #[test]
    fn test_nested_return_counts() {
        let src = "int f(int a) { if (a > 0) { return 1; } else return 2; }\nvoid main() {}";
        let Compilation { errors, .. } = compile("t.c", src);
        assert!(errors.is_empty(), "{}", errors.render());
    }

    #[test]
    fn test_switch_types() {
        assert_eq!(
            body_kinds("int a;\nswitch (a) {\ncase 1: a = 1;\ncase 'c': a = 2;\ndefault: ;\n}"),
            vec![ErrorKind::SwitchTypeError]
        );
    }

    #[test]
    fn test_scanf_targets() {
        assert_eq!(
            body_kinds("int a[2];\nconst char c = 'x';\nscanf(a);\nscanf(c);\nscanf(b);"),
            vec![
                ErrorKind::TypeMismatch,
                ErrorKind::UpdateConstValue,
                ErrorKind::Undefine
            ]
        );
    }

    #[test]
    fn test_printf_forms() {
        assert_eq!(body_kinds("int a;\nprintf(\"a = \", a);\nprintf(a);\nprintf(\"done\");"), vec![]);
        assert_eq!(
            body_kinds("int a;\nprintf(a, \"x\");"),
            vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]
        );
    }

    #[test]
    fn test_case_bodies_share_the_switch_scope() {
        assert_eq!(
            body_kinds("int a;\nswitch (a) {\ncase 1: a = 1;\ndefault: int a;\n}"),
            vec![ErrorKind::Redefine]
        );
    }

    #[test]
    fn test_case_bodies_checked_once() {
        use crate::compile_into;
        use crate::diagnostics::{Diagnostic, ErrorReminder};
        use std::cell::RefCell;
        use std::rc::Rc;

        // The sink sees diagnostics before same-position dedup.
        let raised = Rc::new(RefCell::new(Vec::new()));
        let captured = Rc::clone(&raised);
        let errors = ErrorReminder::with_sink(move |d: &Diagnostic| captured.borrow_mut().push(d.kind));

        let src = "void main() {\nint a;\nswitch (a) {\ncase 1: a = x;\ndefault: a = y;\n}\n}";
        compile_into("t.c", src, errors);
        assert_eq!(*raised.borrow(), vec![ErrorKind::Undefine, ErrorKind::Undefine]);
    }
}
