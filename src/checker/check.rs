//! Checker state and declaration checks
//!
//! The [`Checker`] walks a parsed [`File`] once, top-down. It owns the
//! [`SymbolTable`] for the whole walk and records every problem in the shared
//! [`ErrorReminder`]; after a diagnostic it yields [`Ty::Bad`] or skips the
//! offending subtree and carries on with the siblings.
//!
//! Statement checks live in `statements`, expression type inference in
//! `expressions`, both as further `impl Checker` blocks.

use super::symbols::SymbolTable;
use super::types::Ty;
use crate::diagnostics::{ErrorKind, ErrorReminder};
use crate::parser::ast::*;
use crate::parser::position::Position;

/// Return-type bookkeeping for the function being checked.
#[derive(Debug)]
pub(crate) struct FuncContext {
    pub(crate) name: String,
    pub(crate) return_ty: Ty,
    /// Whether a `return` with a value has been seen.
    pub(crate) returns_value: bool,
}

pub struct Checker<'a> {
    pub(crate) file: &'a File,
    pub(crate) arena: &'a AstArena,
    pub(crate) errors: &'a mut ErrorReminder,
    pub(crate) symbols: SymbolTable,
    pub(crate) current_func: Option<FuncContext>,
}

impl<'a> Checker<'a> {
    pub fn new(file: &'a File, errors: &'a mut ErrorReminder) -> Self {
        Self {
            file,
            arena: &file.arena,
            errors,
            symbols: SymbolTable::new(),
            current_func: None,
        }
    }

    /// Check every top-level declaration, then require a `main` function.
    ///
    /// Returns the symbol table as left after the walk: globals and functions.
    pub fn check(mut self) -> SymbolTable {
        let file = self.file;
        for &decl in &file.decls {
            self.check_root_decl(decl);
        }

        // A file with bad declarations may have lost its main to a syntax error.
        if self.symbols.get_func("main").is_none() && file.bad_decl_count() == 0 {
            self.error(
                Position::unknown(),
                ErrorKind::MissingMain,
                format!("{}: function main is undeclared", file.name),
            );
        }

        self.symbols
    }

    fn check_root_decl(&mut self, decl: DeclId) {
        let arena = self.arena;
        match &arena.decls[decl].kind {
            DeclKind::Func(func) => self.check_func_decl(decl, func),
            DeclKind::Var { decls } => self.check_var_decl(decls),
            DeclKind::SingleVar(single) => self.check_single_var_decl(single),
            DeclKind::Bad => {}
        }
    }

    fn check_func_decl(&mut self, decl: DeclId, func: &FuncDecl) {
        let name = &func.name;
        let arena = self.arena;

        if self.symbols.get_func(&name.name).is_some() || self.symbols.get_var(&name.name).is_some() {
            self.error(
                name.pos.clone(),
                ErrorKind::Redefine,
                format!("{} redeclared in this block", name.name),
            );
            return;
        }
        self.symbols.add_func(&name.name, decl);

        let return_ty = Ty::from_node(arena, func.return_type);
        tracing::debug!(name = %name.name, %return_ty, params = func.params.fields.len(), "check function");

        self.symbols.create_code_block();
        for field in &func.params.fields {
            if Ty::from_node(arena, field.ty).is_bad() {
                continue;
            }
            if self.symbols.add_var(&field.name.name, field.ty, false).is_none() {
                self.error(
                    field.name.pos.clone(),
                    ErrorKind::Redefine,
                    format!("duplicate argument {}", field.name.name),
                );
            }
        }

        self.current_func = Some(FuncContext {
            name: name.name.clone(),
            return_ty: return_ty.clone(),
            returns_value: false,
        });

        // Parameters and body statements share one block.
        if let StmtKind::Block { stmts } = &arena.stmts[func.body].kind {
            for &stmt in stmts {
                self.check_stmt(stmt);
            }
        }

        if let Some(ctx) = self.current_func.take() {
            if ctx.return_ty != Ty::Void && !ctx.return_ty.is_bad() && !ctx.returns_value {
                self.error(
                    name.pos.clone(),
                    ErrorKind::ReturnValueRequired,
                    format!("missing return in function {} returning {}", ctx.name, ctx.return_ty),
                );
            }
        }
        self.symbols.destroy_code_block();
    }

    pub(crate) fn check_var_decl(&mut self, decls: &[DeclId]) {
        let arena = self.arena;
        for &decl in decls {
            if let DeclKind::SingleVar(single) = &arena.decls[decl].kind {
                self.check_single_var_decl(single);
            }
        }
    }

    fn check_single_var_decl(&mut self, single: &SingleVarDecl) {
        let ty = Ty::from_node(self.arena, single.ty);
        let name = &single.name;

        let clashes_with_func = self.symbols.is_global() && self.symbols.get_func(&name.name).is_some();
        if clashes_with_func || self.symbols.add_var(&name.name, single.ty, single.is_const).is_none() {
            self.error(
                name.pos.clone(),
                ErrorKind::Redefine,
                format!("{} redeclared in this block", name.name),
            );
            return;
        }

        let Some(init) = single.init else {
            return;
        };
        if ty.is_array() {
            self.check_array_init(&ty, init);
        } else {
            self.check_basic_init(&ty, init);
        }
    }

    fn check_basic_init(&mut self, ty: &Ty, init: ExprId) {
        let arena = self.arena;
        let init_node = &arena.exprs[init];
        if matches!(init_node.kind, ExprKind::CompositeLit { .. }) {
            self.error(
                init_node.pos.clone(),
                ErrorKind::TypeMismatch,
                format!("cannot use composite literal as {ty} value"),
            );
            return;
        }

        let init_ty = self.check_expr(init);
        if !init_ty.is_bad() && &init_ty != ty {
            self.error(
                init_node.pos.clone(),
                ErrorKind::TypeMismatch,
                format!("cannot use {init_ty} value as {ty} value in initializer"),
            );
        }
    }

    fn check_array_init(&mut self, ty: &Ty, init: ExprId) {
        let arena = self.arena;
        let init_node = &arena.exprs[init];
        if !matches!(init_node.kind, ExprKind::CompositeLit { .. }) {
            self.check_expr(init);
            self.error(
                init_node.pos.clone(),
                ErrorKind::CompositeLitSizeError,
                format!("array of type {ty} must be initialized with a composite literal"),
            );
            return;
        }

        let lit_ty = self.check_composite_lit(init);
        if !lit_ty.is_bad() && &lit_ty != ty {
            self.error(
                init_node.pos.clone(),
                ErrorKind::CompositeLitSizeError,
                format!("composite literal of type {lit_ty} does not match {ty}"),
            );
        }
    }

    pub(crate) fn error(&mut self, pos: Position, kind: ErrorKind, message: impl Into<String>) {
        self.errors.add(pos, kind, message);
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorKind;
    use crate::{compile, Compilation};

    fn kinds(src: &str) -> Vec<ErrorKind> {
        let Compilation { errors, .. } = compile("t.c", src);
        errors.kinds()
    }

    #[test]
    fn test_clean_program() {
        let src = "const int N = 3;\nint g[3] = {1, 2, 3};\nint sum(int n) { return n + N; }\nvoid main() { int x; x = sum(g[0]); }";
        assert_eq!(kinds(src), vec![]);
    }

    #[test]
    fn test_missing_main() {
        assert_eq!(kinds("int a;"), vec![ErrorKind::MissingMain]);
    }

    #[test]
    fn test_basic_initializer_must_match_exactly() {
        assert_eq!(
            kinds("int a = 'c';\nchar b = 1;\nvoid main() {}"),
            vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]
        );
    }

    #[test]
    fn test_function_and_global_share_a_namespace() {
        assert_eq!(
            kinds("int f;\nvoid f() {}\nvoid g() {}\nint g;\nvoid main() {}"),
            vec![ErrorKind::Redefine, ErrorKind::Redefine]
        );
    }

    #[test]
    fn test_missing_return_value() {
        let src = "int f() { int a; a = 1; }\nvoid main() {}";
        let Compilation { errors, .. } = compile("t.c", src);
        let diag = errors.iter().next().expect("diagnostic");
        assert_eq!(diag.kind, ErrorKind::ReturnValueRequired);
        assert_eq!((diag.pos.line, diag.pos.column), (1, 5));
    }

    #[test]
    fn test_duplicate_parameter() {
        assert_eq!(
            kinds("void f(int a, char a) {}\nvoid main() {}"),
            vec![ErrorKind::Redefine]
        );
    }
}
