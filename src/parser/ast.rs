//! AST definitions for simple-lang
//!
//! All nodes live in one [`AstArena`] owned by the [`File`] they were parsed
//! from and are addressed by typed indices ([`TypeId`], [`ExprId`],
//! [`StmtId`], [`DeclId`]). Nothing holds a pointer into the tree: the
//! checker's symbol table stores indices, so the arena is the single owner for
//! the lifetime of one compilation.
//!
//! Every node carries the [`Position`] of its leftmost token. `Bad` variants
//! are placeholders for productions that could not be completed and have no
//! children.

use super::position::Position;
use la_arena::{Arena, Idx};

pub type TypeId = Idx<TypeNode>;
pub type ExprId = Idx<Expr>;
pub type StmtId = Idx<Stmt>;
pub type DeclId = Idx<Decl>;

/// A node kind paired with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K> {
    pub kind: K,
    pub pos: Position,
}

pub type TypeNode = Node<TypeKind>;
pub type Expr = Node<ExprKind>;
pub type Stmt = Node<StmtKind>;
pub type Decl = Node<DeclKind>;

// ===== Types =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Bad,
    Void,
    Int,
    Char,
    String,
    /// Fixed-size array; `int a[2][3]` is `Array { Array { Int, 3 }, 2 }`.
    Array { elem: TypeId, size: usize },
}

// ===== Expressions =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lss,
    Leq,
    Gre,
    Geq,
    Eql,
    Neq,
}

impl BinaryOp {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Lss | BinaryOp::Leq | BinaryOp::Gre | BinaryOp::Geq | BinaryOp::Eql | BinaryOp::Neq
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lss => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Gre => ">",
            BinaryOp::Geq => ">=",
            BinaryOp::Eql => "==",
            BinaryOp::Neq => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Bad,
    Ident(String),
    /// `text` is the literal as written; char and string literals keep their quotes.
    BasicLit { kind: LitKind, text: String },
    /// Brace-delimited initializer, nested once per array dimension.
    CompositeLit { items: Vec<ExprId> },
    Paren { inner: ExprId },
    Index { base: ExprId, index: ExprId },
    Call { callee: ExprId, args: Vec<ExprId> },
    Unary { op: UnaryOp, operand: ExprId },
    Binary { op: BinaryOp, left: ExprId, right: ExprId },
}

// ===== Statements =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Bad,
    Empty,
    Decl(DeclId),
    Expr(ExprId),
    Assign {
        lhs: ExprId,
        rhs: ExprId,
    },
    Return {
        value: Option<ExprId>,
    },
    Block {
        stmts: Vec<StmtId>,
    },
    If {
        cond: ExprId,
        then: StmtId,
        else_: Option<StmtId>,
    },
    /// `cases` holds `Case` statements in source order.
    Switch {
        cond: ExprId,
        cases: Vec<StmtId>,
    },
    /// A `None` condition is the `default` clause.
    Case {
        cond: Option<ExprId>,
        body: Vec<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<StmtId>,
        step: Option<StmtId>,
        body: StmtId,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    Scan {
        target: ExprId,
    },
    Printf {
        args: Vec<ExprId>,
    },
}

// ===== Declarations =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub pos: Position,
    pub ty: TypeId,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    /// Position of the opening parenthesis.
    pub pos: Position,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub return_type: TypeId,
    pub name: Ident,
    pub params: FieldList,
    /// Always a `Block` statement.
    pub body: StmtId,
}

/// One declared name of a variable declaration; positioned at the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleVarDecl {
    pub is_const: bool,
    pub ty: TypeId,
    pub name: Ident,
    pub init: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Bad,
    Func(FuncDecl),
    /// `int a, b[3] = {1, 2, 3};`, each entry a `SingleVar` declaration.
    Var { decls: Vec<DeclId> },
    SingleVar(SingleVarDecl),
}

// ===== Arena and root =====

/// Owner of every node of one parsed file.
#[derive(Debug, Default)]
pub struct AstArena {
    pub types: Arena<TypeNode>,
    pub exprs: Arena<Expr>,
    pub stmts: Arena<Stmt>,
    pub decls: Arena<Decl>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_type(&mut self, kind: TypeKind, pos: Position) -> TypeId {
        self.types.alloc(Node { kind, pos })
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, pos: Position) -> ExprId {
        self.exprs.alloc(Node { kind, pos })
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, pos: Position) -> StmtId {
        self.stmts.alloc(Node { kind, pos })
    }

    pub fn alloc_decl(&mut self, kind: DeclKind, pos: Position) -> DeclId {
        self.decls.alloc(Node { kind, pos })
    }

    /// Skip any number of enclosing parentheses.
    pub fn unparen(&self, mut expr: ExprId) -> ExprId {
        while let ExprKind::Paren { inner } = self.exprs[expr].kind {
            expr = inner;
        }
        expr
    }

    pub fn is_bad_decl(&self, decl: DeclId) -> bool {
        matches!(self.decls[decl].kind, DeclKind::Bad)
    }
}

/// Root of one compiled unit.
#[derive(Debug)]
pub struct File {
    pub name: String,
    pub decls: Vec<DeclId>,
    pub arena: AstArena,
}

impl File {
    /// Function declarations in source order.
    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|&id| match &self.arena.decls[id].kind {
            DeclKind::Func(func) => Some(func),
            _ => None,
        })
    }

    pub fn bad_decl_count(&self) -> usize {
        self.decls.iter().filter(|&&id| self.arena.is_bad_decl(id)).count()
    }
}
