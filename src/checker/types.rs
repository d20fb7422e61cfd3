//! Checker-side types
//!
//! [`Ty`] is a self-contained copy of a declared type node, so types inferred
//! for expressions can be built and compared without touching the arena.

use crate::parser::ast::{AstArena, LitKind, TypeId, TypeKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ty {
    /// Placeholder after an error; never reported again.
    Bad,
    Void,
    Int,
    Char,
    String,
    Array { elem: Box<Ty>, size: usize },
}

impl Ty {
    /// Resolve a declared type node.
    pub fn from_node(arena: &AstArena, id: TypeId) -> Ty {
        match &arena.types[id].kind {
            TypeKind::Bad => Ty::Bad,
            TypeKind::Void => Ty::Void,
            TypeKind::Int => Ty::Int,
            TypeKind::Char => Ty::Char,
            TypeKind::String => Ty::String,
            TypeKind::Array { elem, size } => Ty::Array {
                elem: Box::new(Ty::from_node(arena, *elem)),
                size: *size,
            },
        }
    }

    pub fn from_lit(kind: LitKind) -> Ty {
        match kind {
            LitKind::Int => Ty::Int,
            LitKind::Char => Ty::Char,
            LitKind::String => Ty::String,
        }
    }

    /// Wrap `leaf` in one array per size, outermost first.
    pub fn array_of(leaf: Ty, dims: &[usize]) -> Ty {
        dims.iter().rev().fold(leaf, |elem, &size| Ty::Array {
            elem: Box::new(elem),
            size,
        })
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, Ty::Bad)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array { .. })
    }

    /// `int` or `char`.
    pub fn is_basic(&self) -> bool {
        matches!(self, Ty::Int | Ty::Char)
    }

    /// Dimension sizes, outermost first; empty for non-arrays.
    pub fn dims(&self) -> Vec<usize> {
        let mut dims = Vec::new();
        let mut ty = self;
        while let Ty::Array { elem, size } = ty {
            dims.push(*size);
            ty = &**elem;
        }
        dims
    }

    /// Innermost element type; the type itself for non-arrays.
    pub fn leaf(&self) -> &Ty {
        let mut ty = self;
        while let Ty::Array { elem, .. } = ty {
            ty = &**elem;
        }
        ty
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Bad => write!(f, "<invalid>"),
            Ty::Void => write!(f, "void"),
            Ty::Int => write!(f, "int"),
            Ty::Char => write!(f, "char"),
            Ty::String => write!(f, "string"),
            Ty::Array { .. } => {
                write!(f, "{}", self.leaf())?;
                for size in self.dims() {
                    write!(f, "[{size}]")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::position::Position;

    #[test]
    fn test_from_node_preserves_dimension_order() {
        let mut arena = AstArena::new();
        let int = arena.alloc_type(TypeKind::Int, Position::unknown());
        let row = arena.alloc_type(TypeKind::Array { elem: int, size: 3 }, Position::unknown());
        let grid = arena.alloc_type(TypeKind::Array { elem: row, size: 2 }, Position::unknown());

        let ty = Ty::from_node(&arena, grid);
        assert_eq!(ty.dims(), vec![2, 3]);
        assert_eq!(ty.leaf(), &Ty::Int);
        assert_eq!(ty, Ty::array_of(Ty::Int, &[2, 3]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ty::array_of(Ty::Char, &[4, 5]).to_string(), "char[4][5]");
        assert_eq!(Ty::Int.to_string(), "int");
    }

    #[test]
    fn test_shape_comparison() {
        assert_ne!(Ty::array_of(Ty::Int, &[2, 3]), Ty::array_of(Ty::Int, &[3, 2]));
        assert_ne!(Ty::array_of(Ty::Int, &[2]), Ty::array_of(Ty::Char, &[2]));
        assert!(Ty::array_of(Ty::Int, &[]).is_basic());
    }
}
