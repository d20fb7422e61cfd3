//! Scope-aware symbol table
//!
//! Variables live in a stack of code blocks, innermost last. Each block maps
//! the names declared directly in it to a symbol id; a parallel map from name
//! to a stack of ids keeps the innermost visible declaration on top, so a
//! lookup never walks the block stack. Functions share one flat table and
//! are never shadowed.
//!
//! Symbol ids come from a per-table counter and are never reused, not even
//! after the block that declared them is gone.

use crate::parser::ast::{DeclId, TypeId};
use rustc_hash::FxHashMap;

/// A declared variable or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub unique_id: u32,
    pub name: String,
    /// Declared type, as a node of the file's arena.
    pub ty: TypeId,
    pub is_const: bool,
}

#[derive(Debug)]
pub struct SymbolTable {
    /// Names declared directly in each open block; index 0 is the global block.
    blocks: Vec<FxHashMap<String, u32>>,
    /// Shadow stack per name; the last id is the visible one.
    name_to_symbol: FxHashMap<String, Vec<u32>>,
    id_to_symbol: FxHashMap<u32, Symbol>,
    funcs: FxHashMap<String, DeclId>,
    next_unique_id: u32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            blocks: vec![FxHashMap::default()],
            name_to_symbol: FxHashMap::default(),
            id_to_symbol: FxHashMap::default(),
            funcs: FxHashMap::default(),
            next_unique_id: 0,
        }
    }

    /// Number of open blocks, the global block included.
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_global(&self) -> bool {
        self.blocks.len() == 1
    }

    pub fn create_code_block(&mut self) {
        self.blocks.push(FxHashMap::default());
        tracing::debug!(depth = self.depth(), "create code block");
    }

    /// Close the innermost block and forget everything declared in it.
    ///
    /// The global block is never closed.
    pub fn destroy_code_block(&mut self) {
        if self.blocks.len() <= 1 {
            return;
        }
        let Some(block) = self.blocks.pop() else {
            return;
        };

        for (name, id) in block {
            if let Some(stack) = self.name_to_symbol.get_mut(&name) {
                stack.pop();
                if stack.is_empty() {
                    self.name_to_symbol.remove(&name);
                }
            }
            self.id_to_symbol.remove(&id);
        }
        tracing::debug!(depth = self.depth(), "destroy code block");
    }

    /// Declare a variable in the innermost block.
    ///
    /// Returns the new symbol id, or `None` when the name is already declared
    /// in that block (the table is left unchanged).
    pub fn add_var(&mut self, name: &str, ty: TypeId, is_const: bool) -> Option<u32> {
        if self.exists_in_current_block(name) {
            return None;
        }

        let unique_id = self.next_unique_id;
        self.next_unique_id += 1;

        let block = self.blocks.last_mut()?;
        block.insert(name.to_string(), unique_id);
        self.name_to_symbol
            .entry(name.to_string())
            .or_default()
            .push(unique_id);
        self.id_to_symbol.insert(
            unique_id,
            Symbol {
                unique_id,
                name: name.to_string(),
                ty,
                is_const,
            },
        );

        tracing::debug!(name, unique_id, is_const, depth = self.depth(), "add symbol");
        Some(unique_id)
    }

    /// Innermost visible declaration of `name`.
    pub fn get_var(&self, name: &str) -> Option<&Symbol> {
        let id = self.name_to_symbol.get(name)?.last()?;
        self.id_to_symbol.get(id)
    }

    pub fn get_by_id(&self, unique_id: u32) -> Option<&Symbol> {
        self.id_to_symbol.get(&unique_id)
    }

    pub fn exists_in_current_block(&self, name: &str) -> bool {
        self.blocks
            .last()
            .is_some_and(|block| block.contains_key(name))
    }

    /// Register a function. Returns false if the name is already a function.
    pub fn add_func(&mut self, name: &str, decl: DeclId) -> bool {
        if self.funcs.contains_key(name) {
            return false;
        }
        self.funcs.insert(name.to_string(), decl);
        true
    }

    pub fn get_func(&self, name: &str) -> Option<DeclId> {
        self.funcs.get(name).copied()
    }

    /// Number of currently visible variable symbols.
    pub fn visible_count(&self) -> usize {
        self.id_to_symbol.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{AstArena, DeclKind, TypeKind};
    use crate::parser::position::Position;

    fn types() -> (AstArena, TypeId, TypeId) {
        let mut arena = AstArena::new();
        let int = arena.alloc_type(TypeKind::Int, Position::unknown());
        let char = arena.alloc_type(TypeKind::Char, Position::unknown());
        (arena, int, char)
    }

    #[test]
    fn test_shadowing_is_scoped() {
        let (_, int, char) = types();
        let mut table = SymbolTable::new();

        let outer = table.add_var("x", int, false).unwrap();
        table.create_code_block();
        let inner = table.add_var("x", char, false).unwrap();
        assert_ne!(outer, inner);
        assert_eq!(table.get_var("x").unwrap().ty, char);

        table.destroy_code_block();
        let visible = table.get_var("x").unwrap();
        assert_eq!(visible.unique_id, outer);
        assert_eq!(visible.ty, int);
    }

    #[test]
    fn test_redefinition_in_same_block_is_refused() {
        let (_, int, char) = types();
        let mut table = SymbolTable::new();

        assert!(table.add_var("a", int, false).is_some());
        assert!(table.add_var("a", char, true).is_none());
        let a = table.get_var("a").unwrap();
        assert_eq!(a.ty, int);
        assert!(!a.is_const);
    }

    #[test]
    fn test_destroy_removes_every_symbol_of_the_block() {
        let (_, int, _) = types();
        let mut table = SymbolTable::new();
        table.add_var("g", int, false);

        table.create_code_block();
        table.add_var("a", int, false);
        table.add_var("b", int, false);
        table.add_var("g", int, true);
        assert_eq!(table.visible_count(), 4);

        table.destroy_code_block();
        assert!(table.get_var("a").is_none());
        assert!(table.get_var("b").is_none());
        assert!(!table.get_var("g").unwrap().is_const);
        assert_eq!(table.visible_count(), 1);
    }

    #[test]
    fn test_unique_ids_are_never_reused() {
        let (_, int, _) = types();
        let mut table = SymbolTable::new();

        table.create_code_block();
        let first = table.add_var("a", int, false).unwrap();
        table.destroy_code_block();
        assert!(table.get_by_id(first).is_none());

        table.create_code_block();
        let second = table.add_var("a", int, false).unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_global_block_is_never_destroyed() {
        let (_, int, _) = types();
        let mut table = SymbolTable::new();
        table.add_var("g", int, false);
        table.destroy_code_block();
        assert_eq!(table.depth(), 1);
        assert!(table.get_var("g").is_some());
    }

    #[test]
    fn test_function_table_is_flat() {
        let mut arena = AstArena::new();
        let decl = arena.alloc_decl(DeclKind::Bad, Position::unknown());
        let mut table = SymbolTable::new();

        assert!(table.add_func("f", decl));
        assert!(!table.add_func("f", decl));
        table.create_code_block();
        table.create_code_block();
        assert_eq!(table.get_func("f"), Some(decl));
        assert!(table.get_var("f").is_none());
    }
}
