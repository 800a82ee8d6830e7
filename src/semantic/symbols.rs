//! Symbol table
//!
//! Every name declared in `main` is recorded once for the whole function:
//! declaring it again anywhere (even after the block that held it closed)
//! is a redeclaration. Visibility, on the other hand, follows blocks: a
//! name is only resolvable while the block that declared it is open.

use crate::parser::ast::{SourceLocation, Type};
use rustc_hash::{FxHashMap, FxHashSet};

/// A declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub location: SourceLocation,
    /// Block nesting depth of the declaration (0 = main body)
    pub depth: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, Symbol>,
    // Declaration order, for display
    order: Vec<String>,
    visible: FxHashSet<String>,
    scopes: Vec<Vec<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Close the innermost block; its names stop resolving.
    pub fn exit_scope(&mut self) {
        if let Some(names) = self.scopes.pop() {
            for name in names {
                self.visible.remove(&name);
            }
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    /// Declare a name in the innermost scope.
    ///
    /// On a clash, returns the previous symbol.
    pub fn declare(&mut self, name: &str, ty: Type, location: SourceLocation) -> Result<(), &Symbol> {
        if self.symbols.contains_key(name) {
            return Err(&self.symbols[name]);
        }

        let symbol = Symbol {
            name: name.to_string(),
            ty,
            location,
            depth: self.depth(),
        };
        self.symbols.insert(name.to_string(), symbol);
        self.order.push(name.to_string());
        self.visible.insert(name.to_string());
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(name.to_string());
        }
        Ok(())
    }

    /// Resolve a name visible from the current scope
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        if self.visible.contains(name) {
            self.symbols.get(name)
        } else {
            None
        }
    }

    /// All symbols ever declared, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.symbols.get(name))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> SourceLocation {
        SourceLocation::new(line, 1)
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        assert!(table.declare("x", Type::Int, loc(1)).is_ok());

        let symbol = table.lookup("x").unwrap();
        assert_eq!(symbol.ty, Type::Int);
        assert_eq!(symbol.depth, 0);
        assert!(table.lookup("y").is_none());
    }

    #[test]
    fn test_redeclaration_reports_previous() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.declare("x", Type::Int, loc(1)).unwrap();

        let previous = table.declare("x", Type::Float, loc(4)).unwrap_err();
        assert_eq!(previous.location, loc(1));
    }

    #[test]
    fn test_block_visibility() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.declare("outer", Type::Int, loc(1)).unwrap();

        table.enter_scope();
        table.declare("inner", Type::Float, loc(2)).unwrap();
        assert_eq!(table.lookup("inner").map(|s| s.depth), Some(1));
        assert!(table.lookup("outer").is_some());
        table.exit_scope();

        assert!(table.lookup("inner").is_none());
        assert!(table.lookup("outer").is_some());
        // Names stay reserved for the whole function
        assert!(table.declare("inner", Type::Int, loc(5)).is_err());
        assert_eq!(table.len(), 2);
    }
}
