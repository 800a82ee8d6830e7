//! Variable store
//!
//! An [`Environment`] is created empty when `main` starts, gains a slot per
//! executed declaration and is dropped when the run ends. It is owned by one
//! interpreter (or VM) and threaded through evaluation explicitly.

use super::value::Value;
use crate::parser::ast::{SourceLocation, Type};
use rustc_hash::FxHashMap;

/// A declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub var_type: Type,
    pub value: Value,
    pub declared_at: SourceLocation,
}

/// Mapping from variable name to its current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    slots: FxHashMap<String, Slot>,
    // Declaration order, for display
    order: Vec<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or re-declare, on a later loop iteration) a variable.
    /// The value is converted to the declared type.
    pub fn declare(&mut self, name: &str, var_type: Type, value: Value, declared_at: SourceLocation) {
        let slot = Slot {
            var_type,
            value: value.convert_to(var_type),
            declared_at,
        };
        if self.slots.insert(name.to_string(), slot).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Store into an existing variable, converting to its type.
    /// Returns the stored value, or `None` if the name was never declared.
    pub fn assign(&mut self, name: &str, value: Value) -> Option<Value> {
        let slot = self.slots.get_mut(name)?;
        slot.value = value.convert_to(slot.var_type);
        Some(slot.value)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots.get(name).map(|slot| slot.value)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Variables in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.order
            .iter()
            .filter_map(|name| self.slots.get(name).map(|slot| (name.as_str(), slot)))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> SourceLocation {
        SourceLocation::new(line, 5)
    }

    #[test]
    fn test_declare_and_assign() {
        let mut env = Environment::new();
        env.declare("x", Type::Int, Value::Int(0), loc(1));
        env.declare("result", Type::Float, Value::Int(10), loc(2));

        assert_eq!(env.get("result"), Some(Value::Float(10.0)));
        assert_eq!(env.assign("x", Value::Float(9.7)), Some(Value::Int(9)));
        assert_eq!(env.get("x"), Some(Value::Int(9)));
        assert_eq!(env.assign("missing", Value::Int(1)), None);
        assert_eq!(env.get("missing"), None);
    }

    #[test]
    fn test_redeclare_keeps_order() {
        let mut env = Environment::new();
        env.declare("a", Type::Int, Value::Int(1), loc(1));
        env.declare("b", Type::Int, Value::Int(2), loc(2));
        env.declare("a", Type::Int, Value::Int(3), loc(1));

        let names: Vec<_> = env.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(env.get("a"), Some(Value::Int(3)));
        assert_eq!(env.len(), 2);
    }
}
