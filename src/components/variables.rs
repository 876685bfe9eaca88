//! Typed variable bindings and the coercion rules for assigning to them.
//!
//! Each instance carries a [`Variables`] component seeded from its object's
//! declarations; the global scope uses the same type inside
//! [`GlobalVariables`](crate::resources::globals::GlobalVariables).
//!
//! Assignment always coerces to the declared type:
//! - number: numbers pass through, strings are parsed, booleans become 1/0,
//!   anything unparsable or non-finite becomes 0
//! - boolean: only `true` or the string `"true"` yield `true`
//! - string: numbers and booleans are formatted

use std::collections::BTreeMap;

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;

use crate::project::{Value, VarType, Variable};

pub fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => *n,
        Value::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
    };
    if n.is_finite() { n } else { 0.0 }
}

pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Text(s) => s == "true",
        Value::Number(_) => false,
    }
}

pub fn to_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Value::Number(n) => n.to_string(),
    }
}

/// Convert `value` to the representation of `var_type`.
pub fn coerce(value: &Value, var_type: VarType) -> Value {
    match var_type {
        VarType::Number => Value::Number(to_number(value)),
        VarType::Boolean => Value::Bool(to_bool(value)),
        VarType::String => Value::Text(to_text(value)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub var_type: VarType,
    pub value: Value,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Variables {
    bindings: FxHashMap<String, Binding>,
}

impl Variables {
    /// Seed bindings from declarations, coercing each initial value.
    pub fn from_declarations(declarations: &[Variable]) -> Self {
        let bindings = declarations
            .iter()
            .map(|v| {
                (
                    v.id.clone(),
                    Binding {
                        var_type: v.var_type,
                        value: coerce(&v.initial, v.var_type),
                    },
                )
            })
            .collect();
        Self { bindings }
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.bindings.get(id).map(|b| &b.value)
    }

    pub fn var_type(&self, id: &str) -> Option<VarType> {
        self.bindings.get(id).map(|b| b.var_type)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bindings.contains_key(id)
    }

    /// Assign `value` coerced to the declared type. Returns `false` when `id`
    /// is not declared.
    pub fn assign(&mut self, id: &str, value: &Value) -> bool {
        match self.bindings.get_mut(id) {
            Some(binding) => {
                binding.value = coerce(value, binding.var_type);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Values ordered by id, for snapshots.
    pub fn to_sorted(&self) -> BTreeMap<String, Value> {
        self.bindings
            .iter()
            .map(|(k, b)| (k.clone(), b.value.clone()))
            .collect()
    }
}
