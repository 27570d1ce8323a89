// File: src/interpreter/environment.rs
//
// Lexical scoping environment for variable management in the Lox interpreter.
// Implements a stack of scope frames where inner frames shadow outer ones.

use super::value::Value;
use ahash::AHashMap;

/// Variable storage using block-structured lexical scoping
///
/// The Environment maintains a stack of frames. Frame 0 is the global frame:
/// it is created with the environment and never popped. A frame is pushed
/// when a block is entered and popped when it is left, so the stack depth
/// always equals the current block nesting depth plus one. Lookups search
/// from the innermost frame (end of the Vec) outward.
///
/// # Examples
///
/// ```
/// use lox::interpreter::{Environment, Value};
///
/// let mut env = Environment::new();
/// env.define("x".to_string(), Value::Int(10));
///
/// env.push_scope();
/// env.assign("x", Value::Int(20));               // updates the global binding
/// env.assign("y", Value::Int(1));                // unknown name: created in the block frame
/// env.pop_scope();
///
/// assert_eq!(env.get("x"), Some(Value::Int(20)));
/// assert_eq!(env.get("y"), None);
/// ```
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<AHashMap<String, Value>>,
}

impl Environment {
    /// Create a new environment with a single global frame
    pub fn new() -> Self {
        Environment { scopes: vec![AHashMap::new()] }
    }

    /// Push a new frame (entering a block)
    pub fn push_scope(&mut self) {
        self.scopes.push(AHashMap::new());
        log::trace!("push scope (depth {})", self.scopes.len());
    }

    /// Pop the innermost frame (leaving a block). The global frame stays.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            log::trace!("pop scope (depth {})", self.scopes.len());
        }
    }

    /// Number of live frames, globals included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Get a variable, searching from the innermost frame outward
    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    /// Define (or overwrite) a variable in the innermost frame
    pub fn define(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Define a variable in the global frame regardless of the current depth
    pub fn define_global(&mut self, name: String, value: Value) {
        self.scopes[0].insert(name, value);
    }

    /// Update the nearest existing binding of `name`. If no frame binds it,
    /// the variable is created in the innermost frame.
    pub fn assign(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.define(name.to_string(), value);
    }

    /// Every visible name with the value it resolves to, sorted by name
    pub fn visible_bindings(&self) -> Vec<(String, Value)> {
        let mut merged: AHashMap<&str, &Value> = AHashMap::new();
        for scope in &self.scopes {
            for (name, value) in scope {
                merged.insert(name.as_str(), value);
            }
        }
        let mut bindings: Vec<(String, Value)> =
            merged.into_iter().map(|(name, value)| (name.to_string(), value.clone())).collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }

    /// Iterator over every visible variable name (shadowed names may repeat)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().flat_map(|scope| scope.keys().map(String::as_str))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
