//! Variable scoping: a scope stack over name → value maps.
//!
//! The global scope is the catalog's source of truth: the loader walks
//! [`Environment::globals`] to discover functions and grimoires defined by
//! the stdlib bootstrap and by ingested package sources.

use crate::Value;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct Environment {
    /// Innermost scope last. Never empty.
    scopes: Vec<FxHashMap<String, Value>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![FxHashMap::default()],
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind in the innermost scope.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.into(), value);
    }

    /// Rebind the nearest existing binding, or define in the innermost
    /// scope when the name is new (Carrion assignment declares).
    pub fn assign(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        self.define(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// The global binding store, for catalog enumeration.
    pub fn globals(&self) -> &FxHashMap<String, Value> {
        &self.scopes[0]
    }

    /// Bind directly in the global scope regardless of depth.
    pub fn define_global(&mut self, name: impl Into<String>, value: Value) {
        self.scopes[0].insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scopes_shadow_and_pop() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        env.push_scope();
        env.define("x", Value::Int(2));
        assert_eq!(env.get("x"), Some(&Value::Int(2)));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn assign_rebinding_reaches_outer() {
        let mut env = Environment::new();
        env.define("x", Value::Int(1));
        env.push_scope();
        env.assign("x", Value::Int(9));
        env.pop_scope();
        assert_eq!(env.get("x"), Some(&Value::Int(9)));
    }

    #[test]
    fn globals_is_the_outermost_scope() {
        let mut env = Environment::new();
        env.define("g", Value::Int(1));
        env.push_scope();
        env.define("local", Value::Int(2));
        assert!(env.globals().contains_key("g"));
        assert!(!env.globals().contains_key("local"));
    }
}
