//! Environment: variable bindings and lexical scope chains.

use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Object>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment enclosing `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk the parent chain).
    pub fn define(&self, name: String, value: Object) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a name in this scope, then walks outward through parents.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }

        match &self.parent {
            Some(parent) => parent.get(name),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Object::Integer(42));
        assert!(matches!(env.get("x"), Some(Object::Integer(42))));
    }

    #[test]
    fn undefined_symbol_is_none() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x".to_string(), Object::Integer(42));

        let child = Environment::with_parent(parent.clone());
        child.define("x".to_string(), Object::Integer(100));

        assert!(matches!(child.get("x"), Some(Object::Integer(100))));
        assert!(matches!(parent.get("x"), Some(Object::Integer(42))));
    }

    #[test]
    fn child_sees_parent_binding() {
        let parent = Environment::new();
        parent.define("x".to_string(), Object::Integer(42));

        let child = Environment::with_parent(parent);
        assert!(matches!(child.get("x"), Some(Object::Integer(42))));
    }

    #[test]
    fn multi_level_chain_lookup() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Object::Integer(1));

        let parent = Environment::with_parent(grandparent);
        parent.define("b".to_string(), Object::Integer(2));

        let child = Environment::with_parent(parent);
        child.define("c".to_string(), Object::Integer(3));

        assert!(matches!(child.get("a"), Some(Object::Integer(1))));
        assert!(matches!(child.get("b"), Some(Object::Integer(2))));
        assert!(matches!(child.get("c"), Some(Object::Integer(3))));
    }
}
