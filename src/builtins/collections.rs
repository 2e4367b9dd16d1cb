//! Array builtins: len, first, last, rest, push.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::EvalError;
use crate::object::{Object, NULL};

/// Length of a string or array.
pub fn builtin_len(args: &[Object]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::wrong_argument_count("len", "1", args.len()));
    }
    match &args[0] {
        Object::String(s) => Ok(Object::Integer(s.len() as i64)),
        Object::Array(items) => Ok(Object::Integer(items.len() as i64)),
        other => Err(EvalError::argument_type(
            "len",
            "STRING or ARRAY",
            other.type_name(),
        )),
    }
}

/// First element of an array, or null if empty.
pub fn builtin_first(args: &[Object]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::wrong_argument_count("first", "1", args.len()));
    }
    match &args[0] {
        Object::Array(items) => Ok(items.first().cloned().unwrap_or(NULL)),
        other => Err(EvalError::argument_type("first", "ARRAY", other.type_name())),
    }
}

/// Last element of an array, or null if empty.
pub fn builtin_last(args: &[Object]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::wrong_argument_count("last", "1", args.len()));
    }
    match &args[0] {
        Object::Array(items) => Ok(items.last().cloned().unwrap_or(NULL)),
        other => Err(EvalError::argument_type("last", "ARRAY", other.type_name())),
    }
}

/// All elements but the first, as a new array, or null if empty.
pub fn builtin_rest(args: &[Object]) -> Result<Object, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::wrong_argument_count("rest", "1", args.len()));
    }
    match &args[0] {
        Object::Array(items) => {
            if items.is_empty() {
                Ok(NULL)
            } else {
                Ok(Object::Array(Rc::new(items[1..].to_vec())))
            }
        }
        other => Err(EvalError::argument_type("rest", "ARRAY", other.type_name())),
    }
}

/// A new array with `value` appended to `array`. Does not mutate the
/// original array, matching the language's value semantics.
pub fn builtin_push(args: &[Object]) -> Result<Object, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::wrong_argument_count("push", "2", args.len()));
    }
    match &args[0] {
        Object::Array(items) => {
            let mut new_items = (**items).clone();
            new_items.push(args[1].clone());
            Ok(Object::Array(Rc::new(new_items)))
        }
        other => Err(EvalError::argument_type("push", "ARRAY", other.type_name())),
    }
}

pub fn register(env: &Rc<Environment>) {
    env.define("len".to_string(), Object::Builtin(builtin_len));
    env.define("first".to_string(), Object::Builtin(builtin_first));
    env.define("last".to_string(), Object::Builtin(builtin_last));
    env.define("rest".to_string(), Object::Builtin(builtin_rest));
    env.define("push".to_string(), Object::Builtin(builtin_push));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_of_array_and_string() {
        let arr = Object::Array(Rc::new(vec![Object::Integer(1), Object::Integer(2)]));
        assert!(matches!(builtin_len(&[arr]), Ok(Object::Integer(2))));
        let s = Object::String(Rc::new("hello".to_string()));
        assert!(matches!(builtin_len(&[s]), Ok(Object::Integer(5))));
    }

    #[test]
    fn rest_of_empty_array_is_null() {
        let arr = Object::Array(Rc::new(vec![]));
        assert!(matches!(builtin_rest(&[arr]), Ok(Object::Null)));
    }

    #[test]
    fn push_does_not_mutate_original() {
        let original = Rc::new(vec![Object::Integer(1)]);
        let arr = Object::Array(Rc::clone(&original));
        let result = builtin_push(&[arr, Object::Integer(2)]).unwrap();
        assert_eq!(original.len(), 1);
        match result {
            Object::Array(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(builtin_len(&[]).is_err());
    }
}
