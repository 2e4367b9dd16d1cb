//! Runtime error taxonomy for evaluation failures.
//!
//! These are propagated internally with `Result<Object, EvalError>` and `?`;
//! the public `eval` entry point collapses a terminal error into an
//! `Object::Error` so callers only ever see the value-shaped error channel.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("not a function: {0}")]
    NotAFunction(String),

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: String,
        operator: String,
        right: String,
    },

    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator { operator: String, operand: String },

    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: String,
        operator: String,
        right: String,
    },

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(String),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(String),

    #[error("wrong number of arguments to {function}: want {expected}, got {actual}")]
    WrongArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("argument to `{function}` must be {expected}, got {actual}")]
    ArgumentType {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("division by zero")]
    DivisionByZero,
}

impl EvalError {
    pub fn wrong_argument_count(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::WrongArgumentCount {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn argument_type(function: &str, expected: &str, actual: &str) -> Self {
        EvalError::ArgumentType {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
