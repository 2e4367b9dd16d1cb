//! Output builtin: puts.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::EvalError;
use crate::object::{Object, NULL};

/// Writes each argument's inspection to stdout followed by a newline.
/// Always returns null.
pub fn builtin_puts(args: &[Object]) -> Result<Object, EvalError> {
    for arg in args {
        println!("{}", arg.inspect());
    }
    Ok(NULL)
}

pub fn register(env: &Rc<Environment>) {
    env.define("puts".to_string(), Object::Builtin(builtin_puts));
}
