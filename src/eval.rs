//! Tree-walking evaluator: AST to runtime `Object`.

use std::rc::Rc;

use crate::ast::{Expression, Program, Statement};
use crate::env::Environment;
use crate::error::EvalError;
use crate::object::{FunctionObj, Object, FALSE, NULL, TRUE};

/// Evaluates a whole program. Any internal `EvalError` is collapsed into
/// an `Object::Error` here — the public surface always yields an `Object`.
pub fn eval(program: &Program, env: &Rc<Environment>) -> Object {
    unwrap_result(eval_statements(program, env))
}

/// Evaluates a macro body block the same way, for use by the macro
/// expansion pass when it calls a macro's body with quoted arguments.
pub fn eval_macro_body(body: &crate::ast::BlockStatement, env: &Rc<Environment>) -> Object {
    unwrap_result(eval_block(&body.statements, env))
}

fn unwrap_result(result: Result<Object, EvalError>) -> Object {
    match result {
        Ok(Object::ReturnValue(v)) => *v,
        Ok(obj) => obj,
        Err(e) => Object::Error(e.to_string()),
    }
}

fn eval_statements(statements: &[Statement], env: &Rc<Environment>) -> Result<Object, EvalError> {
    let mut result = NULL;
    for stmt in statements {
        result = eval_statement(stmt, env)?;
        if let Object::ReturnValue(_) = result {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_block(statements: &[Statement], env: &Rc<Environment>) -> Result<Object, EvalError> {
    let mut result = NULL;
    for stmt in statements {
        result = eval_statement(stmt, env)?;
        if matches!(result, Object::ReturnValue(_)) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_statement(stmt: &Statement, env: &Rc<Environment>) -> Result<Object, EvalError> {
    match stmt {
        Statement::Expression { expr } => eval_expression(expr, env),
        Statement::Return { value } => {
            let val = eval_expression(value, env)?;
            Ok(Object::ReturnValue(Box::new(val)))
        }
        Statement::Let { name, value } => {
            let val = eval_expression(value, env)?;
            env.define(name.clone(), val);
            Ok(NULL)
        }
    }
}

fn eval_expression(expr: &Expression, env: &Rc<Environment>) -> Result<Object, EvalError> {
    match expr {
        Expression::IntegerLiteral(i) => Ok(Object::Integer(*i)),
        Expression::StringLiteral(s) => Ok(Object::String(Rc::new(s.clone()))),
        Expression::BooleanLiteral(b) => Ok(if *b { TRUE } else { FALSE }),
        Expression::Unit => Ok(NULL),

        Expression::Identifier(name) => env
            .get(name)
            .ok_or_else(|| EvalError::IdentifierNotFound(name.clone())),

        Expression::Prefix { operator, right } => {
            let right_val = eval_expression(right, env)?;
            eval_prefix(operator, &right_val)
        }

        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left_val = eval_expression(left, env)?;
            let right_val = eval_expression(right, env)?;
            eval_infix(operator, &left_val, &right_val)
        }

        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let cond = eval_expression(condition, env)?;
            if cond.is_truthy() {
                eval_block(&consequence.statements, env)
            } else if let Some(alt) = alternative {
                eval_block(&alt.statements, env)
            } else {
                Ok(NULL)
            }
        }

        Expression::FunctionLiteral { parameters, body } => Ok(Object::Function(Rc::new(FunctionObj {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        }))),

        Expression::MacroLiteral { .. } => Ok(NULL),

        Expression::Call {
            function,
            arguments,
        } => {
            if let Expression::Identifier(name) = function.as_ref() {
                if name == "quote" {
                    let arg = arguments
                        .first()
                        .ok_or_else(|| EvalError::WrongArgumentCount {
                            function: "quote".to_string(),
                            expected: "1".to_string(),
                            actual: arguments.len(),
                        })?;
                    return Ok(eval_quote(arg, env)?);
                }
            }

            let func = eval_expression(function, env)?;
            let args = eval_expressions(arguments, env)?;
            apply_function(&func, &args)
        }

        Expression::ArrayLiteral(elements) => {
            let items = eval_expressions(elements, env)?;
            Ok(Object::Array(Rc::new(items)))
        }

        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, env),

        Expression::Index { left, index } => {
            let left_val = eval_expression(left, env)?;
            let index_val = eval_expression(index, env)?;
            eval_index(&left_val, &index_val)
        }
    }
}

fn eval_expressions(
    exprs: &[Expression],
    env: &Rc<Environment>,
) -> Result<Vec<Object>, EvalError> {
    exprs.iter().map(|e| eval_expression(e, env)).collect()
}

fn eval_prefix(operator: &str, right: &Object) -> Result<Object, EvalError> {
    match operator {
        "!" => Ok(if right.is_truthy() { FALSE } else { TRUE }),
        "-" => match right {
            Object::Integer(i) => Ok(Object::Integer(-i)),
            other => Err(EvalError::UnknownPrefixOperator {
                operator: "-".to_string(),
                operand: other.type_name().to_string(),
            }),
        },
        op => Err(EvalError::UnknownPrefixOperator {
            operator: op.to_string(),
            operand: right.type_name().to_string(),
        }),
    }
}

fn eval_infix(operator: &str, left: &Object, right: &Object) -> Result<Object, EvalError> {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Object::String(l), Object::String(r)) => eval_string_infix(operator, l, r),
        _ if operator == "==" => Ok(if objects_identical(left, right) { TRUE } else { FALSE }),
        _ if operator == "!=" => Ok(if objects_identical(left, right) { FALSE } else { TRUE }),
        _ if left.type_name() != right.type_name() => Err(EvalError::TypeMismatch {
            left: left.type_name().to_string(),
            operator: operator.to_string(),
            right: right.type_name().to_string(),
        }),
        _ => Err(EvalError::UnknownInfixOperator {
            left: left.type_name().to_string(),
            operator: operator.to_string(),
            right: right.type_name().to_string(),
        }),
    }
}

/// Identity/value equality for the `==`/`!=` fallback: works because
/// booleans and null are shared singletons. Objects of any other kind
/// (or differing kinds) are never identical here.
fn objects_identical(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Null, Object::Null) => true,
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        _ => false,
    }
}

fn eval_integer_infix(operator: &str, l: i64, r: i64) -> Result<Object, EvalError> {
    match operator {
        "+" => Ok(Object::Integer(l + r)),
        "-" => Ok(Object::Integer(l - r)),
        "*" => Ok(Object::Integer(l * r)),
        "/" => {
            if r == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Object::Integer(l / r))
            }
        }
        "<" => Ok(if l < r { TRUE } else { FALSE }),
        ">" => Ok(if l > r { TRUE } else { FALSE }),
        "<=" => Ok(if l <= r { TRUE } else { FALSE }),
        ">=" => Ok(if l >= r { TRUE } else { FALSE }),
        "==" => Ok(if l == r { TRUE } else { FALSE }),
        "!=" => Ok(if l != r { TRUE } else { FALSE }),
        op => Err(EvalError::UnknownInfixOperator {
            left: "INTEGER".to_string(),
            operator: op.to_string(),
            right: "INTEGER".to_string(),
        }),
    }
}

fn eval_string_infix(operator: &str, l: &str, r: &str) -> Result<Object, EvalError> {
    match operator {
        "+" => Ok(Object::String(Rc::new(format!("{l}{r}")))),
        "==" => Ok(if l == r { TRUE } else { FALSE }),
        "!=" => Ok(if l != r { TRUE } else { FALSE }),
        op => Err(EvalError::UnknownInfixOperator {
            left: "STRING".to_string(),
            operator: op.to_string(),
            right: "STRING".to_string(),
        }),
    }
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    env: &Rc<Environment>,
) -> Result<Object, EvalError> {
    let mut map = std::collections::HashMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env)?;
        let value = eval_expression(value_expr, env)?;
        let hash_key = key
            .hash_key()
            .ok_or_else(|| EvalError::UnusableHashKey(key.type_name().to_string()))?;
        map.insert(hash_key, (key, value));
    }
    Ok(Object::Hash(Rc::new(map)))
}

fn eval_index(left: &Object, index: &Object) -> Result<Object, EvalError> {
    match (left, index) {
        (Object::Array(items), Object::Integer(i)) => {
            if *i < 0 || *i as usize >= items.len() {
                Ok(NULL)
            } else {
                Ok(items[*i as usize].clone())
            }
        }
        (Object::Hash(map), key) => {
            let hash_key = key
                .hash_key()
                .ok_or_else(|| EvalError::UnusableHashKey(key.type_name().to_string()))?;
            Ok(map
                .get(&hash_key)
                .map(|(_, v)| v.clone())
                .unwrap_or(NULL))
        }
        _ => Err(EvalError::IndexNotSupported(left.type_name().to_string())),
    }
}

fn apply_function(func: &Object, args: &[Object]) -> Result<Object, EvalError> {
    match func {
        Object::Function(f) => {
            if f.parameters.len() != args.len() {
                return Err(EvalError::wrong_argument_count(
                    "function",
                    f.parameters.len().to_string(),
                    args.len(),
                ));
            }
            let call_env = Environment::with_parent(Rc::clone(&f.env));
            for (param, arg) in f.parameters.iter().zip(args.iter()) {
                call_env.define(param.name.clone(), arg.clone());
            }
            let result = eval_block(&f.body.statements, &call_env)?;
            match result {
                Object::ReturnValue(v) => Ok(*v),
                other => Ok(other),
            }
        }
        Object::Builtin(builtin) => builtin(args),
        other => Err(EvalError::NotAFunction(other.type_name().to_string())),
    }
}

fn eval_quote(node: &Expression, env: &Rc<Environment>) -> Result<Object, EvalError> {
    let evaluated = eval_unquote_calls(node, env)?;
    Ok(Object::Quote(Rc::new(evaluated)))
}

fn eval_unquote_calls(node: &Expression, env: &Rc<Environment>) -> Result<Expression, EvalError> {
    crate::macros::modify_expression(node.clone(), &mut |n| {
        if let Expression::Call {
            function,
            arguments,
        } = &n
        {
            if let Expression::Identifier(name) = function.as_ref() {
                if name == "unquote" && arguments.len() == 1 {
                    let value = eval_expression(&arguments[0], env)?;
                    return Ok(object_to_expression(&value));
                }
            }
        }
        Ok(n)
    })
}

/// Converts an evaluated unquote result back into an AST node. Object
/// kinds with no direct literal counterpart convert to the unreachable
/// `Unit` expression, matching a null/empty node.
fn object_to_expression(obj: &Object) -> Expression {
    match obj {
        Object::Integer(i) => Expression::IntegerLiteral(*i),
        Object::Boolean(b) => Expression::BooleanLiteral(*b),
        Object::Quote(node) => (**node).clone(),
        _ => Expression::Unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_str(input: &str) -> Object {
        let (program, errors) = parse(input);
        assert!(errors.is_empty(), "parser errors: {errors:?}");
        let env = Environment::new();
        crate::builtins::register_builtins(&env);
        eval(&program, &env)
    }

    #[test]
    fn integer_arithmetic() {
        let obj = eval_str("let x = 5 * 5 + 10; x");
        assert_eq!(obj.inspect(), "35");
    }

    #[test]
    fn closures() {
        let obj = eval_str(
            "let add = fn(a, b) { a + b }; add(1, add(2, 3))",
        );
        assert_eq!(obj.inspect(), "6");
    }

    #[test]
    fn nested_closures_capture_environment() {
        let obj = eval_str(
            "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3)",
        );
        assert_eq!(obj.inspect(), "5");
    }

    #[test]
    fn arrays_and_builtins() {
        let obj = eval_str(
            "let a = [1, 2, 3]; let double = fn(x) { x * 2 }; push(rest(a), double(last(a)))",
        );
        assert_eq!(obj.inspect(), "[2, 3, 6]");
    }

    #[test]
    fn hash_indexing() {
        let obj = eval_str(r#"let h = {"one": 1, "two": 2}; h["one"] + h["two"]"#);
        assert_eq!(obj.inspect(), "3");
    }

    #[test]
    fn if_else() {
        assert_eq!(eval_str("if (1 < 2) { 10 } else { 20 }").inspect(), "10");
        assert_eq!(eval_str("if (1 > 2) { 10 }").inspect(), "null");
    }

    #[test]
    fn string_concatenation_and_type_mismatch() {
        assert_eq!(eval_str(r#""foo" + "bar""#).inspect(), "foobar");
        assert_eq!(
            eval_str(r#""a" - "b""#).inspect(),
            "ERROR: unknown operator: STRING - STRING"
        );
    }

    #[test]
    fn null_and_boolean_equality_fall_back_to_identity() {
        assert_eq!(eval_str("if (false) { 1 } == if (false) { 1 }").inspect(), "true");
        assert_eq!(eval_str("true == true").inspect(), "true");
        assert_eq!(eval_str("true != false").inspect(), "true");
        assert_eq!(eval_str("1 == true").inspect(), "false");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(eval_str("5 / 0").inspect(), "ERROR: division by zero");
    }

    #[test]
    fn return_propagates_across_nested_blocks() {
        let obj = eval_str(
            "let f = fn(x) { if (x > 0) { if (x > 5) { return 1; } return 2; } return 3; }; f(10)",
        );
        assert_eq!(obj.inspect(), "1");
    }

    #[test]
    fn wrong_argument_count_is_an_error() {
        let obj = eval_str("let f = fn(a, b) { a + b }; f(1)");
        assert!(obj.inspect().starts_with("ERROR:"));
    }
}
