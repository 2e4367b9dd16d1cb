//! Macro subsystem: `DefineMacros`/`ExpandMacros` AST rewriting passes.
//!
//! Built on a generic bottom-up tree transform, `modify_expression`, applied
//! once over the whole node-variant set rather than duplicated per call
//! site.

use std::rc::Rc;

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::env::Environment;
use crate::error::EvalError;
use crate::object::{MacroObj, Object};

/// Extracts top-level `let NAME = macro(...) {...};` definitions from
/// `program`, binds them in `macro_env`, and removes those statements from
/// the program in place.
pub fn define_macros(program: &mut Program, macro_env: &Rc<Environment>) {
    let mut definition_indices = Vec::new();

    for (i, stmt) in program.iter().enumerate() {
        if let Statement::Let {
            name,
            value: Expression::MacroLiteral { parameters, body },
        } = stmt
        {
            let macro_obj = MacroObj {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(macro_env),
            };
            macro_env.define(name.clone(), Object::Macro(Rc::new(macro_obj)));
            definition_indices.push(i);
        }
    }

    for &i in definition_indices.iter().rev() {
        program.remove(i);
    }
}

/// Rewrites every macro call site in `program` by evaluating the macro's
/// body with its arguments quoted (unevaluated), splicing the returned AST
/// back in.
pub fn expand_macros(program: Program, macro_env: &Rc<Environment>) -> Program {
    program
        .into_iter()
        .map(|stmt| modify_statement(stmt, &mut |expr| expand_macro_call(expr, macro_env)))
        .collect()
}

fn expand_macro_call(expr: Expression, macro_env: &Rc<Environment>) -> Expression {
    let Expression::Call {
        function,
        arguments,
    } = &expr
    else {
        return expr;
    };

    let Expression::Identifier(name) = function.as_ref() else {
        return expr;
    };

    let Some(Object::Macro(macro_obj)) = macro_env.get(name) else {
        return expr;
    };

    let quoted_args: Vec<Object> = arguments
        .iter()
        .map(|arg| Object::Quote(Rc::new(arg.clone())))
        .collect();

    let call_env = Environment::with_parent(Rc::clone(&macro_obj.env));
    for (param, arg) in macro_obj.parameters.iter().zip(quoted_args.into_iter()) {
        call_env.define(param.name.clone(), arg);
    }

    let result = crate::eval::eval_macro_body(&macro_obj.body, &call_env);

    match result {
        Object::Quote(node) => (*node).clone(),
        other => panic!(
            "macro did not return a quoted AST node: {}",
            other.inspect()
        ),
    }
}

/// Generic bottom-up AST transform: recurses into every child field of
/// `stmt` first, then applies `f` to every expression found, including
/// the statement's own top-level expression if it has one.
pub fn modify_statement(stmt: Statement, f: &mut impl FnMut(Expression) -> Expression) -> Statement {
    match stmt {
        Statement::Let { name, value } => Statement::Let {
            name,
            value: modify_expression_pub(value, f),
        },
        Statement::Return { value } => Statement::Return {
            value: modify_expression_pub(value, f),
        },
        Statement::Expression { expr } => Statement::Expression {
            expr: modify_expression_pub(expr, f),
        },
    }
}

fn modify_block(block: BlockStatement, f: &mut impl FnMut(Expression) -> Expression) -> BlockStatement {
    BlockStatement {
        statements: block
            .statements
            .into_iter()
            .map(|s| modify_statement(s, f))
            .collect(),
    }
}

fn modify_expression_pub(expr: Expression, f: &mut impl FnMut(Expression) -> Expression) -> Expression {
    let rewritten = modify_expression_children(expr, f);
    f(rewritten)
}

fn modify_expression_children(
    expr: Expression,
    f: &mut impl FnMut(Expression) -> Expression,
) -> Expression {
    match expr {
        Expression::Prefix { operator, right } => Expression::Prefix {
            operator,
            right: Box::new(modify_expression_pub(*right, f)),
        },
        Expression::Infix {
            operator,
            left,
            right,
        } => Expression::Infix {
            operator,
            left: Box::new(modify_expression_pub(*left, f)),
            right: Box::new(modify_expression_pub(*right, f)),
        },
        Expression::Index { left, index } => Expression::Index {
            left: Box::new(modify_expression_pub(*left, f)),
            index: Box::new(modify_expression_pub(*index, f)),
        },
        Expression::If {
            condition,
            consequence,
            alternative,
        } => Expression::If {
            condition: Box::new(modify_expression_pub(*condition, f)),
            consequence: modify_block(consequence, f),
            alternative: alternative.map(|alt| modify_block(alt, f)),
        },
        Expression::FunctionLiteral { parameters, body } => Expression::FunctionLiteral {
            parameters,
            body: modify_block(body, f),
        },
        Expression::MacroLiteral { parameters, body } => Expression::MacroLiteral {
            parameters,
            body: modify_block(body, f),
        },
        Expression::ArrayLiteral(elements) => Expression::ArrayLiteral(
            elements
                .into_iter()
                .map(|e| modify_expression_pub(e, f))
                .collect(),
        ),
        Expression::HashLiteral(pairs) => Expression::HashLiteral(
            pairs
                .into_iter()
                .map(|(k, v)| (modify_expression_pub(k, f), modify_expression_pub(v, f)))
                .collect(),
        ),
        Expression::Call {
            function,
            arguments,
        } => Expression::Call {
            function: Box::new(modify_expression_pub(*function, f)),
            arguments: arguments
                .into_iter()
                .map(|a| modify_expression_pub(a, f))
                .collect(),
        },
        other @ (Expression::Identifier(_)
        | Expression::IntegerLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::Unit) => other,
    }
}

/// Fallible variant of the bottom-up transform used by `quote`/`unquote`
/// evaluation, where rewriting a node may itself evaluate code.
pub fn modify_expression(
    expr: Expression,
    f: &mut impl FnMut(Expression) -> Result<Expression, EvalError>,
) -> Result<Expression, EvalError> {
    let rewritten = modify_expression_children_fallible(expr, f)?;
    f(rewritten)
}

fn modify_expression_children_fallible(
    expr: Expression,
    f: &mut impl FnMut(Expression) -> Result<Expression, EvalError>,
) -> Result<Expression, EvalError> {
    Ok(match expr {
        Expression::Prefix { operator, right } => Expression::Prefix {
            operator,
            right: Box::new(modify_expression(*right, f)?),
        },
        Expression::Infix {
            operator,
            left,
            right,
        } => Expression::Infix {
            operator,
            left: Box::new(modify_expression(*left, f)?),
            right: Box::new(modify_expression(*right, f)?),
        },
        Expression::Index { left, index } => Expression::Index {
            left: Box::new(modify_expression(*left, f)?),
            index: Box::new(modify_expression(*index, f)?),
        },
        Expression::If {
            condition,
            consequence,
            alternative,
        } => Expression::If {
            condition: Box::new(modify_expression(*condition, f)?),
            consequence: modify_block_fallible(consequence, f)?,
            alternative: match alternative {
                Some(alt) => Some(modify_block_fallible(alt, f)?),
                None => None,
            },
        },
        Expression::FunctionLiteral { parameters, body } => Expression::FunctionLiteral {
            parameters,
            body: modify_block_fallible(body, f)?,
        },
        Expression::MacroLiteral { parameters, body } => Expression::MacroLiteral {
            parameters,
            body: modify_block_fallible(body, f)?,
        },
        Expression::ArrayLiteral(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for e in elements {
                out.push(modify_expression(e, f)?);
            }
            Expression::ArrayLiteral(out)
        }
        Expression::HashLiteral(pairs) => {
            let mut out = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                out.push((modify_expression(k, f)?, modify_expression(v, f)?));
            }
            Expression::HashLiteral(out)
        }
        Expression::Call {
            function,
            arguments,
        } => {
            let mut out = Vec::with_capacity(arguments.len());
            for a in arguments {
                out.push(modify_expression(a, f)?);
            }
            Expression::Call {
                function: Box::new(modify_expression(*function, f)?),
                arguments: out,
            }
        }
        other => other,
    })
}

fn modify_block_fallible(
    block: BlockStatement,
    f: &mut impl FnMut(Expression) -> Result<Expression, EvalError>,
) -> Result<BlockStatement, EvalError> {
    let mut statements = Vec::with_capacity(block.statements.len());
    for stmt in block.statements {
        statements.push(modify_statement_fallible(stmt, f)?);
    }
    Ok(BlockStatement { statements })
}

fn modify_statement_fallible(
    stmt: Statement,
    f: &mut impl FnMut(Expression) -> Result<Expression, EvalError>,
) -> Result<Statement, EvalError> {
    Ok(match stmt {
        Statement::Let { name, value } => Statement::Let {
            name,
            value: modify_expression(value, f)?,
        },
        Statement::Return { value } => Statement::Return {
            value: modify_expression(value, f)?,
        },
        Statement::Expression { expr } => Statement::Expression {
            expr: modify_expression(expr, f)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn define_macros_removes_definitions() {
        let (mut program, errors) = parse(
            "let unless = macro(cond, body) { quote(if (!(unquote(cond))) { unquote(body) }) }; let x = 5;",
        );
        assert!(errors.is_empty());
        assert_eq!(program.len(), 2);
        let macro_env = Environment::new();
        define_macros(&mut program, &macro_env);
        assert_eq!(program.len(), 1);
        assert!(matches!(macro_env.get("unless"), Some(Object::Macro(_))));
    }

    #[test]
    fn expand_macros_rewrites_call_site() {
        let (mut program, errors) = parse(
            "let unless = macro(cond, body) { quote(if (!(unquote(cond))) { unquote(body) }) }; unless(10 > 5, 99);",
        );
        assert!(errors.is_empty());
        let macro_env = Environment::new();
        define_macros(&mut program, &macro_env);
        let expanded = expand_macros(program, &macro_env);
        assert_eq!(expanded.len(), 1);
        match &expanded[0] {
            Statement::Expression {
                expr: Expression::If { .. },
            } => {}
            other => panic!("expected rewritten if expression, got {other:?}"),
        }
    }
}
