//! End-to-end tests driving whole programs through the public API:
//! lex -> parse -> define_macros -> expand_macros -> eval.

use lumen::builtins::register_builtins;
use lumen::env::Environment;
use lumen::macros::{define_macros, expand_macros};
use lumen::parser::parse;

fn run(input: &str) -> String {
    let (mut program, errors) = parse(input);
    assert!(errors.is_empty(), "parser errors for `{input}`: {errors:?}");

    let macro_env = Environment::new();
    define_macros(&mut program, &macro_env);
    let program = expand_macros(program, &macro_env);

    let env = Environment::new();
    register_builtins(&env);

    lumen::eval(&program, &env).inspect()
}

#[test]
fn integer_arithmetic_with_let() {
    assert_eq!(run("let x = 5 * 5 + 10; x"), "35");
}

#[test]
fn closures_and_higher_order_functions() {
    assert_eq!(
        run("let add = fn(a, b) { a + b }; add(1, add(2, 3))"),
        "6"
    );
}

#[test]
fn closures_capture_definition_site_environment() {
    assert_eq!(
        run("let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3)"),
        "5"
    );
}

#[test]
fn arrays_and_builtins_compose() {
    assert_eq!(
        run("let a = [1, 2, 3]; let double = fn(x) { x * 2 }; push(rest(a), double(last(a)))"),
        "[2, 3, 6]"
    );
}

#[test]
fn hash_literal_and_indexing() {
    assert_eq!(
        run(r#"let h = {"one": 1, "two": 2}; h["one"] + h["two"]"#),
        "3"
    );
}

#[test]
fn unless_macro_skips_its_body() {
    let output = run(
        r#"let unless = macro(cond, body) { quote(if (!(unquote(cond))) { unquote(body) }) };
           unless(10 > 5, 999)"#,
    );
    assert_eq!(output, "null");
}

#[test]
fn if_else_branches() {
    assert_eq!(run("if (1 < 2) { 10 } else { 20 }"), "10");
    assert_eq!(run("if (1 > 2) { 10 }"), "null");
}

#[test]
fn string_concatenation_and_unsupported_operator() {
    assert_eq!(run(r#""foo" + "bar""#), "foobar");
    assert_eq!(
        run(r#""a" - "b""#),
        "ERROR: unknown operator: STRING - STRING"
    );
}

#[test]
fn comparison_operators_le_ge() {
    assert_eq!(run("1 <= 1"), "true");
    assert_eq!(run("2 >= 3"), "false");
}

#[test]
fn identifier_not_found_is_reported() {
    assert_eq!(run("nonexistent"), "ERROR: identifier not found: nonexistent");
}

#[test]
fn calling_a_non_function_is_reported() {
    assert_eq!(run("let x = 5; x()"), "ERROR: not a function: INTEGER");
}

#[test]
fn recursive_function_via_closure() {
    assert_eq!(
        run(
            "let fact = fn(n) { if (n == 0) { 1 } else { n * fact(n - 1) } }; fact(5)"
        ),
        "120"
    );
}

#[test]
fn parser_errors_are_collected_without_panicking() {
    let (_, errors) = parse("let = 5;");
    assert!(!errors.is_empty());
}
