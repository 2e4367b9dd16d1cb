use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

use lumen::builtins::register_builtins;
use lumen::env::Environment;
use lumen::macros::{define_macros, expand_macros};
use lumen::parser::parse;

const PROMPT: &str = "> ";

fn main() {
    let user = std::env::var("USER").unwrap_or_else(|_| "friend".to_string());
    println!("Hello {user}! This is the REPL!");
    println!("You can get started by typing some commands.");

    let env = Environment::new();
    register_builtins(&env);
    let macro_env = Environment::new();

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), rustyline::history::DefaultHistory> =
        Editor::with_config(config).expect("failed to start line editor");

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                run_line(&line, &env, &macro_env);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }
}

fn run_line(
    line: &str,
    env: &std::rc::Rc<Environment>,
    macro_env: &std::rc::Rc<Environment>,
) {
    let (mut program, errors) = parse(line);
    if !errors.is_empty() {
        for err in &errors {
            println!("\t{err}");
        }
        return;
    }

    define_macros(&mut program, macro_env);
    let program = expand_macros(program, macro_env);

    let result = lumen::eval(&program, env);
    if !matches!(result, lumen::Object::Null) {
        println!("{}", result.inspect());
    }
}
