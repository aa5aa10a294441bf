use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    ast::format_number,
    diagnostics::{CalyxError, Result},
    lexer::{self, Token},
    runtime::Interpreter,
};

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(|err| {
            CalyxError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
        })?;
        println!("Welcome to Calyx!");
        loop {
            match editor.readline("expr? ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed.eq_ignore_ascii_case("quit") {
                        break;
                    }
                    editor.add_history_entry(trimmed).ok();
                    self.dispatch(trimmed);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(CalyxError::from(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        err,
                    )));
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) {
        if line == "vars" {
            self.list_vars();
            return;
        }
        if let Some(name) = line.strip_prefix("unset ") {
            if let Err(diag) = self.interpreter.env_mut().remove(name.trim()) {
                eprintln!("{diag}");
            }
            return;
        }
        let tokens = match lexer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(diag) => {
                eprintln!("{diag}");
                return;
            }
        };
        if self.inspect(&tokens) {
            return;
        }
        match self.interpreter.eval_tokens(tokens) {
            Ok(Some(eval)) => {
                println!("{}  ==> {}", eval.rendered, format_number(eval.value));
            }
            Ok(None) => {}
            Err(diag) => eprintln!("{diag}"),
        }
    }

    /// Variable-inspection shortcuts that bypass the parser: a lone name
    /// prints its binding, and `name = <number|name>` stores directly.
    /// Anything longer falls through to the full pipeline.
    fn inspect(&mut self, tokens: &[Token]) -> bool {
        match tokens {
            [Token::Symbol(name)] => {
                match self.interpreter.env().retrieve(name) {
                    Some(value) => println!("Variable '{name}' is {}", format_number(value)),
                    None => eprintln!("Unknown variable '{name}'"),
                }
                true
            }
            [Token::Symbol(name), Token::Equals, Token::Number(value)] => {
                self.interpreter.env_mut().store(name, *value);
                println!("Variable '{name}' set to {}", format_number(*value));
                true
            }
            [Token::Symbol(name), Token::Equals, Token::Symbol(source)] => {
                match self.interpreter.env().retrieve(source) {
                    Some(value) => {
                        self.interpreter.env_mut().store(name, value);
                        println!("Variable '{name}' set to {}", format_number(value));
                    }
                    None => eprintln!("Unknown variable '{source}'"),
                }
                true
            }
            _ => false,
        }
    }

    fn list_vars(&self) {
        let env = self.interpreter.env();
        if env.is_empty() {
            println!("no variables defined");
            return;
        }
        for (name, value) in env.iter() {
            println!("{name} = {}", format_number(value));
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
