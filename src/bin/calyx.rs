use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};

use calyx::{ast::format_number, CalyxError, Interpreter, Repl};

#[derive(Parser)]
#[command(author, version, about = "Calyx expression calculator")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a file of expressions, one per line
    Run { script: PathBuf },
    /// Start an interactive session
    Repl,
    /// Evaluate a single expression
    Eval { source: String },
}

fn main() -> Result<(), CalyxError> {
    let args = Args::parse();
    match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => run_script(script),
        Command::Repl => {
            let mut repl = Repl::new();
            repl.run()
        }
        Command::Eval { source } => {
            let mut interpreter = Interpreter::new();
            if let Some(eval) = interpreter.eval_source(&source)? {
                println!("{}  ==> {}", eval.rendered, format_number(eval.value));
            }
            Ok(())
        }
    }
}

fn run_script(path: PathBuf) -> Result<(), CalyxError> {
    let source = fs::read_to_string(&path)?;
    let mut interpreter = Interpreter::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(eval) = interpreter.eval_source(trimmed)? {
            println!("{}  ==> {}", eval.rendered, format_number(eval.value));
        }
    }
    Ok(())
}
