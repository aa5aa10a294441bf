//! Core library for the Calyx expression calculator: lexing, parsing,
//! evaluation against a variable environment, and REPL utilities.

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;

pub use diagnostics::{CalyxError, Diagnostic, DiagnosticKind, Result, SourceSpan};
pub use environment::Environment;
pub use repl::Repl;
pub use runtime::{Evaluation, Interpreter};
