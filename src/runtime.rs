use crate::{
    ast::{BinaryOp, Expr},
    diagnostics::Diagnostic,
    environment::Environment,
    lexer::{self, Token},
    parser,
};

/// Byte budget for rendered expressions, matching the interactive buffer.
pub const RENDER_CAPACITY: usize = 1024;

/// The outcome of a successfully evaluated line.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub value: f64,
    pub rendered: String,
}

/// Owns the session's variable environment and drives the pipeline. The
/// environment lives exactly as long as the interpreter; it is never
/// ambient state.
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Runs the full pipeline over one line: tokenize, parse, evaluate,
    /// render. `Ok(None)` means the line held no expression.
    pub fn eval_source(&mut self, source: &str) -> Result<Option<Evaluation>, Diagnostic> {
        let tokens = lexer::tokenize(source)?;
        self.eval_tokens(tokens)
    }

    /// Same pipeline, entered after tokenization; lets the REPL tokenize a
    /// line once, try its shortcuts, and fall through here.
    pub fn eval_tokens(&mut self, tokens: Vec<Token>) -> Result<Option<Evaluation>, Diagnostic> {
        let Some(tree) = parser::parse(tokens)? else {
            return Ok(None);
        };
        let value = evaluate(&tree, &mut self.env)?;
        Ok(Some(Evaluation {
            value,
            rendered: tree.render(RENDER_CAPACITY),
        }))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a tree against an environment. Arithmetic follows IEEE-754
/// f64 semantics, so division by zero yields an infinity or NaN, not an
/// error. Assignment evaluates its right side first, then requires the
/// left child to be a symbol and stores the value under that name.
pub fn evaluate(tree: &Expr, env: &mut Environment) -> Result<f64, Diagnostic> {
    match tree {
        Expr::Value(value) => Ok(*value),
        Expr::Symbol(name) => env
            .retrieve(name)
            .ok_or_else(|| Diagnostic::runtime(format!("Undefined variable: {name}"))),
        Expr::Negate(child) => Ok(-evaluate(child, env)?),
        Expr::Binary {
            op: BinaryOp::Assign,
            left,
            right,
        } => {
            let value = evaluate(right, env)?;
            match left.as_ref() {
                Expr::Symbol(name) => {
                    env.store(name, value);
                    Ok(value)
                }
                _ => Err(Diagnostic::runtime(
                    "Left side of assignment must be a symbol",
                )),
            }
        }
        Expr::Binary { op, left, right } => {
            let lhs = evaluate(left, env)?;
            let rhs = evaluate(right, env)?;
            Ok(match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Sub => lhs - rhs,
                BinaryOp::Mul => lhs * rhs,
                BinaryOp::Div => lhs / rhs,
                BinaryOp::Power => lhs.powf(rhs),
                BinaryOp::Assign => unreachable!(),
            })
        }
    }
}
