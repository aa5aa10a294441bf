use crate::{
    ast::{BinaryOp, Expr},
    diagnostics::Diagnostic,
    lexer::{Token, TokenStream},
};

/// Parses a tokenized line into an expression tree. Empty input yields
/// `Ok(None)`: nothing to do, not an error.
pub fn parse(tokens: Vec<Token>) -> Result<Option<Expr>, Diagnostic> {
    Parser::new(tokens).parse()
}

/// Recursive-descent parser, one method per precedence level. `+ - * /`
/// fold iteratively and associate left; `^` and `=` recurse on the right.
struct Parser {
    stream: TokenStream,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            stream: TokenStream::new(tokens),
        }
    }

    fn parse(mut self) -> Result<Option<Expr>, Diagnostic> {
        if *self.stream.peek() == Token::End {
            return Ok(None);
        }
        let expr = self.assignment()?;
        match self.stream.peek() {
            Token::End => Ok(Some(expr)),
            trailing => Err(Diagnostic::parser(format!(
                "Syntax error on token {}",
                trailing.name()
            ))),
        }
    }

    // assignment := additive ( '=' assignment )*
    fn assignment(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.additive()?;
        while self.matches(&Token::Equals) {
            let value = self.assignment()?;
            expr = Expr::binary(BinaryOp::Assign, expr, value);
        }
        Ok(expr)
    }

    // additive := multiplicative ( ('+' | '-') multiplicative )*
    fn additive(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.multiplicative()?;
        loop {
            let op = if self.matches(&Token::Plus) {
                BinaryOp::Add
            } else if self.matches(&Token::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.multiplicative()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    // multiplicative := exponential ( ('*' | '/') exponential )*
    fn multiplicative(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.exponential()?;
        loop {
            let op = if self.matches(&Token::Star) {
                BinaryOp::Mul
            } else if self.matches(&Token::Slash) {
                BinaryOp::Div
            } else {
                break;
            };
            let right = self.exponential()?;
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }

    // exponential := primary ( '^' exponential )?
    fn exponential(&mut self) -> Result<Expr, Diagnostic> {
        let expr = self.primary()?;
        if self.matches(&Token::Caret) {
            let right = self.exponential()?;
            return Ok(Expr::binary(BinaryOp::Power, expr, right));
        }
        Ok(expr)
    }

    // primary := NUMBER | SYMBOL | '(' assignment ')' | '-' primary
    fn primary(&mut self) -> Result<Expr, Diagnostic> {
        match self.stream.consume() {
            Token::Number(value) => Ok(Expr::value(value)),
            Token::Symbol(name) => Ok(Expr::symbol(name)),
            Token::LParen => {
                let inner = self.assignment()?;
                if self.matches(&Token::RParen) {
                    Ok(inner)
                } else {
                    Err(Diagnostic::parser("Expected ')'"))
                }
            }
            Token::Minus => Ok(Expr::negate(self.primary()?)),
            other => Err(Diagnostic::parser(format!(
                "Unexpected token {}",
                other.name()
            ))),
        }
    }

    fn matches(&mut self, expected: &Token) -> bool {
        if self.stream.peek() == expected {
            self.stream.consume();
            true
        } else {
            false
        }
    }
}
