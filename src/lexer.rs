use std::fmt;

use crate::diagnostics::{Diagnostic, SourceSpan};

/// Longest accepted variable name, in bytes.
pub const SYMBOL_MAX_LEN: usize = 31;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Equals,
    Symbol(String),
    End,
}

impl Token {
    /// Display name used verbatim in parser diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Number(_) => "VALUE",
            Token::Plus => "PLUS",
            Token::Minus => "MINUS",
            Token::Star => "MULTIPLY",
            Token::Slash => "DIVIDE",
            Token::Caret => "POWER",
            Token::LParen => "OPEN_PAREN",
            Token::RParen => "CLOSE_PAREN",
            Token::Equals => "EQUAL",
            Token::Symbol(_) => "SYMBOL",
            Token::End => "(end)",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

static END: Token = Token::End;

/// Forward-only cursor over a tokenized line. Consumption never backtracks,
/// and a stream read past its last real token keeps yielding `End`.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&END)
    }

    pub fn consume(&mut self) -> Token {
        let token = self.tokens.get(self.cursor).cloned().unwrap_or(Token::End);
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }
}

/// Scans a line into tokens. Positions in diagnostics are 1-based
/// character columns.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Diagnostic> {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(ch) = lexer.peek() {
        if ch.is_whitespace() {
            lexer.pos += 1;
            continue;
        }
        if ch.is_ascii_digit()
            || (ch == '.' && lexer.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            tokens.push(Token::Number(lexer.number()));
            continue;
        }
        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' => Token::Equals,
            c if c.is_ascii_alphabetic() || c == '_' => {
                tokens.push(lexer.symbol()?);
                continue;
            }
            other => {
                return Err(Diagnostic::lexer(format!(
                    "Position {}: unexpected character {other}",
                    lexer.pos + 1
                ))
                .with_span(SourceSpan::new(lexer.pos, lexer.pos + 1)));
            }
        };
        tokens.push(token);
        lexer.pos += 1;
    }

    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Scans a numeric literal: decimal with an optional fraction and
    /// scientific exponent, or a hexadecimal float (`0x1.8p1`). The
    /// exponent marker is only consumed when digits actually follow it,
    /// so `3e` lexes as the number 3 and the symbol `e`.
    fn number(&mut self) -> f64 {
        if self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X'))
            && (self.peek_at(2).is_some_and(|c| c.is_ascii_hexdigit())
                || (self.peek_at(2) == Some('.')
                    && self.peek_at(3).is_some_and(|c| c.is_ascii_hexdigit())))
        {
            return self.hex_number();
        }

        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let has_exponent = match self.peek_at(1) {
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_exponent {
                self.pos += 2;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse().unwrap_or(0.0)
    }

    fn hex_number(&mut self) -> f64 {
        self.pos += 2;
        let mut mantissa = 0.0f64;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
            mantissa = mantissa * 16.0 + f64::from(digit);
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            let mut scale = 1.0 / 16.0;
            while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
                mantissa += f64::from(digit) * scale;
                scale /= 16.0;
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('p' | 'P')) {
            let (sign, has_exponent) = match self.peek_at(1) {
                Some('+') => (1i32, self.peek_at(2).is_some_and(|c| c.is_ascii_digit())),
                Some('-') => (-1i32, self.peek_at(2).is_some_and(|c| c.is_ascii_digit())),
                Some(c) => (1i32, c.is_ascii_digit()),
                None => (1i32, false),
            };
            if has_exponent {
                self.pos += 1;
                if matches!(self.peek(), Some('+' | '-')) {
                    self.pos += 1;
                }
                let mut exponent = 0i32;
                while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
                    exponent = exponent.saturating_mul(10).saturating_add(digit as i32);
                    self.pos += 1;
                }
                mantissa *= 2.0f64.powi(exponent.saturating_mul(sign));
            }
        }
        mantissa
    }

    fn symbol(&mut self) -> Result<Token, Diagnostic> {
        let start = self.pos;
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            if name.len() == SYMBOL_MAX_LEN {
                return Err(Diagnostic::lexer(format!(
                    "Position {}: symbol too long",
                    self.pos + 1
                ))
                .with_span(SourceSpan::new(start, self.pos + 1)));
            }
            name.push(ch);
            self.pos += 1;
        }
        Ok(Token::Symbol(name))
    }
}
