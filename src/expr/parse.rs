//! A minimal expression parser for rule templates and tests.
//!
//! The host language's parser is an external collaborator; this one exists so rule tables can be
//! written as literal text and compiled at startup, and so tests can state expectations as
//! strings. Grammar: numbers, identifiers, calls, `+ - * / ^ ! & | << >>`, parentheses, unary
//! minus, and implicit multiplication (`2x`, `3(x + 1)`).
//!
//! Runs of the same left-associative operator parse into one n-ary node, matching the flattened
//! expression model: `a / b / c` is a single `Divide` node with three operands.
//!
//! Identifiers admit `$`, `@` and `~` so result templates can name captures (`$1`), the target
//! symbol (`@s`) and the deferred-calculus pseudo-calls (`~d`, `~int`).

use super::{Expr, Op};
use crate::numeric::Numeric;
use crate::primitive::float_from_str;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Identifier(String),
    Symbol(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at token {})", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '$' | '@' | '~')
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '@' | '~')
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut position = 0;

    while let Some(&c) = chars.peek() {
        position += 1;
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_digit() => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(text));
            }
            c if is_ident_start(c) => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if is_ident_continue(d) {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Identifier(text));
            }
            '<' | '>' => {
                chars.next();
                if chars.peek() == Some(&c) {
                    chars.next();
                    tokens.push(Token::Symbol(if c == '<' { "<<" } else { ">>" }));
                } else {
                    return Err(ParseError {
                        message: format!("unexpected character `{}`", c),
                        position,
                    });
                }
            }
            '+' | '-' | '*' | '/' | '^' | '!' | '&' | '|' | '(' | ')' | ',' => {
                chars.next();
                tokens.push(Token::Symbol(match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    '^' => "^",
                    '!' => "!",
                    '&' => "&",
                    '|' => "|",
                    '(' => "(",
                    ')' => ")",
                    _ => ",",
                }));
            }
            other => {
                return Err(ParseError {
                    message: format!("unexpected character `{}`", other),
                    position,
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, symbol: &'static str) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.pos,
        }
    }

    /// Parses a run of same-level operators into a single n-ary node. `ops` maps an operator
    /// symbol to its [`Op`]; a change of operator within the run nests the accumulated node as
    /// the first operand of the next one, preserving left associativity.
    fn nary<F>(&mut self, ops: &[(&'static str, Op)], mut next: F) -> Result<Expr, ParseError>
    where
        F: FnMut(&mut Self) -> Result<Expr, ParseError>,
    {
        let mut lhs = next(self)?;
        loop {
            let Some(op) = ops
                .iter()
                .find(|(symbol, _)| self.peek() == Some(&Token::Symbol(*symbol)))
                .map(|&(_, op)| op)
            else {
                break;
            };

            let mut operands = vec![lhs];
            loop {
                self.pos += 1;
                operands.push(next(self)?);
                if self.peek() != Some(&Token::Symbol(op.symbol())) {
                    break;
                }
            }
            lhs = Expr::arithmetic(op, operands);
        }
        Ok(lhs)
    }

    fn bit_or(&mut self) -> Result<Expr, ParseError> {
        self.nary(&[("|", Op::BitOr)], Self::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expr, ParseError> {
        self.nary(&[("&", Op::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> Result<Expr, ParseError> {
        self.nary(
            &[("<<", Op::LeftShift), (">>", Op::RightShift)],
            Self::add_sub,
        )
    }

    fn add_sub(&mut self) -> Result<Expr, ParseError> {
        self.nary(&[("+", Op::Add), ("-", Op::Subtract)], Self::mul_div)
    }

    fn mul_div(&mut self) -> Result<Expr, ParseError> {
        self.nary(&[("*", Op::Multiply), ("/", Op::Divide)], Self::juxtaposed)
    }

    /// Implicit multiplication: a factor directly followed by an identifier, number, or
    /// parenthesized expression. Binds tighter than explicit `*` and `/`, so `2x / 4` is
    /// `(2x) / 4`.
    fn juxtaposed(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        while matches!(
            self.peek(),
            Some(Token::Identifier(_)) | Some(Token::Number(_)) | Some(&Token::Symbol("("))
        ) {
            let rhs = self.unary()?;
            // `3i` lexes as two tokens; fold adjacent numeric literals back into one value
            if let (Expr::Number(a), Expr::Number(b)) = (&lhs, &rhs) {
                lhs = Expr::Number(a.multiply(b));
            } else {
                lhs = Expr::arithmetic(Op::Multiply, vec![lhs, rhs]);
            }
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat("-") {
            Ok(self.unary()?.neg())
        } else {
            self.postfix()
        }
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.raise()?;
        while self.eat("!") {
            expr = Expr::arithmetic(Op::Factorial, vec![expr]);
        }
        Ok(expr)
    }

    fn raise(&mut self) -> Result<Expr, ParseError> {
        let base = self.primary()?;
        if self.peek() != Some(&Token::Symbol("^")) {
            return Ok(base);
        }

        let mut operands = vec![base];
        while self.eat("^") {
            if self.eat("-") {
                operands.push(self.primary()?.neg());
            } else {
                operands.push(self.primary()?);
            }
        }
        Ok(Expr::arithmetic(Op::Raise, operands))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::Number(text)) => Ok(Expr::Number(Numeric::Real(float_from_str(&text)))),
            Some(Token::Identifier(name)) => {
                if name == "i" {
                    return Ok(Expr::Number(Numeric::imaginary(0, 1)));
                }
                if self.eat("(") {
                    let mut args = Vec::new();
                    if !self.eat(")") {
                        loop {
                            args.push(self.bit_or()?);
                            if self.eat(")") {
                                break;
                            }
                            if !self.eat(",") {
                                return Err(self.error("expected `,` or `)` in argument list"));
                            }
                        }
                    }
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            Some(Token::Symbol("(")) => {
                let inner = self.bit_or()?;
                if !self.eat(")") {
                    return Err(self.error("expected `)`"));
                }
                Ok(inner.grouped())
            }
            Some(token) => Err(self.error(format!("unexpected token {:?}", token))),
            None => Err(self.error("unexpected end of input")),
        }
    }
}

/// Parses expression text into an [`Expr`].
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.bit_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.error("trailing input"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nary_runs() {
        let expr = parse("a - b - c").unwrap();
        let node = expr.as_arithmetic().unwrap();
        assert_eq!(node.op, Op::Subtract);
        assert_eq!(node.operands.len(), 3);

        let expr = parse("10 / 5 / 2").unwrap();
        assert_eq!(expr.as_arithmetic().unwrap().operands.len(), 3);
    }

    #[test]
    fn operator_change_nests() {
        // (a - b) + c, left associative
        let expr = parse("a - b + c").unwrap();
        let node = expr.as_arithmetic().unwrap();
        assert_eq!(node.op, Op::Add);
        assert_eq!(node.operands[0].as_arithmetic().unwrap().op, Op::Subtract);
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(parse("2x").unwrap(), parse("2 * x").unwrap());
        assert_eq!(parse("3(x + 1)").unwrap(), parse("3 * (x + 1)").unwrap());
        assert_eq!(parse("3x^2y").unwrap(), parse("3 * x^2 * y").unwrap());
        assert_eq!(parse("2sin(x)").unwrap(), parse("2 * sin(x)").unwrap());
        // juxtaposition binds tighter than explicit division
        assert_eq!(parse("2x / 4y").unwrap(), parse("(2 * x) / (4 * y)").unwrap());
    }

    #[test]
    fn unary_minus() {
        assert_eq!(parse("-x").unwrap(), parse("-1 * x").unwrap());
        assert_eq!(parse("-2").unwrap(), Expr::int(-2));
        assert_eq!(parse("x^-2").unwrap(), Expr::raise(Expr::symbol("x"), Expr::int(-2)));
    }

    #[test]
    fn calls_and_imaginary() {
        assert_eq!(
            parse("f(x, y)").unwrap(),
            Expr::call("f", vec![Expr::symbol("x"), Expr::symbol("y")])
        );
        assert_eq!(parse("i").unwrap(), Expr::Number(Numeric::imaginary(0, 1)));
        assert_eq!(parse("2 + 3i").unwrap().to_string(), "2 + 3i");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("x +").is_err());
        assert!(parse("(x").is_err());
        assert!(parse("x ; y").is_err());
    }
}
