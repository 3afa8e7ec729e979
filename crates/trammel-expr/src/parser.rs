//! Infix parser for user-entered dimensions. Supports constants, `sqrt`,
//! `sin`, `cos` (trig arguments in degrees), parenthesization, and
//! `+ - * /` with conventional precedence; minus is binary or unary by
//! context.

use std::f64::consts::PI;

use thiserror::Error;

use crate::arena::{ExprArena, ExprRef};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("end of expression unexpected")]
    UnexpectedEnd,
    #[error("expected: )")]
    ExpectedParen,
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("unexpected characters in expression")]
    UnexpectedChars,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Const(f64),
    Func(Func),
    Op(char),
    OpenParen,
    CloseParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Sqrt,
    Sin,
    Cos,
}

fn lex(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            let mut number = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    number.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let v: f64 = number.parse().map_err(|_| ParseError::UnexpectedChars)?;
            tokens.push(Token::Const(v));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut name = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_alphanumeric() || d == '_' {
                    name.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let f = match name.as_str() {
                "sqrt" => Func::Sqrt,
                "sin" => Func::Sin,
                "cos" => Func::Cos,
                _ => return Err(ParseError::UnknownName(name)),
            };
            tokens.push(Token::Func(f));
        } else if "+-*/".contains(c) {
            tokens.push(Token::Op(c));
            chars.next();
        } else if c == '(' {
            tokens.push(Token::OpenParen);
            chars.next();
        } else if c == ')' {
            tokens.push(Token::CloseParen);
            chars.next();
        } else if c.is_whitespace() {
            chars.next();
        } else {
            return Err(ParseError::UnexpectedChars);
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    at: usize,
    arena: &'a mut ExprArena,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.at)
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        let t = self.tokens.get(self.at).cloned().ok_or(ParseError::UnexpectedEnd)?;
        self.at += 1;
        Ok(t)
    }

    /// expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<ExprRef, ParseError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(c @ ('+' | '-'))) = self.peek() {
            let c = *c;
            self.at += 1;
            let rhs = self.term()?;
            lhs = if c == '+' {
                self.arena.plus(lhs, rhs)
            } else {
                self.arena.minus(lhs, rhs)
            };
        }
        Ok(lhs)
    }

    /// term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<ExprRef, ParseError> {
        let mut lhs = self.factor()?;
        while let Some(Token::Op(c @ ('*' | '/'))) = self.peek() {
            let c = *c;
            self.at += 1;
            let rhs = self.factor()?;
            lhs = if c == '*' {
                self.arena.times(lhs, rhs)
            } else {
                self.arena.div(lhs, rhs)
            };
        }
        Ok(lhs)
    }

    /// factor := constant | func factor | '-' factor | '(' expr ')'
    fn factor(&mut self) -> Result<ExprRef, ParseError> {
        match self.next()? {
            Token::Const(v) => Ok(self.arena.constant(v)),
            Token::Op('-') => {
                let inner = self.factor()?;
                Ok(self.arena.negate(inner))
            }
            Token::Func(f) => {
                let inner = self.factor()?;
                Ok(match f {
                    Func::Sqrt => self.arena.sqrt(inner),
                    Func::Sin => {
                        let k = self.arena.constant(PI / 180.0);
                        let rad = self.arena.times(inner, k);
                        self.arena.sin(rad)
                    }
                    Func::Cos => {
                        let k = self.arena.constant(PI / 180.0);
                        let rad = self.arena.times(inner, k);
                        self.arena.cos(rad)
                    }
                })
            }
            Token::OpenParen => {
                let inner = self.expr()?;
                match self.peek() {
                    Some(Token::CloseParen) => {
                        self.at += 1;
                        Ok(inner)
                    }
                    Some(_) => Err(ParseError::ExpectedParen),
                    None => Err(ParseError::ExpectedParen),
                }
            }
            _ => Err(ParseError::UnexpectedChars),
        }
    }
}

/// Parse an infix expression into the arena. Used wherever the user can
/// type a number.
pub fn parse_expression(input: &str, arena: &mut ExprArena) -> Result<ExprRef, ParseError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEnd);
    }
    let mut p = Parser {
        tokens,
        at: 0,
        arena,
    };
    let e = p.expr()?;
    if p.at != p.tokens.len() {
        return Err(ParseError::UnexpectedChars);
    }
    Ok(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use trammel_types::HParam;

    fn eval(input: &str) -> f64 {
        let mut ar = ExprArena::new();
        let e = parse_expression(input, &mut ar).unwrap();
        ar.eval_with(e, &|_: HParam| unreachable!())
    }

    #[test]
    fn precedence_and_parens() {
        assert_relative_eq!(eval("1 + 2 * 3"), 7.0);
        assert_relative_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_relative_eq!(eval("8 / 2 / 2"), 2.0);
        assert_relative_eq!(eval("2 - 3 - 4"), -5.0);
    }

    #[test]
    fn unary_minus() {
        assert_relative_eq!(eval("-3 + 5"), 2.0);
        assert_relative_eq!(eval("2 * -3"), -6.0);
        assert_relative_eq!(eval("-(1 + 2)"), -3.0);
    }

    #[test]
    fn functions_take_degrees() {
        assert_relative_eq!(eval("sin 30"), 0.5, epsilon = 1e-12);
        assert_relative_eq!(eval("cos 60"), 0.5, epsilon = 1e-12);
        assert_relative_eq!(eval("sqrt 16"), 4.0);
        assert_relative_eq!(eval("sqrt(2 + 2)"), 2.0);
    }

    #[test]
    fn errors() {
        let mut ar = ExprArena::new();
        assert_eq!(
            parse_expression("1 +", &mut ar),
            Err(ParseError::UnexpectedEnd)
        );
        assert_eq!(
            parse_expression("(1 + 2", &mut ar),
            Err(ParseError::ExpectedParen)
        );
        assert_eq!(
            parse_expression("tan 45", &mut ar),
            Err(ParseError::UnknownName("tan".into()))
        );
        assert_eq!(
            parse_expression("1 # 2", &mut ar),
            Err(ParseError::UnexpectedChars)
        );
        assert_eq!(parse_expression("", &mut ar), Err(ParseError::UnexpectedEnd));
        assert_eq!(
            parse_expression("1 2", &mut ar),
            Err(ParseError::UnexpectedChars)
        );
    }
}
