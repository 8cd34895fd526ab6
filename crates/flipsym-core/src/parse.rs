//! Reading expressions from prefix notation.
//!
//! The grammar is a plain s-expression:
//!
//! ```text
//! expr  := atom | "(" head expr* ")"
//! atom  := integer | integer "/" integer | decimal | "pi" | identifier
//! head  := "+" | "-" | "*" | "/" | "^" | "neg" | "sqrt" | function name
//! ```
//!
//! Model files use this form for kernels, and `Expr` serialises through it.

use std::str::FromStr;

use flipsym_integers::Rational;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::expr::{Expr, Func};
use crate::symbol::Symbol;

/// Errors from [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input ended inside an expression.
    #[error("unexpected end of input")]
    UnexpectedEnd,
    /// A closing parenthesis without a matching opening one.
    #[error("unexpected `)` at offset {0}")]
    UnexpectedClose(usize),
    /// Input left over after a complete expression.
    #[error("trailing input at offset {0}")]
    Trailing(usize),
    /// An atom that is neither a number nor a valid identifier.
    #[error("invalid atom `{0}`")]
    InvalidAtom(String),
    /// An unknown operator or function name.
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    /// An operator applied to the wrong number of arguments.
    #[error("`{op}` takes {expected} arguments, got {got}")]
    Arity {
        /// The operator.
        op: String,
        /// Expected count, as text ("1", "2", "at least 1").
        expected: &'static str,
        /// Actual count.
        got: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn tokenize(input: &str) -> Vec<(usize, Token<'_>)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in input.char_indices() {
        let is_delim = ch == '(' || ch == ')' || ch.is_whitespace();
        if is_delim {
            if let Some(s) = start.take() {
                tokens.push((s, Token::Atom(&input[s..i])));
            }
            match ch {
                '(' => tokens.push((i, Token::Open)),
                ')' => tokens.push((i, Token::Close)),
                _ => {}
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push((s, Token::Atom(&input[s..])));
    }
    tokens
}

struct Parser<'a> {
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<(usize, Token<'a>)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        match self.next() {
            None => Err(ParseError::UnexpectedEnd),
            Some((offset, Token::Close)) => Err(ParseError::UnexpectedClose(offset)),
            Some((_, Token::Atom(text))) => atom(text),
            Some((_, Token::Open)) => {
                let head = match self.next() {
                    Some((_, Token::Atom(text))) => text,
                    Some((offset, Token::Close)) => return Err(ParseError::UnexpectedClose(offset)),
                    Some((_, Token::Open)) => {
                        return Err(ParseError::UnknownOperator("(".to_string()))
                    }
                    None => return Err(ParseError::UnexpectedEnd),
                };
                let mut args = Vec::new();
                loop {
                    match self.peek() {
                        None => return Err(ParseError::UnexpectedEnd),
                        Some(Token::Close) => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => args.push(self.expr()?),
                    }
                }
                apply(head, args)
            }
        }
    }
}

fn atom(text: &str) -> Result<Expr, ParseError> {
    if text == "pi" {
        return Ok(Expr::pi());
    }
    if let Ok(r) = Rational::from_str(text) {
        return Ok(Expr::number(r));
    }
    if Symbol::is_valid_name(text) {
        return Ok(Expr::from(Symbol::new(text)));
    }
    Err(ParseError::InvalidAtom(text.to_string()))
}

fn arity(op: &str, expected: &'static str, got: usize) -> ParseError {
    ParseError::Arity {
        op: op.to_string(),
        expected,
        got,
    }
}

fn apply(head: &str, mut args: Vec<Expr>) -> Result<Expr, ParseError> {
    let n = args.len();
    match head {
        "+" => Ok(Expr::add(args)),
        "*" => Ok(Expr::mul(args)),
        "-" => match n {
            1 => Ok(-args.remove(0)),
            2 => {
                let b = args.remove(1);
                Ok(args.remove(0) - b)
            }
            _ => Err(arity(head, "1 or 2", n)),
        },
        "neg" if n == 1 => Ok(-args.remove(0)),
        "/" if n == 2 => {
            let b = args.remove(1);
            Ok(args.remove(0) / b)
        }
        "^" if n == 2 => {
            let e = args.remove(1);
            Ok(Expr::pow(args.remove(0), e))
        }
        "sqrt" if n == 1 => Ok(args.remove(0).sqrt()),
        "neg" | "sqrt" => Err(arity(head, "1", n)),
        "/" | "^" => Err(arity(head, "2", n)),
        _ => {
            let func = Func::from_name(head).ok_or_else(|| ParseError::UnknownOperator(head.to_string()))?;
            if n != func.arity() {
                let expected = match func.arity() {
                    1 => "1",
                    2 => "2",
                    3 => "3",
                    _ => "4",
                };
                return Err(arity(head, expected, n));
            }
            Ok(Expr::apply(func, args))
        }
    }
}

/// Parses an expression in prefix notation.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first problem found.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens: tokenize(input),
        pos: 0,
    };
    let expr = parser.expr()?;
    match parser.tokens.get(parser.pos) {
        Some((offset, _)) => Err(ParseError::Trailing(*offset)),
        None => Ok(expr),
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_sexpr())
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atoms() {
        assert_eq!(parse("42").unwrap(), Expr::integer(42));
        assert_eq!(parse("-3/4").unwrap(), Expr::rational(-3, 4));
        assert_eq!(parse("0.5").unwrap(), Expr::rational(1, 2));
        assert_eq!(parse("pi").unwrap(), Expr::pi());
        assert_eq!(parse("sig_g").unwrap(), Expr::symbol("sig_g"));
        assert!(matches!(parse("2x"), Err(ParseError::InvalidAtom(_))));
    }

    #[test]
    fn test_parse_kernel() {
        let e = parse("(* 100 (/ mu k) (exp (neg (/ (^ (* k sig_g mu) 2) 2))))").unwrap();
        let k = Expr::symbol("k");
        let mu = Expr::symbol("mu");
        let sig = Expr::symbol("sig_g");
        let expected = Expr::integer(100) * (mu.clone() / k.clone())
            * (-(Expr::mul([k, sig, mu]).powi(2) / Expr::integer(2))).exp();
        assert_eq!(e, expected);
    }

    #[test]
    fn test_parse_functions() {
        let e = parse("(ynm_c 2 -1 theta 0)").unwrap();
        assert_eq!(
            e,
            Expr::ynm_conj(2, -1, Expr::symbol("theta"), Expr::zero())
        );
        assert!(matches!(
            parse("(legendre 2)"),
            Err(ParseError::Arity { .. })
        ));
        assert!(matches!(
            parse("(tan x)"),
            Err(ParseError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("(+ x"), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse(")"), Err(ParseError::UnexpectedClose(0)));
        assert_eq!(parse("x y"), Err(ParseError::Trailing(2)));
    }

    #[test]
    fn test_sexpr_round_trip() {
        let e = parse("(+ (* 3/2 (^ mu 2)) (cos (* 2 phi)) -1/2 (sqrt 2))").unwrap();
        assert_eq!(parse(&e.to_sexpr()).unwrap(), e);
    }

    #[test]
    fn test_serde_through_sexpr() {
        let e = parse("(* 10000 mu1 mu2 (^ k -2))").unwrap();
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "\"(* 10000 mu1 mu2 (^ k -2))\"");
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
