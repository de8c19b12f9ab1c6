// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Gettext plural expressions such as `n%10==1 && n%100!=11 ? 0 : 1`.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Or,
    And,
    Equal,
    NotEqual,
    Smaller,
    SmallerOrEqual,
    Greater,
    GreaterOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Operator {
    fn apply(self, lhs: u64, rhs: u64) -> u64 {
        match self {
            Operator::Or => u64::from(lhs != 0 || rhs != 0),
            Operator::And => u64::from(lhs != 0 && rhs != 0),
            Operator::Equal => u64::from(lhs == rhs),
            Operator::NotEqual => u64::from(lhs != rhs),
            Operator::Smaller => u64::from(lhs < rhs),
            Operator::SmallerOrEqual => u64::from(lhs <= rhs),
            Operator::Greater => u64::from(lhs > rhs),
            Operator::GreaterOrEqual => u64::from(lhs >= rhs),
            Operator::Add => lhs.wrapping_add(rhs),
            Operator::Subtract => lhs.wrapping_sub(rhs),
            Operator::Multiply => lhs.wrapping_mul(rhs),
            // Division by zero has no meaning for a plural formula,
            // but evaluation must stay total.
            Operator::Divide => lhs.checked_div(rhs).unwrap_or(0),
            Operator::Modulo => lhs.checked_rem(rhs).unwrap_or(0),
        }
    }
}

/// Parsed plural expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ast {
    /// `cond ? then : otherwise`
    Ternary(Box<Ast>, Box<Ast>, Box<Ast>),
    /// The quantity.
    N,
    Integer(u64),
    Op(Operator, Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
}

impl Ast {
    /// Parse a C-like plural expression.
    pub fn parse(src: &str) -> Result<Ast, ExpressionError> {
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let ast = parser.ternary()?;
        match parser.peek() {
            None => Ok(ast),
            Some(token) => Err(ExpressionError(format!("unexpected {token} in {src:?}"))),
        }
    }

    /// Evaluate the expression for the quantity `n`.
    pub fn evaluate(&self, n: u64) -> u64 {
        match self {
            Ast::Ternary(cond, then, otherwise) => {
                if cond.evaluate(n) != 0 {
                    then.evaluate(n)
                } else {
                    otherwise.evaluate(n)
                }
            }
            Ast::N => n,
            Ast::Integer(value) => *value,
            // Short-circuit like C does.
            Ast::Op(Operator::And, lhs, rhs) => {
                u64::from(lhs.evaluate(n) != 0 && rhs.evaluate(n) != 0)
            }
            Ast::Op(Operator::Or, lhs, rhs) => {
                u64::from(lhs.evaluate(n) != 0 || rhs.evaluate(n) != 0)
            }
            Ast::Op(op, lhs, rhs) => op.apply(lhs.evaluate(n), rhs.evaluate(n)),
            Ast::Not(inner) => u64::from(inner.evaluate(n) == 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError(pub String);

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ExpressionError {}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    N,
    Integer(u64),
    Op(Operator),
    Not,
    Question,
    Colon,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::N => write!(f, "'n'"),
            Token::Integer(value) => write!(f, "'{value}'"),
            Token::Op(op) => write!(f, "operator {op:?}"),
            Token::Not => write!(f, "'!'"),
            Token::Question => write!(f, "'?'"),
            Token::Colon => write!(f, "':'"),
            Token::Open => write!(f, "'('"),
            Token::Close => write!(f, "')'"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            'n' => Token::N,
            '0'..='9' => {
                let mut end = idx + 1;
                while let Some(&(i, c)) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                let value = src[idx..end]
                    .parse()
                    .map_err(|_| ExpressionError(format!("number too large in {src:?}")))?;
                Token::Integer(value)
            }
            '?' => Token::Question,
            ':' => Token::Colon,
            '(' => Token::Open,
            ')' => Token::Close,
            '+' => Token::Op(Operator::Add),
            '-' => Token::Op(Operator::Subtract),
            '*' => Token::Op(Operator::Multiply),
            '/' => Token::Op(Operator::Divide),
            '%' => Token::Op(Operator::Modulo),
            '|' if eat(&mut chars, '|') => Token::Op(Operator::Or),
            '&' if eat(&mut chars, '&') => Token::Op(Operator::And),
            '=' if eat(&mut chars, '=') => Token::Op(Operator::Equal),
            '!' if eat(&mut chars, '=') => Token::Op(Operator::NotEqual),
            '!' => Token::Not,
            '<' if eat(&mut chars, '=') => Token::Op(Operator::SmallerOrEqual),
            '<' => Token::Op(Operator::Smaller),
            '>' if eat(&mut chars, '=') => Token::Op(Operator::GreaterOrEqual),
            '>' => Token::Op(Operator::Greater),
            _ => {
                return Err(ExpressionError(format!(
                    "unexpected character {ch:?} in {src:?}"
                )))
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

fn eat(chars: &mut Peekable<CharIndices<'_>>, expected: char) -> bool {
    if chars.peek().map(|&(_, c)| c) == Some(expected) {
        chars.next();
        true
    } else {
        false
    }
}

/// Binary operators from loosest to tightest binding.
const PRECEDENCE: &[&[Operator]] = &[
    &[Operator::Or],
    &[Operator::And],
    &[Operator::Equal, Operator::NotEqual],
    &[
        Operator::Smaller,
        Operator::SmallerOrEqual,
        Operator::Greater,
        Operator::GreaterOrEqual,
    ],
    &[Operator::Add, Operator::Subtract],
    &[Operator::Multiply, Operator::Divide, Operator::Modulo],
];

/// Deepest nesting of parentheses, ternaries and negations accepted.
const MAX_DEPTH: usize = 64;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionError> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ExpressionError(format!("expected {expected}, found {token}"))),
            None => Err(ExpressionError(format!(
                "expected {expected}, found end of expression"
            ))),
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Ast, ExpressionError>,
    ) -> Result<Ast, ExpressionError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError(format!(
                "expression nested deeper than {MAX_DEPTH} levels"
            )));
        }
        self.depth += 1;
        let ast = parse(self);
        self.depth -= 1;
        ast
    }

    fn ternary(&mut self) -> Result<Ast, ExpressionError> {
        self.nested(Self::conditional)
    }

    fn conditional(&mut self) -> Result<Ast, ExpressionError> {
        let cond = self.binary(0)?;
        if self.peek() != Some(&Token::Question) {
            return Ok(cond);
        }
        self.next();
        let then = self.ternary()?;
        self.expect(Token::Colon)?;
        let otherwise = self.ternary()?;
        Ok(Ast::Ternary(
            Box::new(cond),
            Box::new(then),
            Box::new(otherwise),
        ))
    }

    fn binary(&mut self, level: usize) -> Result<Ast, ExpressionError> {
        let Some(operators) = PRECEDENCE.get(level) else {
            return self.unary();
        };
        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            if !operators.contains(&op) {
                break;
            }
            self.next();
            let rhs = self.binary(level + 1)?;
            lhs = Ast::Op(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Ast, ExpressionError> {
        match self.next() {
            Some(Token::Not) => Ok(Ast::Not(Box::new(self.nested(Self::unary)?))),
            Some(Token::N) => Ok(Ast::N),
            Some(Token::Integer(value)) => Ok(Ast::Integer(value)),
            Some(Token::Open) => {
                let inner = self.ternary()?;
                self.expect(Token::Close)?;
                Ok(inner)
            }
            Some(token) => Err(ExpressionError(format!("unexpected {token}"))),
            None => Err(ExpressionError(String::from(
                "unexpected end of expression",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_precedence() {
        assert_eq!(
            Ast::parse("n == 42 ? n : 6 && n < 7").unwrap(),
            Ast::Ternary(
                Box::new(Ast::Op(
                    Operator::Equal,
                    Box::new(Ast::N),
                    Box::new(Ast::Integer(42))
                )),
                Box::new(Ast::N),
                Box::new(Ast::Op(
                    Operator::And,
                    Box::new(Ast::Integer(6)),
                    Box::new(Ast::Op(
                        Operator::Smaller,
                        Box::new(Ast::N),
                        Box::new(Ast::Integer(7))
                    ))
                ))
            )
        );
        assert_eq!(Ast::parse("(n)").unwrap(), Ast::N);
    }

    #[test]
    fn test_evaluate_russian() {
        let ru = Ast::parse(
            "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
        )
        .unwrap();
        let forms = [1, 2, 5, 11, 21, 22, 25, 111, 112]
            .iter()
            .map(|&n| ru.evaluate(n))
            .collect::<Vec<_>>();
        assert_eq!(forms, vec![0, 1, 2, 2, 0, 1, 2, 2, 2]);
    }

    #[test]
    fn test_evaluate_is_total() {
        let ast = Ast::parse("n / 0 + n % 0 + (0 - 1) * 2").unwrap();
        assert_eq!(ast.evaluate(5), 0u64.wrapping_sub(2));
    }

    #[test]
    fn test_not() {
        let ast = Ast::parse("!(n == 1)").unwrap();
        assert_eq!(ast.evaluate(1), 0);
        assert_eq!(ast.evaluate(3), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Ast::parse("").is_err());
        assert!(Ast::parse("n ==").is_err());
        assert!(Ast::parse("(n != 1").is_err());
        assert!(Ast::parse("n ? 1").is_err());
        assert!(Ast::parse("x > 1").is_err());
        assert!(Ast::parse("n = 1").is_err());
        assert!(Ast::parse("n 1").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}n{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(Ast::parse(&nested(MAX_DEPTH - 1)).unwrap(), Ast::N);
        assert!(Ast::parse(&nested(MAX_DEPTH)).is_err());
        assert!(Ast::parse(&nested(100_000)).is_err());
        assert!(Ast::parse(&format!("{}n", "!".repeat(100_000))).is_err());
    }
}
