use std::{fmt::Display, num::ParseFloatError};

use log::trace;
use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    Lexer,
    lex::{Token, TokenKind},
};

pub(crate) const SOURCE_NAME: &str = "<expression>";

fn shown(literal: &str) -> &str {
    if literal.is_empty() { "<eof>" } else { literal }
}

#[derive(Error, Debug, Diagnostic)]
#[error("unexpected token `{}`", shown(.token))]
#[diagnostic(help("expected {expected} here"))]
pub struct UnexpectedToken {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    bad_bit: SourceSpan,

    pub token: String,
    pub expected: &'static str,
}

#[derive(Error, Debug, Diagnostic)]
#[error("missing operator, we found `{}` instead", shown(.token))]
#[diagnostic(help("put one of `+`, `-`, `*` or `/` between the two operands"))]
pub struct MissingOperator {
    #[source_code]
    src: NamedSource<String>,

    #[label("expected an operator before this")]
    bad_bit: SourceSpan,

    pub token: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("token `{}` after parsing not expected", shown(.token))]
#[diagnostic(help("remove everything after the end of the expression"))]
pub struct TrailingToken {
    #[source_code]
    src: NamedSource<String>,

    #[label("the expression already ended")]
    bad_bit: SourceSpan,

    pub token: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("`{token}` is not a valid number")]
#[diagnostic(code(calc::invalid_number))]
pub struct InvalidNumber {
    #[source_code]
    src: NamedSource<String>,

    #[label("this numeric literal")]
    bad_bit: SourceSpan,

    pub token: String,

    #[source]
    err: ParseFloatError,
}

/// An expression tree. Children are owned by their parent and the tree is
/// never mutated once built.
///
/// The span of a `BinaryOp` points at its operator in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Leaf(f64),
    BinaryOp(Op, Box<Expr>, Box<Expr>, SourceSpan),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
}

impl TryFrom<TokenKind> for Op {
    type Error = TokenKind;

    fn try_from(kind: TokenKind) -> Result<Self, Self::Error> {
        match kind {
            TokenKind::Plus => Ok(Op::Plus),
            TokenKind::Minus => Ok(Op::Minus),
            TokenKind::Star => Ok(Op::Star),
            TokenKind::Slash => Ok(Op::Slash),
            other => Err(other),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Plus => write!(f, "+"),
            Op::Minus => write!(f, "-"),
            Op::Star => write!(f, "*"),
            Op::Slash => write!(f, "/"),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Leaf(n) => write!(f, "{n}"),
            Expr::BinaryOp(op, lhs, rhs, _) => write!(f, "({op} {lhs} {rhs})"),
        }
    }
}

/// Recursive descent parser.
///
/// `+` and `-` take a whole expression as their right operand, so additive
/// chains associate to the right (`10-3-2` is `10-(3-2)`), while `*` and `/`
/// only take the next value and chain left to right.
pub struct Parser<'de> {
    whole: &'de str,
    lexer: Lexer<'de>,
    pending: Vec<Token<'de>>,
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Self {
        Parser {
            whole,
            lexer: Lexer::new(whole),
            pending: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Expr, Error> {
        let expr = self.parse_expression()?;
        let token = self.scan_ignore_whitespace();
        if token.kind != TokenKind::Eof {
            return Err(TrailingToken {
                src: self.source(),
                bad_bit: token.span(),
                token: token.literal.to_string(),
            }
            .into());
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr, Error> {
        let mut node = self.find_value()?;

        loop {
            let token = self.scan_ignore_whitespace();
            let op = match token.kind {
                TokenKind::Eof => return Ok(node),
                TokenKind::RightParen => {
                    self.unscan(token);
                    return Ok(node);
                }
                kind => Op::try_from(kind).map_err(|_| MissingOperator {
                    src: self.source(),
                    bad_bit: token.span(),
                    token: token.literal.to_string(),
                })?,
            };
            trace!("operator {op} at byte {}", token.offset);

            let rhs = match op {
                Op::Plus | Op::Minus => self.parse_expression()?,
                Op::Star | Op::Slash => self.find_value()?,
            };
            node = Expr::BinaryOp(op, Box::new(node), Box::new(rhs), token.span());
        }
    }

    fn find_value(&mut self) -> Result<Expr, Error> {
        let token = self.scan_ignore_whitespace();
        match token.kind {
            TokenKind::LeftParen => {
                let node = self.parse_expression()?;
                let closing = self.scan_ignore_whitespace();
                if closing.kind != TokenKind::RightParen {
                    return Err(self.unexpected(closing, "`)`"));
                }
                Ok(node)
            }
            TokenKind::Number => {
                let n = token.literal.parse::<f64>().map_err(|err| InvalidNumber {
                    src: self.source(),
                    bad_bit: token.span(),
                    token: token.literal.to_string(),
                    err,
                })?;
                Ok(Expr::Leaf(n))
            }
            _ => Err(self.unexpected(token, "a number or `(`")),
        }
    }

    fn unexpected(&self, token: Token<'de>, expected: &'static str) -> Error {
        UnexpectedToken {
            src: self.source(),
            bad_bit: token.span(),
            token: token.literal.to_string(),
            expected,
        }
        .into()
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(SOURCE_NAME, self.whole.to_string())
    }

    /// Returns the most recently pushed back token, or reads a new one.
    fn scan(&mut self) -> Token<'de> {
        if let Some(token) = self.pending.pop() {
            return token;
        }
        let token = self.lexer.next_token();
        trace!("scanned {token}");
        token
    }

    fn scan_ignore_whitespace(&mut self) -> Token<'de> {
        let mut token = self.scan();
        while token.kind == TokenKind::Whitespace {
            token = self.scan();
        }
        token
    }

    fn unscan(&mut self, token: Token<'de>) {
        self.pending.push(token);
    }
}
