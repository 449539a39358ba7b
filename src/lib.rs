pub mod eval;
pub mod lex;
pub mod parse;

pub use lex::Lexer;
pub use parse::{Expr, Op, Parser};

use log::debug;

/// Parses `input` in full and evaluates it.
pub fn calculate(input: &str) -> Result<f64, miette::Error> {
    let expr = Parser::new(input).parse()?;
    debug!("parsed {expr}");
    let value = expr.compute().map_err(|err| err.with_source(input))?;
    debug!("{expr} = {value}");
    Ok(value)
}
