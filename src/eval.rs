use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::parse::{Expr, Op};

#[derive(Error, Debug, Diagnostic)]
#[error("division by zero")]
#[diagnostic(help("the right-hand side of `/` evaluated to exactly zero"))]
pub struct DivisionByZero {
    #[source_code]
    src: Option<NamedSource<String>>,

    #[label("this division")]
    operator: SourceSpan,

    pub dividend: f64,
}

impl DivisionByZero {
    /// Attaches the expression text so the report can point at the operator.
    pub fn with_source(mut self, whole: &str) -> Self {
        self.src = Some(NamedSource::new(crate::parse::SOURCE_NAME, whole.to_string()));
        self
    }

    pub fn operator(&self) -> SourceSpan {
        self.operator
    }
}

impl Expr {
    /// Reduces the tree to a single value, left operand first.
    pub fn compute(&self) -> Result<f64, DivisionByZero> {
        match self {
            Expr::Leaf(n) => Ok(*n),
            Expr::BinaryOp(op, lhs, rhs, span) => {
                let lhs = lhs.compute()?;
                let rhs = rhs.compute()?;
                op.apply(lhs, rhs).ok_or(DivisionByZero {
                    src: None,
                    operator: *span,
                    dividend: lhs,
                })
            }
        }
    }
}

impl Op {
    /// Returns `None` only for a division whose right-hand side is zero.
    pub fn apply(self, lhs: f64, rhs: f64) -> Option<f64> {
        Some(match self {
            Op::Plus => lhs + rhs,
            Op::Minus => lhs - rhs,
            Op::Star => lhs * rhs,
            Op::Slash => {
                if rhs == 0.0 {
                    return None;
                }
                lhs / rhs
            }
        })
    }
}
