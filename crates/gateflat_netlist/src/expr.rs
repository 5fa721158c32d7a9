//! Boolean expressions over scalar signals and one-bit constants, and the
//! assignments that carry them.

use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A two-operand boolean operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `&`
    And,
    /// `|`
    Or,
    /// `^`
    Xor,
}

impl BinaryOp {
    /// The Verilog operator token.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
        }
    }

    /// Applies the operator.
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
        }
    }
}

/// An expression tree using NOT, AND, OR and XOR.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Expr {
    /// A signal read.
    Signal(Signal),
    /// A tied-off input, written `1'b0` or `1'b1`.
    Const(bool),
    /// Bitwise negation.
    Not(Box<Expr>),
    /// A binary operation.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// `~operand`
    pub fn not(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    /// `lhs op rhs`
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Evaluates the expression, reading signal values from `env`.
    pub fn eval(&self, env: &impl Fn(&Signal) -> bool) -> bool {
        match self {
            Expr::Signal(s) => env(s),
            Expr::Const(value) => *value,
            Expr::Not(e) => !e.eval(env),
            Expr::Binary(op, a, b) => op.apply(a.eval(env), b.eval(env)),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Binary(..) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl From<Signal> for Expr {
    fn from(s: Signal) -> Self {
        Expr::Signal(s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Signal(s) => write!(f, "{s}"),
            Expr::Const(value) => write!(f, "1'b{}", u8::from(*value)),
            Expr::Not(e) => {
                f.write_str("~")?;
                e.fmt_operand(f)
            }
            Expr::Binary(op, a, b) => {
                a.fmt_operand(f)?;
                write!(f, " {} ", op.symbol())?;
                b.fmt_operand(f)
            }
        }
    }
}

/// `assign <target> = <expr>;`
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Assignment {
    /// The driven signal.
    pub target: Signal,
    /// Its value.
    pub expr: Expr,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(target: Signal, expr: Expr) -> Self {
        Self { target, expr }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assign {} = {};", self.target, self.expr)
    }
}
