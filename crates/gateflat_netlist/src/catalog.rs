//! The supported primitive cells.
//!
//! Each cell is a row of data: its keyword, pin names, operator and whether
//! the operator alone expresses it. Cells without a single-operator form
//! are emitted through an auxiliary wire holding the un-negated value,
//! followed by a negation. Adding a primitive means adding a row.

use crate::expr::{Assignment, BinaryOp, Expr};
use crate::signal::Signal;
use serde::Serialize;

/// The logic function of a catalog cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum CellKind {
    /// `Z = ~A`
    Inv,
    /// `Z = A & B`
    And,
    /// `Z = A | B`
    Or,
    /// `Z = A ^ B`
    Xor,
    /// `Z = ~(A ^ B)`
    Xnor,
    /// `Z = ~(A | B)`
    Nor,
}

impl CellKind {
    /// The cell's truth function, independent of how it is translated.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is shorter than the cell's input count.
    pub fn reference(self, inputs: &[bool]) -> bool {
        match self {
            CellKind::Inv => !inputs[0],
            CellKind::And => inputs[0] && inputs[1],
            CellKind::Or => inputs[0] || inputs[1],
            CellKind::Xor => inputs[0] != inputs[1],
            CellKind::Xnor => inputs[0] == inputs[1],
            CellKind::Nor => !(inputs[0] || inputs[1]),
        }
    }
}

/// The operator a cell is built from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operator {
    /// Unary negation.
    Not,
    /// A binary operator.
    Binary(BinaryOp),
}

/// How the operator maps onto the cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Form {
    /// `Z = op(inputs)`
    Direct,
    /// `Z_neg = op(inputs); Z = ~Z_neg`
    Negated,
}

/// One catalog row.
#[derive(Debug)]
pub struct CellSpec {
    /// Cell-type keyword as written by the synthesizer.
    pub keyword: &'static str,
    /// Logic function.
    pub kind: CellKind,
    /// Input pin names, in operand order.
    pub inputs: &'static [&'static str],
    /// Output pin name.
    pub output: &'static str,
    /// Operator.
    pub operator: Operator,
    /// Direct or negated.
    pub form: Form,
}

const UNARY: &[&str] = &["A"];
const BINARY: &[&str] = &["A", "B"];

/// All supported cells.
pub static CATALOG: &[CellSpec] = &[
    CellSpec {
        keyword: "IV",
        kind: CellKind::Inv,
        inputs: UNARY,
        output: "Z",
        operator: Operator::Not,
        form: Form::Direct,
    },
    CellSpec {
        keyword: "INV",
        kind: CellKind::Inv,
        inputs: UNARY,
        output: "Z",
        operator: Operator::Not,
        form: Form::Direct,
    },
    CellSpec {
        keyword: "AND",
        kind: CellKind::And,
        inputs: BINARY,
        output: "Z",
        operator: Operator::Binary(BinaryOp::And),
        form: Form::Direct,
    },
    CellSpec {
        keyword: "OR",
        kind: CellKind::Or,
        inputs: BINARY,
        output: "Z",
        operator: Operator::Binary(BinaryOp::Or),
        form: Form::Direct,
    },
    CellSpec {
        keyword: "XOR",
        kind: CellKind::Xor,
        inputs: BINARY,
        output: "Z",
        operator: Operator::Binary(BinaryOp::Xor),
        form: Form::Direct,
    },
    CellSpec {
        keyword: "XNOR",
        kind: CellKind::Xnor,
        inputs: BINARY,
        output: "Z",
        operator: Operator::Binary(BinaryOp::Xor),
        form: Form::Negated,
    },
    CellSpec {
        keyword: "NOR",
        kind: CellKind::Nor,
        inputs: BINARY,
        output: "Z",
        operator: Operator::Binary(BinaryOp::Or),
        form: Form::Negated,
    },
];

/// Finds the row for a cell-type keyword.
pub fn lookup(keyword: &str) -> Option<&'static CellSpec> {
    CATALOG.iter().find(|spec| spec.keyword == keyword)
}

/// The assignments replacing one gate, plus the auxiliary wire they need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Translation {
    /// One assignment, or two for negated cells (auxiliary first).
    pub assignments: Vec<Assignment>,
    /// The auxiliary wire, for negated cells.
    pub auxiliary: Option<Signal>,
}

impl CellSpec {
    /// Whether `pin` belongs to this cell.
    pub fn has_pin(&self, pin: &str) -> bool {
        self.output == pin || self.inputs.contains(&pin)
    }

    /// Input pins followed by the output pin.
    pub fn pins(&self) -> impl Iterator<Item = &'static str> {
        self.inputs.iter().copied().chain(std::iter::once(self.output))
    }

    /// Builds the assignments for a gate whose pins are already canonical.
    /// Input operands are signals or tied-off constants.
    ///
    /// # Panics
    ///
    /// Panics if `inputs.len()` differs from the cell's input count; the
    /// scanner only builds gate instances with complete pin sets.
    pub fn translate(&self, inputs: &[Expr], output: &Signal) -> Translation {
        assert_eq!(inputs.len(), self.inputs.len(), "pin count for {}", self.keyword);
        let expr = match self.operator {
            Operator::Not => Expr::not(inputs[0].clone()),
            Operator::Binary(op) => Expr::binary(op, inputs[0].clone(), inputs[1].clone()),
        };
        match self.form {
            Form::Direct => Translation {
                assignments: vec![Assignment::new(output.clone(), expr)],
                auxiliary: None,
            },
            Form::Negated => {
                let aux = output.auxiliary();
                Translation {
                    assignments: vec![
                        Assignment::new(aux.clone(), expr),
                        Assignment::new(output.clone(), Expr::not(aux.clone().into())),
                    ],
                    auxiliary: Some(aux),
                }
            }
        }
    }
}
