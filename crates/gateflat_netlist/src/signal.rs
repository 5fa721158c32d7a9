//! Scalar signals and their classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-bit signal identified by its canonical flat name.
///
/// Two signals are the same signal iff their names are equal. Ordering is
/// plain lexicographic order on the name, which is what the merged wire
/// declaration is sorted by.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Signal(String);

impl Signal {
    /// Wraps an already canonical name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The canonical name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// The auxiliary wire that carries the un-negated value of `self`.
    pub fn auxiliary(&self) -> Signal {
        match self.0.strip_prefix('\\') {
            Some(escaped) => Signal(format!("\\{escaped}_neg")),
            None => Signal(format!("{}_neg", self.0)),
        }
    }

    /// Escaped identifiers (`\foo[3]`) must be followed by whitespace.
    pub fn is_escaped(&self) -> bool {
        self.0.starts_with('\\')
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_escaped() {
            write!(f, "{} ", self.0)
        } else {
            f.write_str(&self.0)
        }
    }
}

/// The role a signal plays in the flattened module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SignalClass {
    /// Member of the input port bus.
    PortInput,
    /// Member of the output port bus.
    PortOutput,
    /// Named by a wire declaration or by a gate pin.
    DeclaredWire,
    /// Introduced while translating a negated primitive.
    AuxiliaryWire,
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalClass::PortInput => write!(f, "input port"),
            SignalClass::PortOutput => write!(f, "output port"),
            SignalClass::DeclaredWire => write!(f, "wire"),
            SignalClass::AuxiliaryWire => write!(f, "auxiliary wire"),
        }
    }
}
