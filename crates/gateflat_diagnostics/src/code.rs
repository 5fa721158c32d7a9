//! Diagnostic codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a code, which fixes its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Failures that abort the run, prefixed with `E`.
    Error,
    /// Suspicious input that is still processed, prefixed with `W`.
    Warning,
    /// Deliberate skips and other notes, prefixed with `I`.
    Info,
}

impl Category {
    /// Returns the prefix letter.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Info => 'I',
        }
    }
}

/// A category plus number, displayed as e.g. `E101` or `I301`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category.
    pub category: Category,
    /// Number within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
