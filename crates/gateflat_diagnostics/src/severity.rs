//! Severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is, ordered from least to most severe.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Informational; the run is unaffected.
    Note,
    /// Worth a look, but output is still produced.
    Warning,
    /// The run failed and no output was written.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
