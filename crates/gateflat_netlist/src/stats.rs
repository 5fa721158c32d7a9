//! Per-run counters.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// What a flattening run did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FlatStats {
    /// Translated gate instances per cell keyword.
    pub translated: BTreeMap<String, usize>,
    /// Skipped instances per unsupported cell keyword.
    pub skipped_cells: BTreeMap<String, usize>,
    /// Lines inside the module that matched no supported form.
    pub skipped_lines: usize,
    /// Auxiliary wires introduced.
    pub auxiliary_wires: usize,
    /// Assignments emitted.
    pub assignments: usize,
    /// Names in the merged wire declaration.
    pub wires: usize,
}

impl FlatStats {
    /// Total translated instances.
    pub fn gates(&self) -> usize {
        self.translated.values().sum()
    }

    /// Total skipped instances.
    pub fn skipped(&self) -> usize {
        self.skipped_cells.values().sum()
    }
}

impl fmt::Display for FlatStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} gate(s) -> {} assignment(s), {} wire(s) ({} auxiliary), {} cell(s) skipped",
            self.gates(),
            self.assignments,
            self.wires,
            self.auxiliary_wires,
            self.skipped()
        )
    }
}
