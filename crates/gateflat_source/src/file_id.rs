//! Opaque handle for a file registered in a [`SourceDb`](crate::SourceDb).

use serde::{Deserialize, Serialize};

/// Index of a netlist file inside a [`SourceDb`](crate::SourceDb).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for spans that do not point into any loaded file.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Wraps a raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}
