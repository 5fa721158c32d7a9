//! Spans resolved to printable coordinates.

use std::fmt;
use std::path::PathBuf;

/// A span expressed as 1-based line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Path of the file.
    pub file_path: PathBuf,
    /// First line.
    pub start_line: u32,
    /// First column.
    pub start_col: u32,
    /// Last line.
    pub end_line: u32,
    /// Last column.
    pub end_col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file_path.display(),
            self.start_line,
            self.start_col
        )
    }
}
