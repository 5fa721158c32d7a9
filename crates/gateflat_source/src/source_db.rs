//! Owner of the netlist files loaded during a run.

use crate::file_id::FileId;
use crate::resolved_span::ResolvedSpan;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::io;
use std::path::{Path, PathBuf};

/// Holds every [`SourceFile`] of a run and resolves spans for diagnostics.
///
/// A batch run gives each worker its own `SourceDb`; nothing here is shared
/// between files.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Reads a whole file from disk and registers it.
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path.to_path_buf(), content))
    }

    /// Registers in-memory text under a display name.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the file for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Resolves a span to line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (start_line, start_col) = file.line_col(span.start);
        let (end_line, end_col) = file.line_col(span.end.saturating_sub(1).max(span.start));
        ResolvedSpan {
            file_path: file.path.clone(),
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Returns the text under `span`.
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file).snippet(span.start, span.end)
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}
