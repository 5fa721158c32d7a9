//! A loaded netlist file and its line table.

use crate::file_id::FileId;
use crate::span::Span;
use std::path::PathBuf;

/// One physical line of a [`SourceFile`], without its line terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: u32,
    /// The raw line text (`\r\n` and `\n` stripped).
    pub text: &'a str,
    /// Byte span of `text` in the file.
    pub span: Span,
}

/// A netlist file held in memory for one flattening run.
pub struct SourceFile {
    /// Identifier within the owning [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// Filesystem path, or a synthetic name for in-memory input.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
    /// Offset of the first byte of every line; always starts with 0.
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Wraps `content` and indexes its line starts.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Number of lines. A trailing newline does not open an extra line.
    pub fn line_count(&self) -> u32 {
        let n = self.line_starts.len() as u32;
        if self.content.ends_with('\n') || self.content.is_empty() {
            n - 1
        } else {
            n
        }
    }

    /// Returns the 1-based `number`-th line, or `None` past the end.
    pub fn line(&self, number: u32) -> Option<SourceLine<'_>> {
        if number == 0 || number > self.line_count() {
            return None;
        }
        let idx = (number - 1) as usize;
        let start = self.line_starts[idx];
        let mut end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.content.len() as u32, |next| next - 1);
        if end > start && self.content.as_bytes()[(end - 1) as usize] == b'\r' {
            end -= 1;
        }
        Some(SourceLine {
            number,
            text: &self.content[start as usize..end as usize],
            span: Span::new(self.id, start, end),
        })
    }

    /// Iterates over all lines in order.
    pub fn lines(&self) -> impl Iterator<Item = SourceLine<'_>> + '_ {
        (1..=self.line_count()).filter_map(move |n| self.line(n))
    }

    /// Converts a byte offset into 1-based `(line, column)`.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns the text between two byte offsets.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        &self.content[start as usize..end as usize]
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}
