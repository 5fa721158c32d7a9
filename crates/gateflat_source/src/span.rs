//! Byte ranges inside a netlist file.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` in one source file.
///
/// The scanner produces one span per physical line; a gate block spanning
/// several lines is covered by [`Span::merge`] of its first and last line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The file this span points into.
    pub file: FileId,
    /// Inclusive start offset.
    pub start: u32,
    /// Exclusive end offset.
    pub end: u32,
}

impl Span {
    /// A span that points nowhere.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a span over `start..end` in `file`.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns the smallest span covering both `self` and `other`.
    ///
    /// # Panics
    ///
    /// Panics if the spans belong to different files.
    pub fn merge(self, other: Span) -> Span {
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this span does not point into a loaded file.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}
