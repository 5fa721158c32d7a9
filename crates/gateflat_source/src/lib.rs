//! Netlist source text, line-oriented spans, and the per-run source database.
//!
//! The flattening pipeline is line-driven, so every [`SourceFile`] keeps a
//! table of line starts and hands out [`SourceLine`] records carrying the
//! 1-based line number, the raw text and the byte [`Span`] of each line.
//! [`SourceDb`] owns the files of a run and turns spans back into
//! `path:line:col` locations for diagnostics.

#![warn(missing_docs)]

pub mod file_id;
pub mod resolved_span;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use resolved_span::ResolvedSpan;
pub use source_db::SourceDb;
pub use source_file::{SourceFile, SourceLine};
pub use span::Span;
