//! Structured findings produced while flattening a netlist.
//!
//! Fatal failures and informational skips both become [`Diagnostic`]s with a
//! stable [`DiagnosticCode`]. A [`DiagnosticSink`] collects them during a run
//! and a [`DiagnosticRenderer`] turns them into terminal text.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
