//! The diagnostic record.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use gateflat_source::Span;
use serde::{Deserialize, Serialize};

/// A finding about the input netlist, tied to a source location.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Stable code.
    pub code: DiagnosticCode,
    /// One-line summary.
    pub message: String,
    /// Where the problem was found.
    pub primary_span: Span,
    /// Extra annotated spans.
    pub labels: Vec<Label>,
    /// `note:` footers.
    pub notes: Vec<String>,
    /// `help:` footers.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates an error.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// Creates a warning.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    /// Creates an informational note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Note, code, message, span)
    }

    /// Adds a label.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note footer.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help footer.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}
