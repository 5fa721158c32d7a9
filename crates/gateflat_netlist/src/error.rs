//! Fatal flattening failures.
//!
//! Every failure names the offending line. The caller gets the error back and
//! no output is produced; there is no partial result to salvage.

use gateflat_diagnostics::{Category, Diagnostic, DiagnosticCode, Label};
use gateflat_source::{SourceLine, Span};

/// Code for [`FlattenError::MalformedStatement`].
pub const MALFORMED_STATEMENT: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
/// Code for [`FlattenError::UnresolvedReference`].
pub const UNRESOLVED_REFERENCE: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);
/// Code for [`FlattenError::NameCollision`].
pub const NAME_COLLISION: DiagnosticCode = DiagnosticCode::new(Category::Error, 103);
/// Code for [`FlattenError::UnexpectedEof`].
pub const UNEXPECTED_EOF: DiagnosticCode = DiagnosticCode::new(Category::Error, 104);

/// An owned copy of the line an error points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRef {
    /// 1-based line number; 0 for an empty file.
    pub number: u32,
    /// The raw line text.
    pub text: String,
    /// Span of the line, or of the whole gate block for block-level errors.
    pub span: Span,
}

impl LineRef {
    /// Location used when the input has no lines at all.
    pub fn start_of_empty_file() -> Self {
        Self {
            number: 0,
            text: String::new(),
            span: Span::DUMMY,
        }
    }
}

impl From<SourceLine<'_>> for LineRef {
    fn from(line: SourceLine<'_>) -> Self {
        Self {
            number: line.number,
            text: line.text.to_string(),
            span: line.span,
        }
    }
}

/// Why flattening stopped.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// A gate block never terminated, or is missing, repeats, or invents pins.
    #[error("line {}: malformed statement: {reason}", .at.number)]
    MalformedStatement {
        /// Where the statement starts.
        at: LineRef,
        /// What is wrong with it.
        reason: String,
    },

    /// A bus reference is out of range or names an unknown bus.
    #[error("line {}: unresolved reference `{reference}`: {reason}", .at.number)]
    UnresolvedReference {
        /// The line holding the reference.
        at: LineRef,
        /// The reference as written.
        reference: String,
        /// Why it cannot be resolved.
        reason: String,
    },

    /// An auxiliary wire name is already taken, or a later name takes one.
    #[error("line {}: `{name}` clashes with an existing {existing}", .at.number)]
    NameCollision {
        /// The line that introduced the clash.
        at: LineRef,
        /// The contested name.
        name: String,
        /// What else uses it.
        existing: String,
    },

    /// Input ended before the module was complete.
    #[error("unexpected end of input: {expected}")]
    UnexpectedEof {
        /// The last line read.
        at: LineRef,
        /// What was still expected.
        expected: String,
    },
}

impl FlattenError {
    /// The line the error points at.
    pub fn location(&self) -> &LineRef {
        match self {
            FlattenError::MalformedStatement { at, .. }
            | FlattenError::UnresolvedReference { at, .. }
            | FlattenError::NameCollision { at, .. }
            | FlattenError::UnexpectedEof { at, .. } => at,
        }
    }

    /// The diagnostic code for this kind of failure.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            FlattenError::MalformedStatement { .. } => MALFORMED_STATEMENT,
            FlattenError::UnresolvedReference { .. } => UNRESOLVED_REFERENCE,
            FlattenError::NameCollision { .. } => NAME_COLLISION,
            FlattenError::UnexpectedEof { .. } => UNEXPECTED_EOF,
        }
    }

    /// Converts into a renderable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let at = self.location();
        let (message, label) = match self {
            FlattenError::MalformedStatement { reason, .. } => {
                ("malformed gate instance".to_string(), reason.clone())
            }
            FlattenError::UnresolvedReference {
                reference, reason, ..
            } => (format!("unresolved reference `{reference}`"), reason.clone()),
            FlattenError::NameCollision { name, existing, .. } => (
                format!("name collision on `{name}`"),
                format!("already in use as {existing}"),
            ),
            FlattenError::UnexpectedEof { expected, .. } => {
                ("unexpected end of input".to_string(), expected.clone())
            }
        };
        let mut diag = Diagnostic::error(self.code(), message, at.span);
        if at.span.is_dummy() {
            diag = diag.with_note(label);
        } else {
            diag = diag.with_label(Label::primary(at.span, label));
        }
        if at.number > 0 {
            diag = diag.with_note(format!("line {}: {}", at.number, at.text.trim()));
        }
        diag
    }
}
