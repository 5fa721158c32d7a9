//! Span annotations attached to a diagnostic.

use gateflat_source::Span;
use serde::{Deserialize, Serialize};

/// Whether a label marks the main location or extra context.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The offending location.
    Primary,
    /// Related context, such as the line that opened a gate block.
    Secondary,
}

/// A message pinned to a span.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The annotated span.
    pub span: Span,
    /// Text shown next to the underline.
    pub message: String,
    /// Primary or secondary.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles() {
        assert_eq!(Label::primary(Span::DUMMY, "here").style, LabelStyle::Primary);
        assert_eq!(
            Label::secondary(Span::DUMMY, "opened here").style,
            LabelStyle::Secondary
        );
    }
}
