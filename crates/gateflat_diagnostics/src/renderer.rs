//! Terminal rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use crate::severity::Severity;
use gateflat_source::SourceDb;

/// Formats a diagnostic for some output target.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// rustc-style rendering:
///
/// ```text
/// error[E102]: unresolved reference `in_array[16]`
///   --> sort.v:14:7
///    |
/// 14 |     .A(in_array[16]),
///    | ^^^^^^^^^^^^^^^^^^^^^ index 16 is outside in_array[0..16]
///    = note: ...
/// ```
///
/// Spans covering several lines (a whole gate block) show their first line.
pub struct TerminalRenderer {
    /// Emit ANSI colors for the severity header.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let tag = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return tag;
        }
        let ansi = match diag.severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Note => "\x1b[1;36m",
        };
        format!("{ansi}{tag}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);

        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            out.push_str(&format!("  --> {resolved}\n"));

            let file = source_db.get_file(diag.primary_span.file);
            let (line, col) = file.line_col(diag.primary_span.start);
            let line_num = line.to_string();
            let padding = " ".repeat(line_num.len());
            let line_content = get_source_line(&file.content, diag.primary_span.start);

            out.push_str(&format!("{padding} |\n"));
            out.push_str(&format!("{line_num} | {line_content}\n"));

            // Underline up to the end of the first line only.
            let remaining = line_content.len().saturating_sub(col as usize - 1);
            let span_len = (diag.primary_span.len() as usize).min(remaining).max(1);
            let carets = "^".repeat(span_len);
            let col_padding = " ".repeat((col as usize).saturating_sub(1));
            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            out.push_str(&format!("{padding} | {col_padding}{carets}{primary_msg}\n"));

            for label in diag
                .labels
                .iter()
                .filter(|l| l.style == LabelStyle::Secondary && !l.span.is_dummy())
            {
                let at = source_db.resolve_span(label.span);
                out.push_str(&format!("{padding} = {}: {at}\n", label.message));
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

fn get_source_line(content: &str, byte_offset: u32) -> &str {
    let offset = byte_offset as usize;
    let start = content[..offset].rfind('\n').map_or(0, |pos| pos + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |pos| offset + pos);
    content[start..end].trim_end_matches('\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;
    use gateflat_source::Span;

    #[test]
    fn render_error_with_span() {
        let mut db = SourceDb::new();
        let id = db.add_source(
            "sort.v",
            "AND _1_ (\n  .A(in_array[16]),\n".to_string(),
        );
        let line = db.get_file(id).line(2).unwrap();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 102),
            "unresolved reference `in_array[16]`",
            line.span,
        )
        .with_label(Label::primary(line.span, "index out of range"));

        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.contains("error[E102]: unresolved reference `in_array[16]`"));
        assert!(out.contains("--> sort.v:2:1"));
        assert!(out.contains("2 |   .A(in_array[16]),"));
        assert!(out.contains("^ index out of range"));
    }

    #[test]
    fn multi_line_span_underlines_first_line() {
        let mut db = SourceDb::new();
        let id = db.add_source("g.v", "XOR _2_ (\n  .A(a),\n".to_string());
        let file = db.get_file(id);
        let span = file.line(1).unwrap().span.merge(file.line(2).unwrap().span);
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 101), "m", span);
        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.contains("1 | XOR _2_ ("));
        assert!(out.contains(" | ^^^^^^^^^\n"));
    }

    #[test]
    fn render_note_without_span() {
        let db = SourceDb::new();
        let diag = Diagnostic::note(
            DiagnosticCode::new(Category::Info, 301),
            "skipped 3 unsupported cells",
            Span::DUMMY,
        )
        .with_note("DFF is not a combinational primitive");
        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.contains("note[I301]: skipped 3 unsupported cells"));
        assert!(out.contains("= note: DFF is not a combinational primitive"));
        assert!(!out.contains("-->"));
    }

    #[test]
    fn color_wraps_header() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 104),
            "eof",
            Span::DUMMY,
        );
        let out = TerminalRenderer::new(true).render(&diag, &db);
        assert!(out.starts_with("\x1b[1;31merror[E104]\x1b[0m: eof"));
    }
}
