//! Line-driven scanner for the restricted structural dialect.
//!
//! One forward pass over the source lines drives a small state machine:
//!
//! ```text
//! SeekingModule --module <name>--> InModule --<CELL> <inst> (--> InGateBlock
//!                                     ^                              |
//!                                     +------------ ");" ------------+
//! InModule --input/output/wire without `;`--> InDeclaration --`;`--> InModule
//! InModule --endmodule--> Done
//! ```
//!
//! Declarations feed the namespace as they are seen, and every completed
//! gate block is lowered to assignments straight away, so when `endmodule`
//! arrives everything the module emitter needs is already collected.

use crate::catalog;
use crate::error::{FlattenError, LineRef};
use crate::expr::Assignment;
use crate::gate::{extract_pins, GateInstance};
use crate::lower::{collision, lower_gate};
use crate::namespace::NamespaceState;
use crate::naming::{BusRole, SignalNamer};
use crate::signal::Signal;
use crate::stats::FlatStats;
use gateflat_config::FlattenConfig;
use gateflat_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label};
use gateflat_source::{SourceFile, SourceLine};

/// A port bus declared with a width other than the configured one.
pub const BUS_WIDTH_MISMATCH: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);
/// A bus-shaped wire declaration for a name that is not a port bus.
pub const BUS_WIRE_SUPPRESSED: DiagnosticCode = DiagnosticCode::new(Category::Warning, 202);
/// An instance of a cell type outside the catalog.
pub const UNSUPPORTED_CELL: DiagnosticCode = DiagnosticCode::new(Category::Info, 301);
/// A line inside the module that matches none of the supported forms.
pub const SKIPPED_LINE: DiagnosticCode = DiagnosticCode::new(Category::Info, 302);

/// Words that can open a line but never name a cell type.
const RESERVED: &[&str] = &[
    "always",
    "assign",
    "endmodule",
    "function",
    "generate",
    "genvar",
    "initial",
    "inout",
    "input",
    "integer",
    "localparam",
    "module",
    "output",
    "parameter",
    "reg",
    "specify",
    "supply0",
    "supply1",
    "task",
    "tri",
    "wire",
];

/// Everything collected by a complete scan.
pub(crate) struct ScanOutcome {
    pub namespace: NamespaceState,
    pub assignments: Vec<Assignment>,
    pub stats: FlatStats,
}

/// Buffered lines of one gate instantiation.
struct GateBlock {
    keyword: String,
    instance: String,
    lines: Vec<(String, LineRef)>,
}

impl GateBlock {
    /// The opening line, spanning to the last buffered line.
    fn location(&self) -> LineRef {
        let mut at = self.lines[0].1.clone();
        if let Some((_, last)) = self.lines.last() {
            if !at.span.is_dummy() && !last.span.is_dummy() {
                at.span = at.span.merge(last.span);
            }
        }
        at
    }
}

#[derive(Clone, Copy)]
enum DeclKind {
    Port(BusRole),
    Wire,
}

/// A declaration whose `;` has not been seen yet. `text` holds everything
/// after the keyword, continuation lines joined with a space.
struct DeclBlock {
    kind: DeclKind,
    text: String,
    at: LineRef,
}

impl DeclBlock {
    fn extend(&mut self, code: &str, line: SourceLine<'_>) {
        self.text.push(' ');
        self.text.push_str(code);
        if !self.at.span.is_dummy() && !line.span.is_dummy() {
            self.at.span = self.at.span.merge(line.span);
        }
    }
}

enum ScanState {
    SeekingModule,
    /// `header_open` while the port list of the module line is unfinished.
    InModule {
        header_open: bool,
    },
    InDeclaration(DeclBlock),
    InGateBlock(GateBlock),
    Done,
}

struct Scanner<'a> {
    config: &'a FlattenConfig,
    namer: SignalNamer<'a>,
    sink: &'a DiagnosticSink,
    namespace: NamespaceState,
    assignments: Vec<Assignment>,
    stats: FlatStats,
}

/// Scans `file` for the configured module.
pub(crate) fn scan(
    file: &SourceFile,
    config: &FlattenConfig,
    sink: &DiagnosticSink,
) -> Result<ScanOutcome, FlattenError> {
    let namer = SignalNamer::new(config);
    let mut scanner = Scanner {
        config,
        namer,
        sink,
        namespace: NamespaceState::new(namer.port_signals()),
        assignments: Vec::new(),
        stats: FlatStats::default(),
    };

    let mut state = ScanState::SeekingModule;
    let mut last_line = None;
    for line in file.lines() {
        state = scanner.step(state, line)?;
        last_line = Some(line);
        if matches!(state, ScanState::Done) {
            break;
        }
    }

    let last = || last_line.map_or_else(LineRef::start_of_empty_file, LineRef::from);
    match state {
        ScanState::Done => Ok(ScanOutcome {
            namespace: scanner.namespace,
            assignments: scanner.assignments,
            stats: scanner.stats,
        }),
        ScanState::InGateBlock(block) => Err(FlattenError::MalformedStatement {
            reason: format!(
                "`{}` instance `{}` is never terminated with `);`",
                block.keyword, block.instance
            ),
            at: block.location(),
        }),
        ScanState::InDeclaration(block) => Err(FlattenError::MalformedStatement {
            reason: "declaration is never terminated with `;`".to_string(),
            at: block.at,
        }),
        ScanState::SeekingModule => Err(FlattenError::UnexpectedEof {
            at: last(),
            expected: format!("module `{}` was not found", config.module),
        }),
        ScanState::InModule { .. } => Err(FlattenError::UnexpectedEof {
            at: last(),
            expected: format!("module `{}` is missing `endmodule`", config.module),
        }),
    }
}

impl Scanner<'_> {
    fn step(&mut self, state: ScanState, line: SourceLine<'_>) -> Result<ScanState, FlattenError> {
        let code = strip_comment(line.text).trim();
        match state {
            ScanState::SeekingModule => {
                if module_header_name(code) == Some(self.config.module.as_str()) {
                    log::debug!("line {}: entering module `{}`", line.number, self.config.module);
                    Ok(ScanState::InModule {
                        header_open: !code.contains(';'),
                    })
                } else {
                    Ok(ScanState::SeekingModule)
                }
            }
            ScanState::InModule { header_open: true } => Ok(ScanState::InModule {
                header_open: !code.contains(';'),
            }),
            ScanState::InModule { header_open: false } => self.module_line(code, line),
            ScanState::InDeclaration(mut block) => {
                if first_word(code) == "endmodule" {
                    return Err(FlattenError::MalformedStatement {
                        reason: "declaration is not terminated before `endmodule`".to_string(),
                        at: block.at,
                    });
                }
                block.extend(code, line);
                if code.contains(';') {
                    self.finish_declaration(block)?;
                    Ok(ScanState::InModule { header_open: false })
                } else {
                    Ok(ScanState::InDeclaration(block))
                }
            }
            ScanState::InGateBlock(mut block) => {
                if first_word(code) == "endmodule" {
                    return Err(FlattenError::MalformedStatement {
                        reason: format!(
                            "`{}` instance `{}` is not terminated before `endmodule`",
                            block.keyword, block.instance
                        ),
                        at: block.location(),
                    });
                }
                block.lines.push((code.to_string(), line.into()));
                if terminates_statement(code) {
                    self.finish_gate(block)?;
                    Ok(ScanState::InModule { header_open: false })
                } else {
                    Ok(ScanState::InGateBlock(block))
                }
            }
            ScanState::Done => Ok(ScanState::Done),
        }
    }

    /// Classifies one line of the module body.
    fn module_line(&mut self, code: &str, line: SourceLine<'_>) -> Result<ScanState, FlattenError> {
        let in_module = Ok(ScanState::InModule { header_open: false });
        if code.is_empty() || is_attribute(code) {
            return in_module;
        }
        match first_word(code) {
            "endmodule" => {
                log::debug!("line {}: end of module `{}`", line.number, self.config.module);
                Ok(ScanState::Done)
            }
            "input" => self.declaration(DeclKind::Port(BusRole::Input), code, line),
            "output" => self.declaration(DeclKind::Port(BusRole::Output), code, line),
            "wire" => self.declaration(DeclKind::Wire, code, line),
            _ => {
                if let Some((keyword, instance)) = gate_header(code) {
                    let block = GateBlock {
                        keyword: keyword.to_string(),
                        instance: instance.to_string(),
                        lines: vec![(code.to_string(), line.into())],
                    };
                    if terminates_statement(code) {
                        self.finish_gate(block)?;
                        return in_module;
                    }
                    log::debug!("line {}: opening `{keyword}` block", line.number);
                    return Ok(ScanState::InGateBlock(block));
                }
                self.skip_line(&LineRef::from(line));
                in_module
            }
        }
    }

    /// Opens a declaration, finishing it at once when its `;` is on this line.
    fn declaration(
        &mut self,
        kind: DeclKind,
        code: &str,
        line: SourceLine<'_>,
    ) -> Result<ScanState, FlattenError> {
        let keyword = first_word(code);
        let block = DeclBlock {
            kind,
            text: code[keyword.len()..].to_string(),
            at: line.into(),
        };
        if code.contains(';') {
            self.finish_declaration(block)?;
            return Ok(ScanState::InModule { header_open: false });
        }
        log::debug!("line {}: `{keyword}` declaration continues", line.number);
        Ok(ScanState::InDeclaration(block))
    }

    fn finish_declaration(&mut self, block: DeclBlock) -> Result<(), FlattenError> {
        match block.kind {
            DeclKind::Port(role) => self.port_declaration(role, &block.text, &block.at),
            DeclKind::Wire => self.wire_declaration(&block.text, &block.at)?,
        }
        Ok(())
    }

    fn port_declaration(&mut self, role: BusRole, rest: &str, line: &LineRef) {
        let Some(decl) = parse_declaration(rest) else {
            self.skip_line(line);
            return;
        };
        let mut foreign = false;
        for name in &decl.names {
            if self.namer.bus_role(name) != Some(role) {
                foreign = true;
                continue;
            }
            let declared = decl.range.map(|(msb, lsb)| msb.abs_diff(lsb) + 1);
            if declared != Some(self.config.width) {
                let found = declared.map_or_else(|| "scalar".to_string(), |w| format!("{w}-bit"));
                self.sink.emit(
                    Diagnostic::warning(
                        BUS_WIDTH_MISMATCH,
                        format!("port bus `{name}` is declared {found}"),
                        line.span,
                    )
                    .with_label(Label::primary(
                        line.span,
                        format!("configured width is {}", self.config.width),
                    ))
                    .with_note("ports are emitted with the configured width"),
                );
            }
        }
        if foreign {
            self.skip_line(line);
        }
    }

    fn wire_declaration(&mut self, rest: &str, line: &LineRef) -> Result<(), FlattenError> {
        let Some(decl) = parse_declaration(rest) else {
            self.skip_line(line);
            return Ok(());
        };
        if decl.range.is_some() {
            for name in &decl.names {
                if self.namer.bus_role(name).is_some() {
                    log::debug!("line {}: dropping bus wire `{name}`", line.number);
                } else {
                    self.sink.emit(Diagnostic::warning(
                        BUS_WIRE_SUPPRESSED,
                        format!("bus wire `{name}` is not a port bus and is not flattened"),
                        line.span,
                    ));
                }
            }
            return Ok(());
        }
        for name in decl.names {
            self.namespace
                .declare(Signal::new(name))
                .map_err(|clash| collision(line, clash))?;
        }
        Ok(())
    }

    fn finish_gate(&mut self, block: GateBlock) -> Result<(), FlattenError> {
        let Some(spec) = catalog::lookup(&block.keyword) else {
            log::info!(
                "skipping unsupported `{}` instance `{}`",
                block.keyword,
                block.instance
            );
            let at = block.location();
            self.sink.emit(Diagnostic::note(
                UNSUPPORTED_CELL,
                format!(
                    "skipped unsupported `{}` instance `{}`",
                    block.keyword, block.instance
                ),
                at.span,
            ));
            *self.stats.skipped_cells.entry(block.keyword).or_default() += 1;
            return Ok(());
        };

        let pins = extract_pins(&block.lines)?;
        let at = block.location();
        let gate = GateInstance::new(spec, block.instance, pins, at)?;
        let assignments = lower_gate(&gate, &self.namer, &mut self.namespace)?;
        *self.stats.translated.entry(block.keyword).or_default() += 1;
        self.assignments.extend(assignments);
        Ok(())
    }

    fn skip_line(&mut self, line: &LineRef) {
        self.stats.skipped_lines += 1;
        self.sink.emit(Diagnostic::note(
            SKIPPED_LINE,
            "line is not part of the supported netlist dialect and was skipped",
            line.span,
        ));
    }
}

/// Text before any `//` comment.
fn strip_comment(text: &str) -> &str {
    text.find("//").map_or(text, |i| &text[..i])
}

/// A leading identifier: `\escaped` up to whitespace, or a plain word.
fn identifier(code: &str) -> &str {
    if code.starts_with('\\') {
        let escaped = code.split(char::is_whitespace).next().unwrap_or(code);
        if escaped.len() > 1 {
            return escaped;
        }
        return "";
    }
    first_word(code)
}

fn first_word(code: &str) -> &str {
    let end = code
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(code.len());
    &code[..end]
}

fn is_attribute(code: &str) -> bool {
    code.starts_with("(*") && code.ends_with("*)")
}

/// `);` at the end of the line, whitespace allowed before the `;`.
fn terminates_statement(code: &str) -> bool {
    code.strip_suffix(';')
        .is_some_and(|head| head.trim_end().ends_with(')'))
}

/// Name of the module opened by `module <name>`, if this is such a line.
fn module_header_name(code: &str) -> Option<&str> {
    let rest = code.strip_prefix("module")?;
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let rest = rest.trim_start();
    let name = first_word(rest);
    let after = rest[name.len()..].trim_start();
    let opens_ports = after.is_empty() || after.starts_with(['(', ';', '#']);
    if name.is_empty() || !opens_ports {
        return None;
    }
    Some(name)
}

/// `<CELL> <instance> (` at the start of a line.
fn gate_header(code: &str) -> Option<(&str, &str)> {
    let keyword = identifier(code);
    if keyword.is_empty()
        || !keyword
            .starts_with(|c: char| c.is_ascii_alphabetic() || matches!(c, '_' | '$' | '\\'))
        || RESERVED.contains(&keyword)
    {
        return None;
    }
    let rest = &code[keyword.len()..];
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let rest = rest.trim_start();
    let instance = identifier(rest);
    if instance.is_empty() {
        return None;
    }
    let after = rest[instance.len()..].trim_start();
    if after.is_empty() || after.starts_with('(') {
        Some((keyword, instance))
    } else {
        None
    }
}

/// A declaration after its keyword: optional `wire`/`reg` kind, optional
/// `[msb:lsb]` range and a comma-separated name list.
struct Declaration<'a> {
    range: Option<(u32, u32)>,
    names: Vec<&'a str>,
}

fn parse_declaration(rest: &str) -> Option<Declaration<'_>> {
    let mut rest = rest.trim().strip_suffix(';').unwrap_or(rest.trim()).trim();
    for kind in ["wire", "reg"] {
        if let Some(after) = rest.strip_prefix(kind) {
            if after.starts_with(|c: char| c.is_whitespace() || c == '[') {
                rest = after.trim_start();
            }
        }
    }
    let mut range = None;
    if let Some(after_open) = rest.strip_prefix('[') {
        let close = after_open.find(']')?;
        let (msb, lsb) = after_open[..close].split_once(':')?;
        range = Some((msb.trim().parse().ok()?, lsb.trim().parse().ok()?));
        rest = after_open[close + 1..].trim_start();
    }
    let names: Vec<&str> = rest
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    let is_name = |n: &&str| {
        n.starts_with('\\') || (first_word(n) == *n && !n.starts_with(|c: char| c.is_ascii_digit()))
    };
    if names.is_empty() || !names.iter().all(is_name) {
        return None;
    }
    Some(Declaration { range, names })
}
