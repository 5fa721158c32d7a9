//! Conformance test helpers for gateflat.
//!
//! Runs netlist text through the flattener and gives integration tests a way
//! to build synthesized-style netlists and to evaluate the flattened output.

#![warn(missing_docs)]

use std::collections::BTreeMap;

use gateflat_config::FlattenConfig;
use gateflat_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use gateflat_netlist::{CellKind, FlattenError, FlattenOutput};
use gateflat_source::SourceDb;

/// Result of flattening one netlist.
pub struct FlattenRun {
    /// The flattened module or the reason it failed.
    pub result: Result<FlattenOutput, FlattenError>,
    /// Notes and warnings emitted while flattening.
    pub diagnostics: Vec<Diagnostic>,
    /// Rendered text of every diagnostic, the failure included.
    pub rendered: Vec<String>,
}

impl FlattenRun {
    /// The flattened text.
    ///
    /// # Panics
    ///
    /// Panics if flattening failed.
    pub fn text(&self) -> &str {
        match &self.result {
            Ok(output) => &output.text,
            Err(e) => panic!("flattening failed: {e}"),
        }
    }

    /// The failure.
    ///
    /// # Panics
    ///
    /// Panics if flattening succeeded.
    pub fn error(&self) -> &FlattenError {
        match &self.result {
            Ok(_) => panic!("flattening unexpectedly succeeded"),
            Err(e) => e,
        }
    }

    /// Number of sink diagnostics of `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Creates a configuration from `gateflat.toml` text for `module` with the
/// default bus names and the given width.
pub fn make_config(module: &str, width: u32) -> FlattenConfig {
    let toml_str = format!(
        r#"
[module]
name = "{module}"

[bus]
width = {width}
"#
    );
    let file = gateflat_config::load_config_from_str(&toml_str).unwrap();
    gateflat_config::resolve_config(Some(&file), &Default::default()).unwrap()
}

/// Flattens `source` with `config`.
pub fn flatten_str(source: &str, config: &FlattenConfig) -> FlattenRun {
    let mut db = SourceDb::new();
    let id = db.add_source(format!("{}.v", config.module), source.to_string());
    let sink = DiagnosticSink::new();
    let result = gateflat_netlist::flatten(db.get_file(id), config, &sink);
    let diagnostics = sink.take_all();

    let renderer = TerminalRenderer::new(false);
    let mut rendered: Vec<String> = diagnostics
        .iter()
        .map(|d| renderer.render(d, &db))
        .collect();
    if let Err(ref e) = result {
        rendered.push(renderer.render(&e.to_diagnostic(), &db));
    }

    FlattenRun {
        result,
        diagnostics,
        rendered,
    }
}

/// Flattens `source` for module `module` at `width` bits.
pub fn flatten_module(source: &str, module: &str, width: u32) -> FlattenRun {
    flatten_str(source, &make_config(module, width))
}

/// One gate of a generated netlist: cell keyword, input nets and output net.
#[derive(Clone, Debug)]
pub struct GateSpec {
    /// Cell keyword, such as `AND`.
    pub cell: &'static str,
    /// Input nets in pin order (`A`, then `B`).
    pub inputs: Vec<String>,
    /// Output net (`Z`).
    pub output: String,
}

impl GateSpec {
    /// Shorthand constructor.
    pub fn new(cell: &'static str, inputs: &[&str], output: &str) -> Self {
        Self {
            cell,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
        }
    }
}

/// Writes a yosys-style netlist for `gates`: bus ports, one scalar `wire`
/// line per internal net, attribute lines and multi-line instances.
pub fn build_netlist(module: &str, width: u32, gates: &[GateSpec]) -> String {
    let msb = width - 1;
    let mut out = String::new();
    out.push_str("/* Generated by Yosys */\n\n");
    out.push_str(&format!("module {module}(in_array, out_array);\n"));
    let mut internal: Vec<&str> = gates
        .iter()
        .map(|g| g.output.as_str())
        .filter(|n| !n.contains('['))
        .collect();
    internal.sort_unstable();
    internal.dedup();
    for net in internal {
        out.push_str(&format!("  wire {net};\n"));
    }
    out.push_str(&format!("  input [{msb}:0] in_array;\n"));
    out.push_str(&format!("  wire [{msb}:0] in_array;\n"));
    out.push_str(&format!("  output [{msb}:0] out_array;\n"));
    out.push_str(&format!("  wire [{msb}:0] out_array;\n"));
    for (i, gate) in gates.iter().enumerate() {
        out.push_str(&format!("  (* src = \"gen.v:{}.5-{}.20\" *)\n", i + 1, i + 1));
        out.push_str(&format!("  {} _{i}_ (\n", gate.cell));
        let pins = ["A", "B"];
        for (pin, net) in pins.iter().zip(&gate.inputs) {
            out.push_str(&format!("    .{pin}({net}),\n"));
        }
        out.push_str(&format!("    .Z({})\n", gate.output));
        out.push_str("  );\n");
    }
    out.push_str("endmodule\n");
    out
}

/// Evaluates `gates` in order over a netlist-name environment (bus members
/// written `in_array[i]`). Unset nets read as `false`.
pub fn reference_eval(gates: &[GateSpec], inputs: &BTreeMap<String, bool>) -> BTreeMap<String, bool> {
    let mut env = inputs.clone();
    for gate in gates {
        let kind = match gate.cell {
            "IV" | "INV" => CellKind::Inv,
            "AND" => CellKind::And,
            "OR" => CellKind::Or,
            "XOR" => CellKind::Xor,
            "XNOR" => CellKind::Xnor,
            "NOR" => CellKind::Nor,
            other => panic!("no reference model for {other}"),
        };
        let values: Vec<bool> = gate
            .inputs
            .iter()
            .map(|n| env.get(n).copied().unwrap_or(false))
            .collect();
        env.insert(gate.output.clone(), kind.reference(&values));
    }
    env
}

/// A flattened module read back from text.
#[derive(Debug, Default)]
pub struct FlatModule {
    /// Names on the `input` line.
    pub inputs: Vec<String>,
    /// Names on the `output` line.
    pub outputs: Vec<String>,
    /// Names on the `wire` line.
    pub wires: Vec<String>,
    /// `(target, expression)` in emitted order.
    pub assigns: Vec<(String, String)>,
}

impl FlatModule {
    /// Reads the line layout the flattener emits.
    pub fn parse(text: &str) -> Self {
        let mut module = FlatModule::default();
        for line in text.lines() {
            let body = |kw: &str| {
                line.strip_prefix(kw)
                    .and_then(|r| r.strip_suffix(';'))
                    .map(split_names)
            };
            if let Some(names) = body("input ") {
                module.inputs = names;
            } else if let Some(names) = body("output ") {
                module.outputs = names;
            } else if let Some(names) = body("wire ") {
                module.wires = names;
            } else if let Some(rest) = line.strip_prefix("assign ") {
                let rest = rest.strip_suffix(';').unwrap();
                let (target, expr) = rest.split_once(" = ").unwrap();
                module.assigns.push((target.trim().to_string(), expr.to_string()));
            }
        }
        module
    }

    /// Runs the assignments in order over `inputs` (scalar names).
    pub fn eval(&self, inputs: &BTreeMap<String, bool>) -> BTreeMap<String, bool> {
        let mut env = inputs.clone();
        for (target, expr) in &self.assigns {
            let value = ExprReader::new(expr).read(&env);
            env.insert(target.clone(), value);
        }
        env
    }
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',').map(|s| s.trim().to_string()).collect()
}

/// Reads back emitted expressions: `~x`, `x & y`, `x | y`, `x ^ y`, with
/// parenthesized operands and `1'b0`/`1'b1` literals.
struct ExprReader<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> ExprReader<'a> {
    fn new(text: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut start = None;
        for (i, c) in text.char_indices() {
            let is_name = c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '\\' | '.' | '\'');
            match (is_name, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    tokens.push(&text[s..i]);
                    start = None;
                }
                _ => {}
            }
            if !is_name && !c.is_whitespace() {
                tokens.push(&text[i..i + c.len_utf8()]);
            }
        }
        if let Some(s) = start {
            tokens.push(&text[s..]);
        }
        Self { tokens, pos: 0 }
    }

    fn read(mut self, env: &BTreeMap<String, bool>) -> bool {
        let value = self.binary(env);
        assert_eq!(self.pos, self.tokens.len(), "trailing tokens in {:?}", self.tokens);
        value
    }

    fn binary(&mut self, env: &BTreeMap<String, bool>) -> bool {
        let mut value = self.unary(env);
        while let Some(&op) = self.tokens.get(self.pos) {
            if !matches!(op, "&" | "|" | "^") {
                break;
            }
            self.pos += 1;
            let rhs = self.unary(env);
            value = match op {
                "&" => value & rhs,
                "|" => value | rhs,
                _ => value ^ rhs,
            };
        }
        value
    }

    fn unary(&mut self, env: &BTreeMap<String, bool>) -> bool {
        let token = self.tokens[self.pos];
        self.pos += 1;
        match token {
            "~" => !self.unary(env),
            "(" => {
                let value = self.binary(env);
                assert_eq!(self.tokens[self.pos], ")");
                self.pos += 1;
                value
            }
            "1'b0" => false,
            "1'b1" => true,
            name => *env
                .get(name)
                .unwrap_or_else(|| panic!("`{name}` read before assignment")),
        }
    }
}

/// All `2^n` assignments of `n` input bits, bit `i` of the counter driving
/// input `i`.
pub fn all_patterns(n: u32) -> impl Iterator<Item = Vec<bool>> {
    (0u64..1 << n).map(move |bits| (0..n).map(|i| bits >> i & 1 == 1).collect())
}
