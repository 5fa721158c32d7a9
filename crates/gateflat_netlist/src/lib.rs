//! Gate-level netlist flattening.
//!
//! Reads one module of a synthesized structural netlist written with a small
//! cell library (`IV`, `AND`, `OR`, `XOR`, `XNOR`, `NOR`) and rewrites it as
//! continuous assignments over scalar signals. Port buses become one scalar
//! per bit (`in_array[3]` becomes `in_array_3`), negated cells introduce an
//! auxiliary `<output>_neg` wire, and every internal name lands in a single
//! merged `wire` declaration.
//!
//! Flattening is all-or-nothing: the first malformed statement, unresolved
//! reference, name collision or premature end of input aborts the run with a
//! [`FlattenError`]. Skipped constructs are reported as notes on the
//! [`DiagnosticSink`] and counted in [`FlatStats`].
//!
//! # Usage
//!
//! ```ignore
//! use gateflat_netlist::flatten;
//! let output = flatten(&file, &config, &sink)?;
//! std::fs::write(path, output.text)?;
//! ```

#![warn(missing_docs)]

mod catalog;
mod emit;
mod error;
mod expr;
mod gate;
mod lower;
mod namespace;
mod naming;
mod scanner;
mod signal;
mod stats;

pub use catalog::{lookup, CellKind, CellSpec, Form, Operator, Translation, CATALOG};
pub use emit::emit_module;
pub use error::{
    FlattenError, LineRef, MALFORMED_STATEMENT, NAME_COLLISION, UNEXPECTED_EOF,
    UNRESOLVED_REFERENCE,
};
pub use expr::{Assignment, BinaryOp, Expr};
pub use gate::{GateInstance, PinBinding};
pub use namespace::{Clash, NamespaceState};
pub use naming::{
    group_bus_members, scalar_name, split_scalar, BusGroup, BusRole, NameError, SignalNamer,
};
pub use scanner::{BUS_WIDTH_MISMATCH, BUS_WIRE_SUPPRESSED, SKIPPED_LINE, UNSUPPORTED_CELL};
pub use signal::{Signal, SignalClass};
pub use stats::FlatStats;

use gateflat_config::FlattenConfig;
use gateflat_diagnostics::DiagnosticSink;
use gateflat_source::SourceFile;

/// The flattened module and what went into it.
#[derive(Clone, Debug)]
pub struct FlattenOutput {
    /// Complete module text, newline terminated.
    pub text: String,
    /// Counts gathered while flattening.
    pub stats: FlatStats,
}

/// Flattens the configured module of `file`.
///
/// Non-fatal findings (skipped cells and lines, port width mismatches) go to
/// `sink`. The output text depends only on the file content and `config`.
pub fn flatten(
    file: &SourceFile,
    config: &FlattenConfig,
    sink: &DiagnosticSink,
) -> Result<FlattenOutput, FlattenError> {
    let outcome = scanner::scan(file, config, sink)?;
    let mut stats = outcome.stats;
    stats.auxiliary_wires = outcome.namespace.auxiliary_count();
    let wires = outcome.namespace.finalize();
    stats.wires = wires.len();
    stats.assignments = outcome.assignments.len();
    log::debug!(
        "module `{}`: {} wire(s), {} assignment(s)",
        config.module,
        wires.len(),
        outcome.assignments.len()
    );

    let namer = SignalNamer::new(config);
    let text = emit_module(&config.module, &namer, &wires, &outcome.assignments);
    Ok(FlattenOutput { text, stats })
}
