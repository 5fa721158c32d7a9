//! Final module text.

use crate::expr::Assignment;
use crate::naming::{BusRole, SignalNamer};
use crate::signal::Signal;

/// Renders the flattened module.
///
/// Layout: header with scalar ports (input bus, then output bus, index
/// ascending), one `input` line, one `output` line, one `wire` line unless
/// there are no wires, the assignments in scan order, `endmodule`.
pub fn emit_module(
    module: &str,
    namer: &SignalNamer<'_>,
    wires: &[Signal],
    assignments: &[Assignment],
) -> String {
    let inputs = namer.bus_members(BusRole::Input);
    let outputs = namer.bus_members(BusRole::Output);

    let mut out = String::new();
    let ports: Vec<&Signal> = inputs.iter().chain(outputs.iter()).collect();
    out.push_str(&format!("module {module}({});\n", join(ports.iter().copied())));
    out.push_str(&format!("input {};\n", join(inputs.iter())));
    out.push_str(&format!("output {};\n", join(outputs.iter())));
    if !wires.is_empty() {
        out.push_str(&format!("wire {};\n", join(wires.iter())));
    }
    for assignment in assignments {
        out.push_str(&format!("{assignment}\n"));
    }
    out.push_str("endmodule\n");
    out
}

fn join<'a>(signals: impl Iterator<Item = &'a Signal>) -> String {
    signals
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
