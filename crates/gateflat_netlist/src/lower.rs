//! Expression emission: one gate instance in, one or two assignments out.

use crate::error::{FlattenError, LineRef};
use crate::expr::{Assignment, Expr};
use crate::gate::{GateInstance, PinBinding};
use crate::namespace::{Clash, NamespaceState};
use crate::naming::{NameError, SignalNamer};
use crate::signal::Signal;

/// Renames the gate's pins, translates it through its catalog row and
/// records every name it touches in `namespace`. Inputs tied to a one-bit
/// literal stay inline and never become wires.
pub(crate) fn lower_gate(
    gate: &GateInstance,
    namer: &SignalNamer<'_>,
    namespace: &mut NamespaceState,
) -> Result<Vec<Assignment>, FlattenError> {
    let spec = gate.spec;
    let mut inputs = Vec::with_capacity(spec.inputs.len());
    for pin in spec.inputs {
        inputs.push(resolve_input(gate.binding(pin), namer, namespace)?);
    }
    let output = resolve(gate.binding(spec.output), namer, namespace)?;

    let translation = spec.translate(&inputs, &output);
    if let Some(aux) = translation.auxiliary {
        namespace
            .register_auxiliary(aux)
            .map_err(|clash| collision(&gate.at, clash))?;
    }
    for assignment in &translation.assignments {
        log::trace!("{}: {assignment}", gate.instance);
    }
    Ok(translation.assignments)
}

fn resolve_input(
    binding: &PinBinding,
    namer: &SignalNamer<'_>,
    namespace: &mut NamespaceState,
) -> Result<Expr, FlattenError> {
    let operand = namer
        .operand(&binding.reference)
        .map_err(|e| unresolved(binding, e))?;
    if let Expr::Signal(signal) = &operand {
        namespace
            .reference(signal.clone())
            .map_err(|clash| collision(&binding.at, clash))?;
    }
    Ok(operand)
}

fn resolve(
    binding: &PinBinding,
    namer: &SignalNamer<'_>,
    namespace: &mut NamespaceState,
) -> Result<Signal, FlattenError> {
    let signal = namer
        .canonicalize(&binding.reference)
        .map_err(|e| unresolved(binding, e))?;
    namespace
        .reference(signal.clone())
        .map_err(|clash| collision(&binding.at, clash))?;
    Ok(signal)
}

fn unresolved(binding: &PinBinding, error: NameError) -> FlattenError {
    FlattenError::UnresolvedReference {
        at: binding.at.clone(),
        reference: binding.reference.clone(),
        reason: error.to_string(),
    }
}

pub(crate) fn collision(at: &LineRef, clash: Clash) -> FlattenError {
    FlattenError::NameCollision {
        at: at.clone(),
        name: clash.name.name().to_string(),
        existing: clash.existing.to_string(),
    }
}
