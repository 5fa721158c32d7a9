//! Module-scoped name bookkeeping.
//!
//! Collects declared wires, auxiliary wires and every signal an emitted
//! assignment touches, then produces the single merged wire declaration.

use crate::signal::{Signal, SignalClass};
use std::collections::{BTreeMap, BTreeSet};

/// A name that cannot be used the way it was requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clash {
    /// The contested name.
    pub name: Signal,
    /// The class it already has.
    pub existing: SignalClass,
}

/// Name sets for one module. Built during the scan and consumed by
/// [`NamespaceState::finalize`].
#[derive(Debug, Default)]
pub struct NamespaceState {
    ports: BTreeMap<Signal, SignalClass>,
    declared: BTreeSet<Signal>,
    auxiliary: BTreeSet<Signal>,
    referenced: BTreeSet<Signal>,
}

impl NamespaceState {
    /// Starts a namespace with the module's port signals.
    pub fn new(ports: impl IntoIterator<Item = (Signal, SignalClass)>) -> Self {
        Self {
            ports: ports.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Records a name from a wire declaration.
    pub fn declare(&mut self, signal: Signal) -> Result<(), Clash> {
        self.check_not_auxiliary(&signal)?;
        self.declared.insert(signal);
        Ok(())
    }

    /// Records a name read or driven by a source gate pin.
    pub fn reference(&mut self, signal: Signal) -> Result<(), Clash> {
        self.check_not_auxiliary(&signal)?;
        self.referenced.insert(signal);
        Ok(())
    }

    /// Records a freshly generated auxiliary wire. The name must be unused.
    pub fn register_auxiliary(&mut self, signal: Signal) -> Result<(), Clash> {
        if let Some(existing) = self.classify(&signal) {
            return Err(Clash {
                name: signal,
                existing,
            });
        }
        self.referenced.insert(signal.clone());
        self.auxiliary.insert(signal);
        Ok(())
    }

    fn check_not_auxiliary(&self, signal: &Signal) -> Result<(), Clash> {
        if self.auxiliary.contains(signal) {
            return Err(Clash {
                name: signal.clone(),
                existing: SignalClass::AuxiliaryWire,
            });
        }
        Ok(())
    }

    /// The class of a known name. Ports keep their class whatever else
    /// happens to the name.
    pub fn classify(&self, signal: &Signal) -> Option<SignalClass> {
        if let Some(class) = self.ports.get(signal) {
            Some(*class)
        } else if self.auxiliary.contains(signal) {
            Some(SignalClass::AuxiliaryWire)
        } else if self.declared.contains(signal) || self.referenced.contains(signal) {
            Some(SignalClass::DeclaredWire)
        } else {
            None
        }
    }

    /// Number of auxiliary wires registered so far.
    pub fn auxiliary_count(&self) -> usize {
        self.auxiliary.len()
    }

    /// `(declared ∪ auxiliary ∪ referenced) \ ports`, sorted by name.
    pub fn finalize(self) -> Vec<Signal> {
        let ports = self.ports;
        let mut wires: BTreeSet<Signal> = self.declared;
        wires.extend(self.auxiliary);
        wires.extend(self.referenced);
        wires.retain(|s| !ports.contains_key(s));
        wires.into_iter().collect()
    }
}
