//! Mapping bus-indexed references to flat scalar names, and back.
//!
//! `in_array[3]` becomes `in_array_3`. Only the two configured port buses
//! may be indexed; every other reference must already be flat. One-bit
//! literals such as `1'b1` are recognized so gate inputs can be tied off.

use crate::expr::Expr;
use crate::signal::{Signal, SignalClass};
use gateflat_config::FlattenConfig;

/// Why a raw reference could not be turned into a signal.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The pin was left unconnected.
    #[error("empty reference")]
    Empty,
    /// Bracket syntax on something other than a configured port bus.
    #[error("`{base}` is not a configured bus")]
    UnknownBus {
        /// The base name before the bracket.
        base: String,
    },
    /// Index at or beyond the bus width.
    #[error("index {index} is outside {base}[0..{width}]")]
    OutOfRange {
        /// The bus.
        base: String,
        /// The offending index.
        index: u64,
        /// The configured width.
        width: u32,
    },
    /// Anything else with brackets: part selects, non-numeric indices.
    #[error("`{raw}` is not a single-bit bus reference")]
    Malformed {
        /// The reference as written.
        raw: String,
    },
    /// A literal where a signal is required, such as on an output pin.
    #[error("constant `{raw}` cannot be driven")]
    Constant {
        /// The literal as written.
        raw: String,
    },
    /// A literal other than a single 0 or 1 bit.
    #[error("`{raw}` is not a one-bit 0 or 1 constant")]
    UnsupportedConstant {
        /// The literal as written.
        raw: String,
    },
}

/// Which of the two port buses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BusRole {
    /// The input bus.
    Input,
    /// The output bus.
    Output,
}

/// Canonicalizes signal references against a run's bus configuration.
#[derive(Clone, Copy, Debug)]
pub struct SignalNamer<'a> {
    config: &'a FlattenConfig,
}

impl<'a> SignalNamer<'a> {
    /// Creates a namer for `config`.
    pub fn new(config: &'a FlattenConfig) -> Self {
        Self { config }
    }

    /// Base name of a bus.
    pub fn bus_name(&self, role: BusRole) -> &'a str {
        match role {
            BusRole::Input => &self.config.input_bus,
            BusRole::Output => &self.config.output_bus,
        }
    }

    /// Which bus `base` names, if any.
    pub fn bus_role(&self, base: &str) -> Option<BusRole> {
        if base == self.config.input_bus {
            Some(BusRole::Input)
        } else if base == self.config.output_bus {
            Some(BusRole::Output)
        } else {
            None
        }
    }

    /// Turns a raw reference into its canonical signal.
    ///
    /// Flat names (including escaped identifiers) pass through unchanged.
    pub fn canonicalize(&self, raw: &str) -> Result<Signal, NameError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        if parse_constant(raw).is_some() {
            return Err(NameError::Constant {
                raw: raw.to_string(),
            });
        }
        if raw.starts_with('\\') || !raw.contains('[') {
            return Ok(Signal::new(raw));
        }

        let malformed = || NameError::Malformed {
            raw: raw.to_string(),
        };
        let (base, rest) = raw.split_once('[').ok_or_else(malformed)?;
        let base = base.trim_end();
        let index = rest.strip_suffix(']').ok_or_else(malformed)?.trim();
        if self.bus_role(base).is_none() {
            return Err(NameError::UnknownBus {
                base: base.to_string(),
            });
        }
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let index: u64 = index.parse().map_err(|_| malformed())?;
        if index >= u64::from(self.config.width) {
            return Err(NameError::OutOfRange {
                base: base.to_string(),
                index,
                width: self.config.width,
            });
        }
        Ok(Signal::new(scalar_name(base, index as u32)))
    }

    /// An input operand: a one-bit literal or a canonical signal.
    pub fn operand(&self, raw: &str) -> Result<Expr, NameError> {
        match parse_constant(raw) {
            Some(value) => value.map(Expr::Const),
            None => self.canonicalize(raw).map(Expr::Signal),
        }
    }

    /// The scalar members of a bus, index ascending.
    pub fn bus_members(&self, role: BusRole) -> Vec<Signal> {
        let base = self.bus_name(role);
        (0..self.config.width)
            .map(|i| Signal::new(scalar_name(base, i)))
            .collect()
    }

    /// All port signals: input bus members, then output bus members.
    pub fn port_signals(&self) -> Vec<(Signal, SignalClass)> {
        let inputs = self
            .bus_members(BusRole::Input)
            .into_iter()
            .map(|s| (s, SignalClass::PortInput));
        let outputs = self
            .bus_members(BusRole::Output)
            .into_iter()
            .map(|s| (s, SignalClass::PortOutput));
        inputs.chain(outputs).collect()
    }
}

/// Flat name of bit `index` of `base`.
pub fn scalar_name(base: &str, index: u32) -> String {
    format!("{base}_{index}")
}

/// Splits `base_index` into its parts.
pub fn split_scalar(name: &str) -> Option<(&str, u32)> {
    let (base, index) = name.rsplit_once('_')?;
    if base.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((base, index.parse().ok()?))
}

/// Scalar members of one bus recovered from flat names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusGroup {
    /// The bus base name.
    pub base: String,
    /// Members in index order.
    pub members: Vec<Signal>,
}

/// Groups flat names by bus, buses in order of first appearance and members
/// in index order. Names that are not of the form `base_index` are ignored,
/// as are repeated members.
pub fn group_bus_members<'s>(signals: impl IntoIterator<Item = &'s Signal>) -> Vec<BusGroup> {
    let mut groups: Vec<(String, Vec<(u32, Signal)>)> = Vec::new();
    for signal in signals {
        let Some((base, index)) = split_scalar(signal.name()) else {
            continue;
        };
        let pos = match groups.iter().position(|(b, _)| b == base) {
            Some(pos) => pos,
            None => {
                groups.push((base.to_string(), Vec::new()));
                groups.len() - 1
            }
        };
        let members = &mut groups[pos].1;
        if !members.iter().any(|(i, _)| *i == index) {
            members.push((index, signal.clone()));
        }
    }
    groups
        .into_iter()
        .map(|(base, mut members)| {
            members.sort_by_key(|(i, _)| *i);
            BusGroup {
                base,
                members: members.into_iter().map(|(_, s)| s).collect(),
            }
        })
        .collect()
}

/// Reads a Verilog number such as `1'b0`, `1'h1` or `0`.
///
/// Returns `None` when `raw` is not a number at all, and an error for
/// values that are not a single 0 or 1 bit (wider values, `x`, `z`).
pub fn parse_constant(raw: &str) -> Option<Result<bool, NameError>> {
    let raw = raw.trim();
    if !raw.starts_with(|c: char| c.is_ascii_digit() || c == '\'') {
        return None;
    }
    let unsupported = || {
        Err(NameError::UnsupportedConstant {
            raw: raw.to_string(),
        })
    };
    let digits = match raw.split_once('\'') {
        Some((size, based)) => {
            if !size.trim().bytes().all(|b| b.is_ascii_digit()) {
                return Some(unsupported());
            }
            let based = based.trim_start();
            let based = based.strip_prefix(['s', 'S']).unwrap_or(based);
            let mut chars = based.chars();
            match chars.next() {
                Some('b' | 'B' | 'o' | 'O' | 'd' | 'D' | 'h' | 'H') => chars.as_str().trim(),
                _ => return Some(unsupported()),
            }
        }
        None => raw,
    };
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b == b'0' || b == b'1') {
        return Some(unsupported());
    }
    match digits.trim_start_matches('0') {
        "" => Some(Ok(false)),
        "1" => Some(Ok(true)),
        _ => Some(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32) -> FlattenConfig {
        FlattenConfig::new("top", "in_array", "out_array", width).unwrap()
    }

    #[test]
    fn bus_index_is_flattened() {
        let cfg = config(16);
        let namer = SignalNamer::new(&cfg);
        assert_eq!(namer.canonicalize("in_array[3]").unwrap().name(), "in_array_3");
        assert_eq!(
            namer.canonicalize(" out_array [15] ").unwrap().name(),
            "out_array_15"
        );
    }

    #[test]
    fn flat_names_are_unchanged() {
        let cfg = config(16);
        let namer = SignalNamer::new(&cfg);
        for name in ["_05_", "in_array_3", "n12", "\\esc[4]"] {
            let once = namer.canonicalize(name).unwrap();
            assert_eq!(once.name(), name);
            assert_eq!(namer.canonicalize(once.name()).unwrap(), once);
        }
    }

    #[test]
    fn one_bit_constants() {
        let accepted = [
            ("1'b1", true),
            ("1'b0", false),
            ("1'h1", true),
            ("'b0", false),
            ("0", false),
            ("1'sb1", true),
        ];
        for (raw, value) in accepted {
            assert_eq!(parse_constant(raw), Some(Ok(value)), "{raw}");
        }
        for raw in ["1'bx", "1'bz", "2'b10", "8'hff", "4'd9"] {
            assert!(
                matches!(parse_constant(raw), Some(Err(NameError::UnsupportedConstant { .. }))),
                "{raw}"
            );
        }
        assert_eq!(parse_constant("n1"), None);
        assert_eq!(parse_constant("\\1'b1"), None);
    }

    #[test]
    fn constants_are_operands_but_not_signals() {
        let cfg = config(2);
        let namer = SignalNamer::new(&cfg);
        assert_eq!(namer.operand("1'b1").unwrap(), Expr::Const(true));
        assert_eq!(
            namer.operand("in_array[1]").unwrap(),
            Expr::Signal(Signal::new("in_array_1"))
        );
        assert!(matches!(namer.canonicalize("1'b0"), Err(NameError::Constant { .. })));
    }

    #[test]
    fn out_of_range_index() {
        let cfg = config(2);
        let namer = SignalNamer::new(&cfg);
        assert_eq!(
            namer.canonicalize("in_array[2]"),
            Err(NameError::OutOfRange {
                base: "in_array".to_string(),
                index: 2,
                width: 2,
            })
        );
    }

    #[test]
    fn unknown_bus() {
        let cfg = config(4);
        let namer = SignalNamer::new(&cfg);
        assert!(matches!(
            namer.canonicalize("tmp[0]"),
            Err(NameError::UnknownBus { ref base }) if base == "tmp"
        ));
    }

    #[test]
    fn part_select_and_garbage() {
        let cfg = config(4);
        let namer = SignalNamer::new(&cfg);
        assert!(matches!(namer.canonicalize("in_array[3:0]"), Err(NameError::Malformed { .. })));
        assert!(matches!(namer.canonicalize("in_array[x]"), Err(NameError::Malformed { .. })));
        assert!(matches!(namer.canonicalize("in_array[1"), Err(NameError::Malformed { .. })));
        assert_eq!(namer.canonicalize("  "), Err(NameError::Empty));
    }

    #[test]
    fn huge_index_is_out_of_range() {
        let cfg = config(4);
        let namer = SignalNamer::new(&cfg);
        assert!(matches!(
            namer.canonicalize("out_array[4294967296]"),
            Err(NameError::OutOfRange { .. })
        ));
    }

    #[test]
    fn round_trip_bus_coverage() {
        for width in [1, 2, 7, 16, 33] {
            let cfg = config(width);
            let namer = SignalNamer::new(&cfg);
            for base in ["in_array", "out_array"] {
                let scalars: Vec<Signal> = (0..width)
                    .map(|i| namer.canonicalize(&format!("{base}[{i}]")).unwrap())
                    .collect();
                let groups = group_bus_members(&scalars);
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].base, base);
                assert_eq!(groups[0].members, scalars);
            }
        }
    }

    #[test]
    fn grouping_sorts_by_index_not_name() {
        let signals = vec![
            Signal::new("b_10"),
            Signal::new("a_1"),
            Signal::new("b_2"),
            Signal::new("plain"),
            Signal::new("b_2"),
        ];
        let groups = group_bus_members(&signals);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].base, "b");
        let names: Vec<_> = groups[0].members.iter().map(Signal::name).collect();
        assert_eq!(names, vec!["b_2", "b_10"]);
        assert_eq!(groups[1].base, "a");
    }

    #[test]
    fn port_signals_input_first() {
        let cfg = config(2);
        let namer = SignalNamer::new(&cfg);
        let names: Vec<_> = namer
            .port_signals()
            .into_iter()
            .map(|(s, c)| (s.name().to_string(), c))
            .collect();
        assert_eq!(
            names,
            vec![
                ("in_array_0".to_string(), SignalClass::PortInput),
                ("in_array_1".to_string(), SignalClass::PortInput),
                ("out_array_0".to_string(), SignalClass::PortOutput),
                ("out_array_1".to_string(), SignalClass::PortOutput),
            ]
        );
    }
}
