//! Gate instances recovered from buffered instantiation blocks.

use crate::catalog::CellSpec;
use crate::error::{FlattenError, LineRef};

/// One `.<pin>(<reference>)` connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinBinding {
    /// Pin name, e.g. `A`.
    pub pin: String,
    /// The reference as written, trimmed.
    pub reference: String,
    /// The line the connection appears on.
    pub at: LineRef,
}

/// A recognized cell with exactly the pins its catalog row requires.
#[derive(Clone, Debug)]
pub struct GateInstance {
    /// Catalog row.
    pub spec: &'static CellSpec,
    /// Instance name.
    pub instance: String,
    /// Connections in source order.
    pub pins: Vec<PinBinding>,
    /// The opening line, with a span covering the whole block.
    pub at: LineRef,
}

impl GateInstance {
    /// Checks the pin set against the catalog row.
    pub fn new(
        spec: &'static CellSpec,
        instance: impl Into<String>,
        pins: Vec<PinBinding>,
        at: LineRef,
    ) -> Result<Self, FlattenError> {
        let instance = instance.into();
        for (i, binding) in pins.iter().enumerate() {
            if !spec.has_pin(&binding.pin) {
                return Err(FlattenError::MalformedStatement {
                    at: binding.at.clone(),
                    reason: format!("cell `{}` has no pin `{}`", spec.keyword, binding.pin),
                });
            }
            if pins[..i].iter().any(|b| b.pin == binding.pin) {
                return Err(FlattenError::MalformedStatement {
                    at: binding.at.clone(),
                    reason: format!("pin `{}` of `{instance}` is connected twice", binding.pin),
                });
            }
        }
        if let Some(missing) = spec.pins().find(|p| !pins.iter().any(|b| b.pin == *p)) {
            return Err(FlattenError::MalformedStatement {
                at,
                reason: format!(
                    "`{}` instance `{instance}` does not connect pin `{missing}`",
                    spec.keyword
                ),
            });
        }
        Ok(Self {
            spec,
            instance,
            pins,
            at,
        })
    }

    /// The connection of `pin`.
    ///
    /// # Panics
    ///
    /// Panics if `pin` is not one of the cell's pins; construction guarantees
    /// every catalog pin is bound.
    pub fn binding(&self, pin: &str) -> &PinBinding {
        self.pins
            .iter()
            .find(|b| b.pin == pin)
            .unwrap_or_else(|| panic!("{} has no binding for {pin}", self.instance))
    }
}

/// Extracts every `.<pin>(<reference>)` fragment from a gate block.
///
/// `lines` are the buffered lines of the block, comments already removed
/// and paired with their locators. Fragments may share a line or span
/// several. Only text after the first `(` is searched, so dots inside the
/// instance name are not mistaken for pins.
pub(crate) fn extract_pins(lines: &[(String, LineRef)]) -> Result<Vec<PinBinding>, FlattenError> {
    let mut text = String::new();
    let mut starts = Vec::with_capacity(lines.len());
    for (code, _) in lines {
        starts.push(text.len());
        text.push_str(code);
        text.push('\n');
    }

    let bytes = text.as_bytes();
    let mut pos = match text.find('(') {
        Some(p) => p + 1,
        None => return Ok(Vec::new()),
    };
    let mut pins = Vec::new();
    while let Some(rel) = text[pos..].find('.') {
        let dot = pos + rel;
        let mut cursor = dot + 1;
        while cursor < bytes.len() && (bytes[cursor].is_ascii_alphanumeric() || bytes[cursor] == b'_')
        {
            cursor += 1;
        }
        let pin = &text[dot + 1..cursor];
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if pin.is_empty() || cursor >= bytes.len() || bytes[cursor] != b'(' {
            pos = dot + 1;
            continue;
        }

        let open = cursor;
        let mut depth = 0usize;
        let mut close = None;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else {
            return Err(FlattenError::MalformedStatement {
                at: line_at(&starts, lines, dot).clone(),
                reason: format!("connection of pin `{pin}` is never closed"),
            });
        };
        pins.push(PinBinding {
            pin: pin.to_string(),
            reference: text[open + 1..close].trim().to_string(),
            at: line_at(&starts, lines, dot).clone(),
        });
        pos = close + 1;
    }
    Ok(pins)
}

fn line_at<'a>(starts: &[usize], lines: &'a [(String, LineRef)], offset: usize) -> &'a LineRef {
    let idx = match starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i - 1,
    };
    &lines[idx].1
}
