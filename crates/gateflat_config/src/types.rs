//! Configuration types.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Input bus name used when none is configured.
pub const DEFAULT_INPUT_BUS: &str = "in_array";
/// Output bus name used when none is configured.
pub const DEFAULT_OUTPUT_BUS: &str = "out_array";
/// Bus width used when none is configured.
pub const DEFAULT_WIDTH: u32 = 16;
/// Largest accepted bus width.
pub const MAX_WIDTH: u32 = 65_536;

/// The four parameters of one flattening run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Name of the module to flatten.
    pub module: String,
    /// Base name of the input port bus.
    pub input_bus: String,
    /// Base name of the output port bus.
    pub output_bus: String,
    /// Bit width shared by both buses.
    pub width: u32,
}

impl FlattenConfig {
    /// Builds a validated configuration.
    pub fn new(
        module: impl Into<String>,
        input_bus: impl Into<String>,
        output_bus: impl Into<String>,
        width: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            module: module.into(),
            input_bus: input_bus.into(),
            output_bus: output_bus.into(),
            width,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration for `module` with default bus names and width.
    pub fn with_defaults(module: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(module, DEFAULT_INPUT_BUS, DEFAULT_OUTPUT_BUS, DEFAULT_WIDTH)
    }

    /// Checks names and width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("module.name", &self.module),
            ("bus.input", &self.input_bus),
            ("bus.output", &self.output_bus),
        ] {
            if !is_identifier(value) {
                return Err(ConfigError::ValidationError(format!(
                    "{field} `{value}` is not a plain identifier"
                )));
            }
        }
        if self.input_bus == self.output_bus {
            return Err(ConfigError::ValidationError(format!(
                "input and output buses are both named `{}`",
                self.input_bus
            )));
        }
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(ConfigError::ValidationError(format!(
                "bus width {} is outside 1..={MAX_WIDTH}",
                self.width
            )));
        }
        Ok(())
    }
}

/// Returns `true` for `[A-Za-z_][A-Za-z0-9_$]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Contents of a `gateflat.toml` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// The `[module]` table.
    #[serde(default)]
    pub module: ModuleSection,
    /// The `[bus]` table.
    #[serde(default)]
    pub bus: BusSection,
}

/// The `[module]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSection {
    /// Module to flatten; may instead come from `--module`.
    pub name: Option<String>,
}

/// The `[bus]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusSection {
    /// Input bus base name.
    #[serde(default = "default_input")]
    pub input: String,
    /// Output bus base name.
    #[serde(default = "default_output")]
    pub output: String,
    /// Bus width.
    #[serde(default = "default_width")]
    pub width: u32,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            width: default_width(),
        }
    }
}

fn default_input() -> String {
    DEFAULT_INPUT_BUS.to_string()
}

fn default_output() -> String {
    DEFAULT_OUTPUT_BUS.to_string()
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}
