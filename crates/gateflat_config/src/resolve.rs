//! Merging file settings with command-line overrides.

use crate::error::ConfigError;
use crate::types::{FlattenConfig, ProjectFile};

/// Values given on the command line; each one replaces the file's value.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// `--module`
    pub module: Option<String>,
    /// `--input-bus`
    pub input_bus: Option<String>,
    /// `--output-bus`
    pub output_bus: Option<String>,
    /// `--width`
    pub width: Option<u32>,
}

/// Produces the validated [`FlattenConfig`] for a run.
///
/// Without a file, bus settings fall back to their defaults; the module name
/// has no default and must come from one of the two sources.
pub fn resolve_config(
    file: Option<&ProjectFile>,
    overrides: &ConfigOverrides,
) -> Result<FlattenConfig, ConfigError> {
    let base = file.map(|f| &f.bus);
    let default_bus = crate::types::BusSection::default();
    let bus = base.unwrap_or(&default_bus);

    let module = overrides
        .module
        .clone()
        .or_else(|| file.and_then(|f| f.module.name.clone()))
        .ok_or_else(|| ConfigError::MissingField("module.name".to_string()))?;

    FlattenConfig::new(
        module,
        overrides
            .input_bus
            .clone()
            .unwrap_or_else(|| bus.input.clone()),
        overrides
            .output_bus
            .clone()
            .unwrap_or_else(|| bus.output.clone()),
        overrides.width.unwrap_or(bus.width),
    )
}
