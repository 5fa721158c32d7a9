//! Reading `gateflat.toml`.

use crate::error::ConfigError;
use crate::types::ProjectFile;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "gateflat.toml";

/// Reads and parses a configuration file.
pub fn load_config(path: &Path) -> Result<ProjectFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses configuration text.
pub fn load_config_from_str(content: &str) -> Result<ProjectFile, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Returns `<dir>/gateflat.toml` if it exists.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
