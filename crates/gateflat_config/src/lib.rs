//! Loading and validation of the flattening parameters.
//!
//! The netlist core takes a [`FlattenConfig`] as an explicit argument. This
//! crate builds one from an optional `gateflat.toml` ([`ProjectFile`]) and
//! command-line overrides ([`ConfigOverrides`]).

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve_config, ConfigOverrides};
pub use types::*;
