//! Configuration errors.

/// Failures while loading or validating flattening parameters.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content is malformed or has the wrong shape.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required value was given neither in the file nor on the command line.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A value is present but unusable.
    #[error("validation error: {0}")]
    ValidationError(String),
}
