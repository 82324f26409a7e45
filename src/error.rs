use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the hiera library and command line.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("key not found: '{0}'")]
    KeyNotFound(String),

    #[error("invalid context variable '{0}', expected KEY=VALUE")]
    InvalidVariable(String),

    #[error("failed to encode output as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode output as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Reporting category printed in front of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(e) => e.kind(),
            Error::KeyNotFound(_) => "LookupError",
            Error::InvalidVariable(_) => "UsageError",
            Error::Json(_) | Error::Yaml(_) => "CodecError",
        }
    }
}
