use std::path::PathBuf;
use thiserror::Error;

use super::interpolate::InterpolationError;
use super::merge::MergeStrategy;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unsupported hiera config version, should be '{expected}'; config={}", .config.display())]
    UnsupportedVersion { expected: i64, config: PathBuf },

    #[error("hiera config {entry} has unrecognized key: {keys}; config={}", .config.display())]
    UnknownKeys {
        entry: String,
        keys: String,
        config: PathBuf,
    },

    #[error("hiera config has wrong type, {field} expects {expected}; config={}", .config.display())]
    WrongType {
        field: String,
        expected: &'static str,
        config: PathBuf,
    },

    #[error("hiera config has wrong type, {field} expects a value for key '{key}'; config={}", .config.display())]
    MissingKey {
        field: String,
        key: &'static str,
        config: PathBuf,
    },

    #[error("unsupported hiera config data_hash: '{data_hash}'; config={}", .config.display())]
    UnknownBackend { data_hash: String, config: PathBuf },

    #[error("hiera config member '{name}' of entry 'hierarchy' expects a value for key 'path', 'paths', 'glob' or 'globs'; config={}", .config.display())]
    MissingPathMode { name: String, config: PathBuf },

    #[error("hiera config member '{name}' of entry 'hierarchy' has conflicting keys: {keys}; config={}", .config.display())]
    AmbiguousPathMode {
        name: String,
        keys: String,
        config: PathBuf,
    },

    #[error("unknown hiera lookup strategy '{strategy}' for key: '{key}'; config={}", .config.display())]
    UnknownStrategy {
        strategy: String,
        key: String,
        config: PathBuf,
    },

    #[error("all '{strategy}' merged matching values {requirement}, key: '{key}'; config={}", .config.display())]
    MergeType {
        strategy: MergeStrategy,
        requirement: &'static str,
        key: String,
        config: PathBuf,
    },

    #[error("data file '{}' must contain a hash, found {found}", .path.display())]
    NotAMapping { path: PathBuf, found: &'static str },

    #[error("failed to interpolate '{}': {source}", .path.display())]
    Interpolation {
        path: PathBuf,
        source: InterpolationError,
    },

    #[error("failed to read '{}': {source}", .path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid glob pattern '{pattern}': {source}")]
    GlobError {
        pattern: String,
        source: globset::Error,
    },

    #[error("failed to list '{}': {source}", .path.display())]
    WalkError {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[source] serde_yaml::Error),
}

impl ConfigError {
    /// Reporting category: `ConfigError`, `IoError` or `CodecError`.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::ReadError { .. } | ConfigError::WalkError { .. } => "IoError",
            ConfigError::ParseError { .. } | ConfigError::DeserializeError(_) => "CodecError",
            _ => "ConfigError",
        }
    }
}
