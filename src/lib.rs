//! Hierarchical configuration lookup.
//!
//! A hierarchy config lists data sources from most to least specific. Each
//! source names YAML files by path or glob, optionally interpolating context
//! variables such as `%{environment}`. Values for a key are combined across
//! all loaded layers with a per-key merge strategy: `first`, `hash`,
//! `unique` or `deep`.

pub mod cli;
pub mod config;
pub mod context;
mod error;
pub mod value;

pub use config::{load_settings, resolve, ConfigError, Hiera, HieraData, MergeStrategy};
pub use context::{Context, ContextBuilder};
pub use error::Error;
pub use value::{Mapping, Value};
