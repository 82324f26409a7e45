//! Layered lookups over every loaded hierarchy entry.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::merge::{self, MergeStrategy};
use super::source::{DataSource, Layer};
use super::ConfigError;
use crate::context::Context;
use crate::value::{Mapping, Value};

/// Reserved key holding per-key merge options.
pub const LOOKUP_OPTIONS_KEY: &str = "lookup_options";

/// The loaded layers of one resolution.
///
/// All sources are loaded once, when the value is constructed, and layers
/// never change afterwards. Layers keep hierarchy declaration order, then
/// the order inside each entry, so the most specific layer comes first.
#[derive(Debug)]
pub struct HieraData {
    config: PathBuf,
    layers: Vec<Layer>,
    lookup_options: Option<Value>,
}

impl HieraData {
    /// Loads every source against `ctx`.
    pub fn load(
        config: impl AsRef<Path>,
        sources: &[Box<dyn DataSource>],
        ctx: &Context,
    ) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        for source in sources {
            let loaded = source.layers(ctx)?;
            debug!(entry = source.name(), layers = loaded.len(), "loaded hierarchy entry");
            layers.extend(loaded);
        }
        Ok(Self::from_layers(config, layers))
    }

    /// Builds lookups over already loaded layers.
    pub fn from_layers(config: impl AsRef<Path>, layers: Vec<Layer>) -> Self {
        let lookup_options =
            merge::lookup_first(layers.iter().map(|l| &l.data), LOOKUP_OPTIONS_KEY);
        Self {
            config: config.as_ref().to_path_buf(),
            layers,
            lookup_options,
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Merge strategy for `key` from `lookup_options`, `first` when unset.
    ///
    /// The option is either `merge: <name>` or `merge: {strategy: <name>}`.
    pub fn strategy_for(&self, key: &str) -> Result<MergeStrategy, ConfigError> {
        let options = match &self.lookup_options {
            None | Some(Value::Null) => return Ok(MergeStrategy::First),
            Some(Value::Mapping(options)) => options,
            Some(_) => return Err(self.wrong_type(LOOKUP_OPTIONS_KEY.to_string(), "a hash")),
        };

        let merge = match options.get(key) {
            None | Some(Value::Null) => return Ok(MergeStrategy::First),
            Some(Value::Mapping(option)) => option.get("merge"),
            Some(_) => return Err(self.wrong_type(format!("lookup_options for key '{key}'"), "a hash")),
        };

        let name = match merge {
            None | Some(Value::Null) => return Ok(MergeStrategy::First),
            Some(Value::String(name)) => name,
            Some(Value::Mapping(long_form)) => match long_form.get("strategy") {
                Some(Value::String(name)) => name,
                _ => {
                    return Err(self.wrong_type(
                        format!("lookup_options merge.strategy for key '{key}'"),
                        "a string",
                    ))
                }
            },
            Some(_) => {
                return Err(self.wrong_type(
                    format!("lookup_options merge for key '{key}'"),
                    "a string or a hash",
                ))
            }
        };

        self.parse_strategy(name, key)
    }

    /// Parses a strategy name, reporting unknown names against `key`.
    pub fn parse_strategy(&self, name: &str, key: &str) -> Result<MergeStrategy, ConfigError> {
        MergeStrategy::from_name(name).ok_or_else(|| ConfigError::UnknownStrategy {
            strategy: name.to_string(),
            key: key.to_string(),
            config: self.config.clone(),
        })
    }

    /// Looks up `key`, with `strategy` or the one from `lookup_options`.
    ///
    /// Returns `Ok(None)` when no layer holds the key.
    pub fn lookup(
        &self,
        key: &str,
        strategy: Option<MergeStrategy>,
    ) -> Result<Option<Value>, ConfigError> {
        let strategy = match strategy {
            Some(strategy) => strategy,
            None => self.strategy_for(key)?,
        };

        merge::lookup(strategy, self.layers.iter().map(|l| &l.data), key).map_err(|e| {
            ConfigError::MergeType {
                strategy: e.strategy,
                requirement: e.requirement,
                key: key.to_string(),
                config: self.config.clone(),
            }
        })
    }

    /// Like [`lookup`](Self::lookup) with the configured strategy, falling
    /// back to `default` when no layer holds the key.
    pub fn lookup_or(&self, key: &str, default: Value) -> Result<Value, ConfigError> {
        Ok(self.lookup(key, None)?.unwrap_or(default))
    }

    /// Every key of every layer except `lookup_options`, in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let keys: IndexSet<&str> = self
            .layers
            .iter()
            .flat_map(|layer| layer.data.keys().map(String::as_str))
            .filter(|key| *key != LOOKUP_OPTIONS_KEY)
            .collect();
        keys.into_iter().collect()
    }

    /// Resolves every key with its configured strategy.
    pub fn flatten(&self) -> Result<Mapping, ConfigError> {
        let mut flat = Mapping::new();
        for key in self.keys() {
            if let Some(value) = self.lookup(key, None)? {
                flat.insert(key.to_string(), value);
            }
        }
        Ok(flat)
    }

    /// Flattens and deserializes the result into `T`.
    pub fn flatten_into<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let flat = Value::Mapping(self.flatten()?);
        let raw = serde_yaml::to_value(&flat).map_err(ConfigError::DeserializeError)?;
        serde_yaml::from_value(raw).map_err(ConfigError::DeserializeError)
    }

    fn wrong_type(&self, field: String, expected: &'static str) -> ConfigError {
        ConfigError::WrongType {
            field,
            expected,
            config: self.config.clone(),
        }
    }
}
