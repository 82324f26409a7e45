use std::path::{Path, PathBuf};

use tracing::info;

use super::data::HieraData;
use super::hierarchy::{self, HieraConfig};
use super::source::DataSource;
use super::ConfigError;
use crate::context::Context;
use crate::value::{decode_yaml, Mapping};

/// A hierarchy config file and the directory its data paths are relative to.
///
/// Each call to [`get_data`](Self::get_data) reads the config and every data
/// file from scratch, so results never leak between contexts.
///
/// ## Example
///
/// ```no_run
/// use hiera::{Context, Hiera};
///
/// let ctx = Context::builder().with_var("environment", "production").build();
/// let data = Hiera::load_data("config/hiera.yaml", &ctx)?;
///
/// let port = data.lookup("port", None)?;
/// let everything = data.flatten()?;
/// # Ok::<(), hiera::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Hiera {
    config_file: PathBuf,
    base_dir: PathBuf,
}

impl Hiera {
    /// Binds a config file. Relative paths are resolved against the current
    /// directory.
    pub fn new(config_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_file.as_ref();
        let config_file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                })?
                .join(path)
        };
        let base_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            config_file,
            base_dir,
        })
    }

    /// Binds `config_file` and loads its data for `ctx` in one step.
    pub fn load_data(config_file: impl AsRef<Path>, ctx: &Context) -> Result<HieraData, ConfigError> {
        Self::new(config_file)?.get_data(ctx)
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Reads and validates the config document.
    pub fn read_config(&self) -> Result<HieraConfig, ConfigError> {
        let contents =
            std::fs::read_to_string(&self.config_file).map_err(|e| ConfigError::ReadError {
                path: self.config_file.clone(),
                source: e,
            })?;
        let document = decode_yaml(&contents).map_err(|e| ConfigError::ParseError {
            path: self.config_file.clone(),
            source: e,
        })?;
        hierarchy::parse(document, &self.config_file)
    }

    /// One data source per hierarchy entry, in declaration order.
    pub fn sources(&self, config: &HieraConfig) -> Vec<Box<dyn DataSource>> {
        config
            .hierarchy
            .iter()
            .map(|entry| entry.source(&self.base_dir, &self.config_file))
            .collect()
    }

    /// Reads the config and loads every layer against `ctx`.
    pub fn get_data(&self, ctx: &Context) -> Result<HieraData, ConfigError> {
        let config = self.read_config()?;
        let sources = self.sources(&config);
        let data = HieraData::load(&self.config_file, &sources, ctx)?;
        info!(
            config = %self.config_file.display(),
            entries = sources.len(),
            layers = data.layers().len(),
            "loaded hiera data"
        );
        Ok(data)
    }
}

/// Resolves `config_file` for `ctx` into one flat mapping.
pub fn resolve(config_file: impl AsRef<Path>, ctx: &Context) -> Result<Mapping, ConfigError> {
    Hiera::load_data(config_file, ctx)?.flatten()
}
