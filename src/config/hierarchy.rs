//! Validation of the hierarchy config document.
//!
//! The document schema is closed: `version`, `defaults` and `hierarchy` are
//! the only top-level keys, and every hierarchy entry accepts `name`,
//! `datadir`, `data_hash` plus exactly one of `path`, `paths`, `glob`,
//! `globs`.

use std::path::Path;

use super::file::YamlData;
use super::source::{DataSource, PathSpec};
use super::ConfigError;
use crate::value::{Mapping, Value};

/// The only supported config schema version.
pub const HIERA_CONFIG_VERSION: i64 = 5;

pub const DEFAULT_DATADIR: &str = "data";
pub const DEFAULT_DATA_HASH: &str = "yaml_data";

/// Data backend selected by `data_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    YamlData,
}

impl Backend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "yaml_data" => Some(Backend::YamlData),
            _ => None,
        }
    }
}

/// Values merged under every hierarchy entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub datadir: String,
    pub data_hash: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            datadir: DEFAULT_DATADIR.to_string(),
            data_hash: DEFAULT_DATA_HASH.to_string(),
        }
    }
}

/// One validated hierarchy entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub name: String,
    pub datadir: String,
    pub backend: Backend,
    pub paths: PathSpec,
}

impl HierarchyEntry {
    /// Creates the data source reading this entry's files under `base_dir`.
    pub fn source(&self, base_dir: &Path, config: &Path) -> Box<dyn DataSource> {
        match self.backend {
            Backend::YamlData => Box::new(YamlData::new(
                &self.name,
                base_dir.join(&self.datadir),
                self.paths.clone(),
                config,
            )),
        }
    }
}

/// A validated hierarchy config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HieraConfig {
    pub defaults: Defaults,
    pub hierarchy: Vec<HierarchyEntry>,
}

/// Validates a parsed config document. `config` is only used in error
/// messages.
pub fn parse(document: Value, config: &Path) -> Result<HieraConfig, ConfigError> {
    Parser { config }.document(document)
}

struct Parser<'a> {
    config: &'a Path,
}

impl Parser<'_> {
    fn document(&self, document: Value) -> Result<HieraConfig, ConfigError> {
        let mut doc = match document {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(self.wrong_type("document", "a hash")),
        };

        self.version(doc.shift_remove("version"))?;
        let defaults = self.defaults(doc.shift_remove("defaults"))?;
        let hierarchy = self.hierarchy(doc.shift_remove("hierarchy"), &defaults)?;
        self.no_residual_keys("document", &doc)?;

        Ok(HieraConfig {
            defaults,
            hierarchy,
        })
    }

    fn version(&self, version: Option<Value>) -> Result<(), ConfigError> {
        match version {
            Some(Value::Integer(HIERA_CONFIG_VERSION)) => Ok(()),
            _ => Err(ConfigError::UnsupportedVersion {
                expected: HIERA_CONFIG_VERSION,
                config: self.config.to_path_buf(),
            }),
        }
    }

    fn defaults(&self, conf: Option<Value>) -> Result<Defaults, ConfigError> {
        let mut conf = match conf {
            None | Some(Value::Null) => return Ok(Defaults::default()),
            Some(Value::Mapping(map)) => map,
            Some(_) => return Err(self.wrong_type("entry 'defaults'", "a hash")),
        };

        let mut defaults = Defaults::default();
        if let Some(datadir) = self.take_string(&mut conf, "datadir", "entry 'defaults.datadir'")? {
            defaults.datadir = datadir;
        }
        if let Some(data_hash) =
            self.take_string(&mut conf, "data_hash", "entry 'defaults.data_hash'")?
        {
            defaults.data_hash = data_hash;
        }
        self.no_residual_keys("entry 'defaults'", &conf)?;

        Ok(defaults)
    }

    fn hierarchy(
        &self,
        conf: Option<Value>,
        defaults: &Defaults,
    ) -> Result<Vec<HierarchyEntry>, ConfigError> {
        let items = match conf {
            Some(Value::Sequence(items)) if !items.is_empty() => items,
            _ => return Err(self.wrong_type("entry 'hierarchy'", "a non-empty list")),
        };

        items
            .into_iter()
            .map(|item| self.entry(item, defaults))
            .collect()
    }

    fn entry(&self, item: Value, defaults: &Defaults) -> Result<HierarchyEntry, ConfigError> {
        const FIELD: &str = "member of entry 'hierarchy'";

        let Value::Mapping(mut item) = item else {
            return Err(self.wrong_type(FIELD, "a hash"));
        };

        let name = self
            .take_string(&mut item, "name", "'name' of entry 'hierarchy'")?
            .ok_or_else(|| ConfigError::MissingKey {
                field: FIELD.to_string(),
                key: "name",
                config: self.config.to_path_buf(),
            })?;

        let datadir = self
            .take_string(&mut item, "datadir", &format!("'datadir' of member '{name}'"))?
            .unwrap_or_else(|| defaults.datadir.clone());
        let data_hash = self
            .take_string(&mut item, "data_hash", &format!("'data_hash' of member '{name}'"))?
            .unwrap_or_else(|| defaults.data_hash.clone());
        let backend =
            Backend::from_name(&data_hash).ok_or_else(|| ConfigError::UnknownBackend {
                data_hash: data_hash.clone(),
                config: self.config.to_path_buf(),
            })?;

        let paths = self.path_spec(&mut item, &name)?;
        self.no_residual_keys(&format!("member '{name}' of entry 'hierarchy'"), &item)?;

        Ok(HierarchyEntry {
            name,
            datadir,
            backend,
            paths,
        })
    }

    fn path_spec(&self, item: &mut Mapping, name: &str) -> Result<PathSpec, ConfigError> {
        let present: Vec<&str> = PathSpec::KEYS
            .into_iter()
            .filter(|key| item.contains_key(*key))
            .collect();

        let key = match present.as_slice() {
            [] => {
                return Err(ConfigError::MissingPathMode {
                    name: name.to_string(),
                    config: self.config.to_path_buf(),
                })
            }
            [key] => *key,
            _ => {
                return Err(ConfigError::AmbiguousPathMode {
                    name: name.to_string(),
                    keys: present.join(" "),
                    config: self.config.to_path_buf(),
                })
            }
        };

        let field = format!("'{key}' of member '{name}'");
        let value = item.shift_remove(key).unwrap_or_default();
        let spec = match key {
            "path" => PathSpec::Path(self.string(value, &field)?),
            "paths" => PathSpec::Paths(self.string_list(value, &field)?),
            "glob" => PathSpec::Glob(self.string(value, &field)?),
            _ => PathSpec::Globs(self.string_list(value, &field)?),
        };
        Ok(spec)
    }

    fn take_string(
        &self,
        map: &mut Mapping,
        key: &str,
        field: &str,
    ) -> Result<Option<String>, ConfigError> {
        map.shift_remove(key)
            .map(|value| self.string(value, field))
            .transpose()
    }

    fn string(&self, value: Value, field: &str) -> Result<String, ConfigError> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(self.wrong_type(field, "a string")),
        }
    }

    fn string_list(&self, value: Value, field: &str) -> Result<Vec<String>, ConfigError> {
        match value {
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| self.string(item, field))
                .collect(),
            _ => Err(self.wrong_type(field, "a list of strings")),
        }
    }

    fn no_residual_keys(&self, entry: &str, map: &Mapping) -> Result<(), ConfigError> {
        if map.is_empty() {
            return Ok(());
        }
        Err(ConfigError::UnknownKeys {
            entry: entry.to_string(),
            keys: map.keys().map(String::as_str).collect::<Vec<_>>().join(" "),
            config: self.config.to_path_buf(),
        })
    }

    fn wrong_type(&self, field: &str, expected: &'static str) -> ConfigError {
        ConfigError::WrongType {
            field: field.to_string(),
            expected,
            config: self.config.to_path_buf(),
        }
    }
}
