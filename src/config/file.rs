//! The `yaml_data` backend: YAML files under a data directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::glob;
use super::interpolate::{interpolate, interpolate_value};
use super::source::{DataSource, Layer, LayerOrigin, PathSpec};
use super::ConfigError;
use crate::context::Context;
use crate::value::{decode_yaml, Mapping, Value};

/// Reads the files of one hierarchy entry.
///
/// Paths and patterns are interpolated against the context and resolved
/// relative to `data_dir`. Every loaded document is interpolated as well.
#[derive(Debug, Clone)]
pub struct YamlData {
    name: String,
    data_dir: PathBuf,
    spec: PathSpec,
    config: PathBuf,
}

impl YamlData {
    pub fn new(
        name: impl Into<String>,
        data_dir: impl AsRef<Path>,
        spec: PathSpec,
        config: impl AsRef<Path>,
    ) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.as_ref().to_path_buf(),
            spec,
            config: config.as_ref().to_path_buf(),
        }
    }

    /// Resolved file locations, in declaration order.
    fn files(&self, ctx: &Context) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = Vec::new();
        for declared in self.spec.entries() {
            let resolved =
                interpolate(declared, ctx).map_err(|source| ConfigError::Interpolation {
                    path: self.config.clone(),
                    source,
                })?;

            if self.spec.is_glob() {
                let matched = glob::expand(&self.data_dir, &resolved)?;
                debug!(
                    entry = %self.name,
                    pattern = %resolved,
                    matches = matched.len(),
                    "expanded glob"
                );
                files.extend(matched);
            } else {
                files.push(self.data_dir.join(resolved));
            }
        }
        Ok(files)
    }
}

impl DataSource for YamlData {
    fn name(&self) -> &str {
        &self.name
    }

    fn layers(&self, ctx: &Context) -> Result<Vec<Layer>, ConfigError> {
        self.files(ctx)?
            .into_iter()
            .enumerate()
            .map(|(index, path)| {
                let mut data = load_data_file(&path)?;
                for (_key, value) in data.iter_mut() {
                    interpolate_value(value, ctx).map_err(|source| {
                        ConfigError::Interpolation {
                            path: path.clone(),
                            source,
                        }
                    })?;
                }

                debug!(entry = %self.name, index, path = %path.display(), keys = data.len(), "loaded layer");
                Ok(Layer::new(
                    LayerOrigin {
                        entry: self.name.clone(),
                        index,
                        path,
                    },
                    data,
                ))
            })
            .collect()
    }
}

/// Loads a YAML data file as a mapping.
///
/// A missing file or an empty document yields an empty mapping.
pub fn load_data_file(path: &Path) -> Result<Mapping, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "data file not found, using empty layer");
            return Ok(Mapping::new());
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let value = decode_yaml(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    match value {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
            found: other.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn ctx() -> Context {
        Context::builder().with_var("environment", "local").build()
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key: value").unwrap();

        let map = load_data_file(file.path()).unwrap();
        assert_eq!(map.get("key"), Some(&Value::from("value")));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let map = load_data_file(Path::new("/nonexistent/path/data.yaml")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_data_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "key: [unclosed").unwrap();

        let result = load_data_file(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_non_mapping_document() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "- a\n- b").unwrap();

        let result = load_data_file(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::NotAMapping { found: "list", .. })
        ));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let result = load_data_file(dir.path());
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_paths_produce_one_layer_each_even_when_missing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "local.yaml", "name: local");

        let source = YamlData::new(
            "env",
            dir.path(),
            PathSpec::Paths(vec!["%{environment}.yaml".into(), "missing.yaml".into()]),
            dir.path().join("hiera.yaml"),
        );
        let layers = source.layers(&ctx()).unwrap();

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].data.get("name"), Some(&Value::from("local")));
        assert_eq!(layers[0].origin.index, 0);
        assert_eq!(layers[0].origin.entry, "env");
        assert_eq!(layers[0].origin.path, dir.path().join("local.yaml"));
        assert!(layers[1].data.is_empty());
        assert_eq!(layers[1].origin.index, 1);
    }

    #[test]
    fn test_globs_expand_in_pattern_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "local/b.yaml", "b: 1");
        write(dir.path(), "local/a.yaml", "a: 1");
        write(dir.path(), "common.yaml", "common: 1");

        let source = YamlData::new(
            "globbed",
            dir.path(),
            PathSpec::Globs(vec!["%{environment}/*.yaml".into(), "{common,none}.yaml".into()]),
            dir.path().join("hiera.yaml"),
        );
        let layers = source.layers(&ctx()).unwrap();
        let names: Vec<_> = layers
            .iter()
            .map(|l| l.data.keys().next().unwrap().clone())
            .collect();

        assert_eq!(names, ["a", "b", "common"]);
        let indexes: Vec<_> = layers.iter().map(|l| l.origin.index).collect();
        assert_eq!(indexes, [0, 1, 2]);
    }

    #[test]
    fn test_glob_without_matches_produces_no_layers() {
        let dir = TempDir::new().unwrap();
        let source = YamlData::new(
            "none",
            dir.path(),
            PathSpec::Glob("*.yaml".into()),
            dir.path().join("hiera.yaml"),
        );
        assert!(source.layers(&ctx()).unwrap().is_empty());
    }

    #[test]
    fn test_data_values_are_interpolated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "common.yaml", "url: \"https://%{environment}.example.com\"");

        let source = YamlData::new(
            "common",
            dir.path(),
            PathSpec::Path("common.yaml".into()),
            dir.path().join("hiera.yaml"),
        );
        let layers = source.layers(&ctx()).unwrap();
        assert_eq!(
            layers[0].data.get("url"),
            Some(&Value::from("https://local.example.com"))
        );
    }

    #[test]
    fn test_missing_path_variable_names_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("hiera.yaml");
        let source = YamlData::new(
            "node",
            dir.path(),
            PathSpec::Path("nodes/%{hostname}.yaml".into()),
            &config,
        );

        let err = source.layers(&ctx()).unwrap_err();
        match err {
            ConfigError::Interpolation { path, .. } => assert_eq!(path, config),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
