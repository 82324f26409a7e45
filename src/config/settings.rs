use std::path::Path;

use tracing::{info, warn};

use super::hiera::resolve;
use super::ConfigError;
use crate::context::Context;
use crate::value::Mapping;

/// Resolves the first existing config among `candidates`.
///
/// Candidates are tried in order; the first path that exists is resolved and
/// the rest are ignored. When none exists an empty mapping is returned.
pub fn load_settings<I, P>(candidates: I, ctx: &Context) -> Result<Mapping, ConfigError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for candidate in candidates {
        let path = candidate.as_ref();
        if !path.exists() {
            continue;
        }
        info!(config = %path.display(), "loading settings");
        return resolve(path, ctx);
    }

    warn!("no config file found");
    Ok(Mapping::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = TempDir::new().unwrap();
        for name in ["first", "second"] {
            let root = dir.path().join(name);
            fs::create_dir_all(root.join("data")).unwrap();
            fs::write(
                root.join("hiera.yaml"),
                "version: 5\nhierarchy: [{name: common, path: common.yaml}]\n",
            )
            .unwrap();
            fs::write(root.join("data/common.yaml"), format!("source: {name}\n")).unwrap();
        }

        let candidates = [
            dir.path().join("missing/hiera.yaml"),
            dir.path().join("second/hiera.yaml"),
            dir.path().join("first/hiera.yaml"),
        ];
        let settings = load_settings(&candidates, &Context::empty()).unwrap();
        assert_eq!(settings.get("source"), Some(&Value::from("second")));
    }

    #[test]
    fn test_no_candidate_is_empty() {
        let dir = TempDir::new().unwrap();
        let settings =
            load_settings([dir.path().join("hiera.yaml")], &Context::empty()).unwrap();
        assert!(settings.is_empty());
    }

    #[test]
    fn test_invalid_candidate_is_error() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("hiera.yaml");
        fs::write(&config, "version: 3\n").unwrap();

        let result = load_settings([&config], &Context::empty());
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion { .. })));
    }
}
