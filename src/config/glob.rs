//! Glob expansion under a data directory.

use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use super::ConfigError;

/// Returns the files matching `pattern`, relative to `root` unless the
/// pattern is absolute. `*` does not cross directory separators; `**` does.
///
/// Directories are walked depth first, entries sorted by file name, so
/// `a/z.yaml` comes before `a.yaml`. A missing directory yields no matches.
pub fn expand(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let normalized = strip_current_dir(pattern);
    let matcher = GlobBuilder::new(normalized)
        .literal_separator(true)
        .build()
        .map_err(|source| ConfigError::GlobError {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let absolute = Path::new(normalized).is_absolute();
    let walk_root = if absolute {
        literal_prefix(normalized)
    } else {
        root.join(literal_prefix(normalized))
    };
    if !walk_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(&walk_root)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry.map_err(|source| ConfigError::WalkError {
            path: walk_root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let candidate = if absolute {
            entry.path()
        } else {
            match entry.path().strip_prefix(root) {
                Ok(rel_path) => rel_path,
                Err(_) => continue,
            }
        };
        if matcher.is_match(candidate) {
            matches.push(entry.into_path());
        }
    }

    Ok(matches)
}

/// `./env/*.yaml` and `env/*.yaml` name the same files.
fn strip_current_dir(mut pattern: &str) -> &str {
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.trim_start_matches('/');
    }
    pattern
}

/// Leading directories of `pattern` free of glob metacharacters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut components: Vec<&str> = pattern.split('/').collect();
    components.pop();
    let literal: Vec<&str> = components
        .into_iter()
        .take_while(|c| !c.contains(['*', '?', '[', '{', '\\']))
        .collect();
    if pattern.starts_with('/') && literal.len() <= 1 {
        return PathBuf::from("/");
    }
    PathBuf::from(literal.join("/"))
}
