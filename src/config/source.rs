use std::fmt;
use std::path::PathBuf;

use super::ConfigError;
use crate::context::Context;
use crate::value::Mapping;

/// Where a layer was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOrigin {
    /// Name of the owning hierarchy entry.
    pub entry: String,
    /// Ordinal of the layer within its entry's expanded paths.
    pub index: usize,
    /// Resolved file location.
    pub path: PathBuf,
}

impl fmt::Display for LayerOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.entry, self.index, self.path.display())
    }
}

/// One loaded, interpolated data file. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub origin: LayerOrigin,
    pub data: Mapping,
}

impl Layer {
    pub fn new(origin: LayerOrigin, data: Mapping) -> Self {
        Self { origin, data }
    }
}

/// A hierarchy entry able to produce its layers, most specific first.
pub trait DataSource: fmt::Debug {
    /// Name of the hierarchy entry.
    fn name(&self) -> &str;

    fn layers(&self, ctx: &Context) -> Result<Vec<Layer>, ConfigError>;
}

/// Which files a hierarchy entry reads. Exactly one mode per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec {
    /// One file, read whether or not it exists.
    Path(String),
    /// Several files, each read whether or not it exists.
    Paths(Vec<String>),
    /// Every file matching one pattern.
    Glob(String),
    /// Every file matching any of several patterns, pattern by pattern.
    Globs(Vec<String>),
}

impl PathSpec {
    pub const KEYS: [&'static str; 4] = ["path", "paths", "glob", "globs"];

    /// The configuration key this mode is declared with.
    pub fn key(&self) -> &'static str {
        match self {
            PathSpec::Path(_) => "path",
            PathSpec::Paths(_) => "paths",
            PathSpec::Glob(_) => "glob",
            PathSpec::Globs(_) => "globs",
        }
    }

    /// Declared paths or patterns, before interpolation.
    pub fn entries(&self) -> &[String] {
        match self {
            PathSpec::Path(one) | PathSpec::Glob(one) => std::slice::from_ref(one),
            PathSpec::Paths(many) | PathSpec::Globs(many) => many,
        }
    }

    pub fn is_glob(&self) -> bool {
        matches!(self, PathSpec::Glob(_) | PathSpec::Globs(_))
    }
}
