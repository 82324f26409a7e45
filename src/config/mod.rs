//! Hierarchy parsing, layer loading and merged lookups.

mod data;
mod error;
mod file;
mod glob;
mod hiera;
mod hierarchy;
mod interpolate;
mod merge;
mod settings;
mod source;

pub use data::{HieraData, LOOKUP_OPTIONS_KEY};
pub use error::ConfigError;
pub use file::{load_data_file, YamlData};
pub use hiera::{resolve, Hiera};
pub use hierarchy::{
    parse as parse_hierarchy, Backend, Defaults, HieraConfig, HierarchyEntry,
    DEFAULT_DATADIR, DEFAULT_DATA_HASH, HIERA_CONFIG_VERSION,
};
pub use interpolate::{interpolate, interpolate_value, InterpolationError};
pub use merge::{merge_deep, MergeStrategy, MergeTypeError};
pub use settings::load_settings;
pub use source::{DataSource, Layer, LayerOrigin, PathSpec};
