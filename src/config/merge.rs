//! Lookup strategies over an ordered layer sequence.
//!
//! Layers are passed most specific first. `first` stops at the first layer
//! holding the key; `hash`, `unique` and `deep` consume every layer. All
//! strategies return `Ok(None)` when no layer holds the key.
//!
//! Results are built from clones, the layers themselves are never modified.

use std::fmt;

use thiserror::Error;

use crate::value::{Mapping, Value};

/// How values found in several layers are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Value from the most specific layer.
    #[default]
    First,
    /// Top-level union of mappings, most specific key wins.
    Hash,
    /// De-duplicated concatenation of sequences and scalars.
    Unique,
    /// Recursive union of mappings, sequences concatenated without duplicates.
    Deep,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 4] = [
        MergeStrategy::First,
        MergeStrategy::Hash,
        MergeStrategy::Unique,
        MergeStrategy::Deep,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::First => "first",
            MergeStrategy::Hash => "hash",
            MergeStrategy::Unique => "unique",
            MergeStrategy::Deep => "deep",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A layer value has a shape the strategy cannot merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("all '{strategy}' merged matching values {requirement}")]
pub struct MergeTypeError {
    pub strategy: MergeStrategy,
    pub requirement: &'static str,
}

impl MergeTypeError {
    fn must_be_hash(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            requirement: "must be a hash",
        }
    }

    fn must_not_be_hash(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            requirement: "must not be a hash",
        }
    }
}

/// Looks up `key` across `layers` with the given strategy.
pub fn lookup<'a, I>(
    strategy: MergeStrategy,
    layers: I,
    key: &str,
) -> Result<Option<Value>, MergeTypeError>
where
    I: IntoIterator<Item = &'a Mapping>,
{
    match strategy {
        MergeStrategy::First => Ok(lookup_first(layers, key)),
        MergeStrategy::Hash => lookup_hash(layers, key),
        MergeStrategy::Unique => lookup_unique(layers, key),
        MergeStrategy::Deep => lookup_deep(layers, key),
    }
}

pub fn lookup_first<'a, I>(layers: I, key: &str) -> Option<Value>
where
    I: IntoIterator<Item = &'a Mapping>,
{
    layers.into_iter().find_map(|layer| layer.get(key)).cloned()
}

pub fn lookup_hash<'a, I>(layers: I, key: &str) -> Result<Option<Value>, MergeTypeError>
where
    I: IntoIterator<Item = &'a Mapping>,
{
    let found = collect(layers, key);
    if found.is_empty() {
        return Ok(None);
    }

    let mut merged = Mapping::new();
    for value in found.into_iter().rev() {
        let Value::Mapping(map) = value else {
            return Err(MergeTypeError::must_be_hash(MergeStrategy::Hash));
        };
        for (k, v) in map {
            merged.insert(k.clone(), v.clone());
        }
    }
    Ok(Some(Value::Mapping(merged)))
}

pub fn lookup_unique<'a, I>(layers: I, key: &str) -> Result<Option<Value>, MergeTypeError>
where
    I: IntoIterator<Item = &'a Mapping>,
{
    let found = collect(layers, key);
    if found.is_empty() {
        return Ok(None);
    }

    let mut merged: Vec<Value> = Vec::new();
    for value in found {
        match value {
            Value::Mapping(_) => {
                return Err(MergeTypeError::must_not_be_hash(MergeStrategy::Unique));
            }
            Value::Sequence(seq) => extend_novel(&mut merged, seq.iter().cloned()),
            scalar => {
                if !merged.contains(scalar) {
                    merged.push(scalar.clone());
                }
            }
        }
    }
    Ok(Some(Value::Sequence(merged)))
}

pub fn lookup_deep<'a, I>(layers: I, key: &str) -> Result<Option<Value>, MergeTypeError>
where
    I: IntoIterator<Item = &'a Mapping>,
{
    let found = collect(layers, key);
    if found.is_empty() {
        return Ok(None);
    }

    let mut merged: Option<Value> = None;
    for value in found.into_iter().rev() {
        if !matches!(value, Value::Mapping(_)) {
            return Err(MergeTypeError::must_be_hash(MergeStrategy::Deep));
        }
        merged = Some(match merged {
            None => value.clone(),
            Some(acc) => merge_deep(acc, value.clone()),
        });
    }
    Ok(merged)
}

/// Structurally merges `right` into `left`, `right` winning conflicts.
///
/// Mappings merge key by key, keeping `left`'s key order and appending keys
/// only `right` has. Sequences keep `left`'s elements and append the
/// elements of `right` not already present. Any other pairing yields `right`.
pub fn merge_deep(left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Mapping(mut left), Value::Mapping(right)) => {
            for (key, rval) in right {
                match left.get_mut(&key) {
                    Some(lval) => {
                        let taken = std::mem::take(lval);
                        *lval = merge_deep(taken, rval);
                    }
                    None => {
                        left.insert(key, rval);
                    }
                }
            }
            Value::Mapping(left)
        }
        (Value::Sequence(mut left), Value::Sequence(right)) => {
            extend_novel(&mut left, right);
            Value::Sequence(left)
        }
        (_, right) => right,
    }
}

fn collect<'a, I>(layers: I, key: &str) -> Vec<&'a Value>
where
    I: IntoIterator<Item = &'a Mapping>,
{
    layers.into_iter().filter_map(|layer| layer.get(key)).collect()
}

/// Appends the items not already in `seq`. Only `seq` as it was before the
/// call is checked, so repeats inside `items` are kept.
fn extend_novel(seq: &mut Vec<Value>, items: impl IntoIterator<Item = Value>) {
    let novel: Vec<Value> = items.into_iter().filter(|item| !seq.contains(item)).collect();
    seq.extend(novel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::decode_yaml;

    fn layers(docs: &[&str]) -> Vec<Mapping> {
        docs.iter()
            .map(|doc| match decode_yaml(doc).unwrap() {
                Value::Mapping(map) => map,
                Value::Null => Mapping::new(),
                other => panic!("layer must be a mapping, got {other:?}"),
            })
            .collect()
    }

    fn yaml(doc: &str) -> Value {
        decode_yaml(doc).unwrap()
    }

    #[test]
    fn test_first_returns_most_specific() {
        let layers = layers(&["k: 1", "k: 2"]);
        assert_eq!(lookup_first(&layers, "k"), Some(Value::Integer(1)));
    }

    #[test]
    fn test_first_skips_layers_without_key() {
        let layers = layers(&["other: 0", "", "k: 2"]);
        assert_eq!(lookup_first(&layers, "k"), Some(Value::Integer(2)));
    }

    #[test]
    fn test_first_null_counts_as_present() {
        let layers = layers(&["k: null", "k: 2"]);
        assert_eq!(lookup_first(&layers, "k"), Some(Value::Null));
    }

    #[test]
    fn test_hash_is_shallow() {
        let layers = layers(&["k: {a: 1}", "k: {a: 2, b: 2}"]);
        assert_eq!(lookup_hash(&layers, "k").unwrap(), Some(yaml("{a: 1, b: 2}")));

        let nested = layers_nested();
        // nested mappings are replaced, not merged
        assert_eq!(
            lookup_hash(&nested, "k").unwrap(),
            Some(yaml("{a: {x: 1}}"))
        );
    }

    fn layers_nested() -> Vec<Mapping> {
        layers(&["k: {a: {x: 1}}", "k: {a: {y: 2}}"])
    }

    #[test]
    fn test_hash_rejects_non_mapping() {
        let layers = layers(&["k: {a: 1}", "k: [1]"]);
        let err = lookup_hash(&layers, "k").unwrap_err();
        assert_eq!(err.strategy, MergeStrategy::Hash);
        assert_eq!(err.to_string(), "all 'hash' merged matching values must be a hash");
    }

    #[test]
    fn test_unique_concatenates_without_duplicates() {
        let layers = layers(&["k: [1, 2]", "k: [2, 3]"]);
        assert_eq!(lookup_unique(&layers, "k").unwrap(), Some(yaml("[1, 2, 3]")));
    }

    #[test]
    fn test_unique_accepts_scalars() {
        let layers = layers(&["k: a", "k: [b, a]", "k: c"]);
        assert_eq!(lookup_unique(&layers, "k").unwrap(), Some(yaml("[a, b, c]")));
    }

    #[test]
    fn test_unique_keeps_repeats_within_one_layer() {
        let single = layers(&["k: [1, 1, 2]"]);
        assert_eq!(lookup_unique(&single, "k").unwrap(), Some(yaml("[1, 1, 2]")));

        let stacked = layers(&["k: [0]", "k: [1, 1, 0]"]);
        assert_eq!(lookup_unique(&stacked, "k").unwrap(), Some(yaml("[0, 1, 1]")));
    }

    #[test]
    fn test_unique_compares_structurally() {
        let layers = layers(&["k: [[1, 2]]", "k: [[1, 2], [3]]"]);
        assert_eq!(
            lookup_unique(&layers, "k").unwrap(),
            Some(yaml("[[1, 2], [3]]"))
        );
    }

    #[test]
    fn test_unique_rejects_mapping() {
        let layers = layers(&["k: [1]", "k: {a: 1}"]);
        let err = lookup_unique(&layers, "k").unwrap_err();
        assert_eq!(err.requirement, "must not be a hash");
    }

    #[test]
    fn test_deep_merges_recursively() {
        let layers = layers_nested();
        assert_eq!(
            lookup_deep(&layers, "k").unwrap(),
            Some(yaml("{a: {x: 1, y: 2}}"))
        );
    }

    #[test]
    fn test_deep_most_specific_wins_at_every_level() {
        let layers = layers(&[
            "k: {db: {host: prod, port: 5432}}",
            "k: {db: {host: localhost, user: app}, debug: true}",
        ]);
        assert_eq!(
            lookup_deep(&layers, "k").unwrap(),
            Some(yaml("{db: {host: prod, user: app, port: 5432}, debug: true}"))
        );
    }

    #[test]
    fn test_deep_sequences_appended_after_less_specific() {
        let layers = layers(&["k: {list: [b, c]}", "k: {list: [a, b]}"]);
        assert_eq!(
            lookup_deep(&layers, "k").unwrap(),
            Some(yaml("{list: [a, b, c]}"))
        );
    }

    #[test]
    fn test_deep_rejects_non_mapping() {
        let layers = layers(&["k: 1", "k: {a: 1}"]);
        let err = lookup_deep(&layers, "k").unwrap_err();
        assert_eq!(err.strategy, MergeStrategy::Deep);
        assert_eq!(err.requirement, "must be a hash");
    }

    #[test]
    fn test_missing_key_for_every_strategy() {
        let layers = layers(&["a: 1", "b: {c: 2}"]);
        for strategy in MergeStrategy::ALL {
            assert_eq!(lookup(strategy, &layers, "missing").unwrap(), None);
        }
    }

    #[test]
    fn test_layers_are_not_modified() {
        let layers = layers(&["k: {list: [1]}", "k: {list: [2]}"]);
        let before = layers.clone();
        lookup_deep(&layers, "k").unwrap();
        lookup_hash(&layers, "k").unwrap();
        assert_eq!(layers, before);
    }

    #[test]
    fn test_merge_deep_sequence_checks_only_left() {
        assert_eq!(merge_deep(yaml("[1]"), yaml("[2, 2, 1]")), yaml("[1, 2, 2]"));
    }

    #[test]
    fn test_merge_deep_type_conflict_right_wins() {
        assert_eq!(merge_deep(yaml("{a: 1}"), yaml("[1]")), yaml("[1]"));
        assert_eq!(merge_deep(yaml("[1]"), yaml("x")), yaml("x"));
        assert_eq!(
            merge_deep(yaml("{a: {b: 1}}"), yaml("{a: 2}")),
            yaml("{a: 2}")
        );
    }

    #[test]
    fn test_merge_deep_keeps_left_key_order() {
        let merged = merge_deep(yaml("{b: 1, a: 1}"), yaml("{c: 2, a: 2}"));
        let keys: Vec<&str> = merged
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_strategy_names() {
        for strategy in MergeStrategy::ALL {
            assert_eq!(MergeStrategy::from_name(strategy.as_str()), Some(strategy));
        }
        assert_eq!(MergeStrategy::from_name("deeper"), None);
        assert_eq!(MergeStrategy::default(), MergeStrategy::First);
    }
}
