//! Generic data model shared by data files, context variables and merge results.
//!
//! YAML text is parsed by `serde_yaml` and converted into [`Value`], which
//! restricts mapping keys to strings and keeps their insertion order.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Ordered string-keyed mapping.
///
/// Equality ignores key order, so two mappings with the same entries compare
/// equal regardless of how they were built.
pub type Mapping = IndexMap<String, Value>;

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl Value {
    /// Converts a parsed YAML value.
    ///
    /// Scalar keys are stringified the way they are spelled in JSON output;
    /// sequence or mapping keys are rejected. Tags are dropped.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(seq) => Value::Sequence(
                seq.into_iter()
                    .map(Value::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(yaml_key(key)?, Value::from_yaml(value)?);
                }
                Value::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => Value::from_yaml(tagged.value)?,
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "list",
            Value::Mapping(_) => "hash",
        }
    }

    /// String form of a scalar, or `None` for sequences and mappings.
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, serde_yaml::Error> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => Err(
            <serde_yaml::Error as serde::de::Error>::custom("mapping keys must be scalars"),
        ),
    }
}

/// Parses YAML text into a [`Value`]. An empty document yields [`Value::Null`].
///
/// `<<` merge keys are expanded before conversion.
pub fn decode_yaml(text: &str) -> Result<Value, serde_yaml::Error> {
    let mut raw: serde_yaml::Value = serde_yaml::from_str(text)?;
    raw.apply_merge()?;
    Value::from_yaml(raw)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(seq) => {
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for item in seq {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            Value::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(seq: Vec<Value>) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_nested_document() {
        let value = decode_yaml("name: app\nport: 8080\nratio: 0.5\ntags: [a, b]\ndb:\n  host: localhost\n").unwrap();
        let map = value.as_mapping().unwrap();

        assert_eq!(map["name"], Value::from("app"));
        assert_eq!(map["port"], Value::Integer(8080));
        assert_eq!(map["ratio"], Value::Float(0.5));
        assert_eq!(
            map["tags"],
            Value::Sequence(vec![Value::from("a"), Value::from("b")])
        );
        assert_eq!(map["db"].as_mapping().unwrap()["host"], Value::from("localhost"));
    }

    #[test]
    fn test_decode_empty_document_is_null() {
        assert_eq!(decode_yaml("").unwrap(), Value::Null);
        assert_eq!(decode_yaml("# only a comment\n").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_preserves_key_order() {
        let value = decode_yaml("b: 1\na: 2\nc: 3\n").unwrap();
        let keys: Vec<&str> = value.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_scalar_keys_are_stringified() {
        let value = decode_yaml("1: one\ntrue: yes\n").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map["1"], Value::from("one"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_complex_keys_are_rejected() {
        assert!(decode_yaml("? [a, b]\n: value\n").is_err());
    }

    #[test]
    fn test_merge_keys_are_expanded() {
        let value = decode_yaml("base: &b {x: 1, y: 0}\ndb:\n  <<: *b\n  y: 2\n").unwrap();
        let db = value.as_mapping().unwrap()["db"].as_mapping().unwrap();

        assert!(!db.contains_key("<<"));
        assert_eq!(db["x"], Value::Integer(1));
        assert_eq!(db["y"], Value::Integer(2));
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_invalid_merge_key_is_error() {
        assert!(decode_yaml("db:\n  <<: 1\n").is_err());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(decode_yaml("key: [unclosed\n").is_err());
    }

    #[test]
    fn test_serialize_to_json_keeps_order() {
        let value = decode_yaml("z: 1\na: [true, null]\n").unwrap();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"z":1,"a":[true,null]}"#);
    }

    #[test]
    fn test_mapping_equality_ignores_order() {
        assert_eq!(decode_yaml("a: 1\nb: 2").unwrap(), decode_yaml("b: 2\na: 1").unwrap());
    }
}
