//! Configuration tree data model.
//!
//! [`ConfigValue`] is the tagged variant the walker matches on: a nested
//! table is descended, a string is checked for a marker, anything else is
//! left alone. [`Settings`] is the interface to whatever holds the loaded
//! configuration; [`ConfigTree`] is the in-crate implementation.

use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Separator between keys in a key path.
pub const KEY_PATH_SEPARATOR: &str = ".";

/// A single configuration value.
///
/// Serializes untagged, so `Bytes` is written as an array of numbers and
/// reads back as a `List` of `Integer`. Resolved bytes are meant to be
/// consumed in memory, not persisted through JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Nested mapping
    Table(BTreeMap<String, ConfigValue>),
    /// String leaf, possibly a secret reference
    String(String),
    /// Raw bytes, produced by binary resolution
    Bytes(Vec<u8>),
    Integer(i64),
    /// Unsigned integer above `i64::MAX`
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Sequence; never descended by the walker
    List(Vec<ConfigValue>),
    Null,
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Short type name, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Integer(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Null => "null",
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Table(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<u8>> for ConfigValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

/// Read/write access to a loaded configuration.
///
/// Implement this for the configuration store your application already uses
/// to let the resolver walk it.
pub trait Settings {
    /// Returns the full tree as nested tables.
    fn all_settings(&self) -> BTreeMap<String, ConfigValue>;

    /// Writes a single value at a dotted key path, creating intermediate
    /// tables as needed and leaving all other entries untouched.
    fn set(&mut self, key_path: &str, value: ConfigValue);

    /// Writes a single value at a path given as separate keys.
    ///
    /// Keys may themselves contain `.`. The default joins them and calls
    /// [`set`](Self::set), which is only exact when none do; stores that can
    /// address keys individually should override it.
    fn set_path(&mut self, path: &[&str], value: ConfigValue) {
        self.set(&path.join(KEY_PATH_SEPARATOR), value)
    }
}

/// In-memory configuration tree keyed by dotted paths.
///
/// # Example
///
/// ```
/// use secretfig::{ConfigTree, ConfigValue, Settings};
///
/// let mut tree = ConfigTree::new();
/// tree.set("database.primary.password", "sm://prod/db".into());
///
/// assert_eq!(
///     tree.get("database.primary.password"),
///     Some(&ConfigValue::String("sm://prod/db".to_string()))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: BTreeMap<String, ConfigValue>,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object into a tree.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up the value at a dotted key path.
    pub fn get(&self, key_path: &str) -> Option<&ConfigValue> {
        let mut parts = key_path.split(KEY_PATH_SEPARATOR);
        let mut current = self.root.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    /// Looks up the value at a path given as separate keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.get(*first)?;
        for part in rest {
            current = current.as_table()?.get(*part)?;
        }
        Some(current)
    }

    /// Top-level entries.
    pub fn root(&self) -> &BTreeMap<String, ConfigValue> {
        &self.root
    }

    pub fn into_inner(self) -> BTreeMap<String, ConfigValue> {
        self.root
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigTree {
    fn from(root: BTreeMap<String, ConfigValue>) -> Self {
        Self { root }
    }
}

impl Settings for ConfigTree {
    fn all_settings(&self) -> BTreeMap<String, ConfigValue> {
        self.root.clone()
    }

    fn set(&mut self, key_path: &str, value: ConfigValue) {
        let path: Vec<&str> = key_path.split(KEY_PATH_SEPARATOR).collect();
        self.set_path(&path, value);
    }

    fn set_path(&mut self, path: &[&str], value: ConfigValue) {
        let Some((leaf, parents)) = path.split_last() else {
            return;
        };

        let mut table = &mut self.root;
        for part in parents {
            let entry = table
                .entry(part.to_string())
                .or_insert_with(|| ConfigValue::Table(BTreeMap::new()));
            if !matches!(entry, ConfigValue::Table(_)) {
                *entry = ConfigValue::Table(BTreeMap::new());
            }
            table = match entry {
                ConfigValue::Table(t) => t,
                _ => unreachable!("entry was just replaced with a table"),
            };
        }

        table.insert(leaf.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let tree = ConfigTree::from_json_str(
            r#"{"foo": {"bar": "sm://x", "n": 3, "f": 1.5, "on": true, "l": ["a"], "z": null}}"#,
        )
        .unwrap();

        assert_eq!(tree.get("foo.bar"), Some(&ConfigValue::String("sm://x".to_string())));
        assert_eq!(tree.get("foo.n"), Some(&ConfigValue::Integer(3)));
        assert_eq!(tree.get("foo.f"), Some(&ConfigValue::Float(1.5)));
        assert_eq!(tree.get("foo.on"), Some(&ConfigValue::Bool(true)));
        assert_eq!(
            tree.get("foo.l"),
            Some(&ConfigValue::List(vec![ConfigValue::String("a".to_string())]))
        );
        assert_eq!(tree.get("foo.z"), Some(&ConfigValue::Null));
        assert_eq!(tree.get("foo.missing"), None);
        assert_eq!(tree.get("foo.bar.deeper"), None);
    }

    #[test]
    fn test_set_preserves_siblings() {
        let mut tree = ConfigTree::from_json_str(r#"{"a": {"b": "x", "c": "y"}, "d": 1}"#).unwrap();

        tree.set("a.b", ConfigValue::Bytes(b"baz".to_vec()));

        assert_eq!(tree.get("a.b"), Some(&ConfigValue::Bytes(b"baz".to_vec())));
        assert_eq!(tree.get("a.c"), Some(&ConfigValue::String("y".to_string())));
        assert_eq!(tree.get("d"), Some(&ConfigValue::Integer(1)));
    }

    #[test]
    fn test_set_creates_and_replaces_intermediate_tables() {
        let mut tree = ConfigTree::new();
        tree.set("top", "value".into());
        tree.set("x.y.z", "deep".into());
        assert_eq!(tree.get("x.y.z"), Some(&ConfigValue::String("deep".to_string())));

        tree.set("top.child", "c".into());
        assert_eq!(tree.get("top.child"), Some(&ConfigValue::String("c".to_string())));
    }

    #[test]
    fn test_set_path_keeps_dotted_keys_intact() {
        let mut tree = ConfigTree::from_json_str(r#"{"a": "keep", "a.b": "old"}"#).unwrap();

        tree.set_path(&["a.b"], "new".into());

        assert_eq!(tree.get_path(&["a.b"]), Some(&ConfigValue::String("new".to_string())));
        assert_eq!(tree.get("a"), Some(&ConfigValue::String("keep".to_string())));
        assert_eq!(tree.root().len(), 2);
    }

    #[test]
    fn test_large_unsigned_integers_keep_precision() {
        let tree = ConfigTree::from_json_str(r#"{"big": 18446744073709551615, "neg": -1}"#).unwrap();

        assert_eq!(tree.get("big"), Some(&ConfigValue::UInt(u64::MAX)));
        assert_eq!(tree.get("neg"), Some(&ConfigValue::Integer(-1)));
        assert_eq!(
            serde_json::to_string(&tree).unwrap(),
            r#"{"big":18446744073709551615,"neg":-1}"#
        );
    }

    #[test]
    fn test_bytes_serialize_as_number_array() {
        let mut tree = ConfigTree::new();
        tree.set("k", ConfigValue::Bytes(b"baz".to_vec()));

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"k":[98,97,122]}"#);

        let back = ConfigTree::from_json_str(&json).unwrap();
        assert_eq!(
            back.get("k"),
            Some(&ConfigValue::List(vec![
                ConfigValue::Integer(98),
                ConfigValue::Integer(97),
                ConfigValue::Integer(122),
            ]))
        );
    }

    #[test]
    fn test_serialize_roundtrip_through_json() {
        let tree = ConfigTree::from_json_str(r#"{"a": {"b": "x"}, "n": 2}"#).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"a":{"b":"x"},"n":2}"#);
    }
}
