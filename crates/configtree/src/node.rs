//! Configuration tree types

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a configuration value, used for schema checks during merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Integer,
    String,
    List,
    Map,
}

impl Kind {
    /// Lowercase name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::Integer => "integer",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single value in a configuration tree.
///
/// Serializes as plain JSON: `true`, `8`, `"memory"`, `["jpg"]`, `{...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<ConfigValue>),
    Map(ConfigNode),
}

impl ConfigValue {
    pub fn kind(&self) -> Kind {
        match self {
            ConfigValue::Bool(_) => Kind::Bool,
            ConfigValue::Integer(_) => Kind::Integer,
            ConfigValue::String(_) => Kind::String,
            ConfigValue::List(_) => Kind::List,
            ConfigValue::Map(_) => Kind::Map,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigNode> {
        match self {
            ConfigValue::Map(node) => Some(node),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Integer(i64::from(value))
    }
}

impl From<u16> for ConfigValue {
    fn from(value: u16) -> Self {
        ConfigValue::Integer(i64::from(value))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(values: Vec<T>) -> Self {
        ConfigValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<ConfigNode> for ConfigValue {
    fn from(node: ConfigNode) -> Self {
        ConfigValue::Map(node)
    }
}

/// An insertion-ordered map of configuration keys to values.
///
/// Equality is map equality and ignores key order; use [`ConfigNode::keys`]
/// when order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigNode(IndexMap<String, ConfigValue>);

impl ConfigNode {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, keeping the key's position if it already exists.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a direct child map by name.
    pub fn section(&self, name: &str) -> Option<&ConfigNode> {
        self.get(name).and_then(ConfigValue::as_map)
    }

    /// Look up a value by dotted path, e.g. `"storage.engine"`.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get(first)?;
        for segment in segments {
            current = current.as_map()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a value by dotted path, creating intermediate maps as needed.
    ///
    /// Fails if the path is empty or walks through a non-map value.
    pub fn set_path(&mut self, path: &str, value: impl Into<ConfigValue>) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let (leaf, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Err(Error::InvalidPath(path.to_string())),
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            let entry = node
                .0
                .entry((*segment).to_string())
                .or_insert_with(|| ConfigValue::Map(ConfigNode::new()));
            node = match entry {
                ConfigValue::Map(child) => child,
                other => {
                    return Err(Error::PathConflict {
                        path: segments[..=depth].join("."),
                        kind: other.kind(),
                    });
                }
            };
        }

        node.insert(*leaf, value);
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigNode {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
