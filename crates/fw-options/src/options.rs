//! Ordered option mappings and override parsing.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ResolveError;

/// An ordered `NAME -> VALUE` mapping.
///
/// Insertion order is preserved and becomes the order in which options are
/// emitted to the configure tool. Re-inserting an existing key replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(String, String)>,
}

impl OptionMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Insert or replace a value, returning the previous one.
    ///
    /// A replaced key keeps its original position; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Iterate `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `-DNAME=VALUE` configure arguments.
    pub fn to_define_args(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("-D{}={}", k, v)).collect()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// Serialized as a JSON object in insertion order.
impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// User-supplied option overrides.
///
/// Keys are unique: a repeated key takes the last value but keeps the
/// position of its first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct OverrideSet(OptionMap);

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse whitespace-delimited `NAME=VALUE` tokens.
    ///
    /// Each token must contain exactly one `=` and a non-empty name. Values
    /// may be empty (`-DNAME=` is meaningful to the configure tool).
    pub fn parse(flags: &str) -> Result<Self, ResolveError> {
        let mut set = OverrideSet::new();
        for token in flags.split_whitespace() {
            let (name, value) = parse_token(token)?;
            set.insert(name, value);
        }
        Ok(set)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &OptionMap {
        &self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OverrideSet(iter.into_iter().collect())
    }
}

impl From<OptionMap> for OverrideSet {
    fn from(map: OptionMap) -> Self {
        OverrideSet(map)
    }
}

fn parse_token(token: &str) -> Result<(&str, &str), ResolveError> {
    let malformed = || ResolveError::MalformedOverride {
        token: token.to_string(),
    };
    let (name, value) = token.split_once('=').ok_or_else(malformed)?;
    if name.is_empty() || value.contains('=') {
        return Err(malformed());
    }
    Ok((name, value))
}
