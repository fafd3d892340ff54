//! The canonical document map.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

use super::Value;
use crate::error::{Error, InvalidInputError};

/// A schema-less key/value record.
///
/// Keys are kept sorted so that rendering is deterministic; field order
/// carries no meaning.
///
/// # Example
///
/// ```
/// use docket_core::Document;
/// use serde_json::json;
///
/// let doc = Document::from_json(json!({"title": {"en": "Hello"}, "plays": 3})).unwrap();
/// assert_eq!(doc.get_int("plays"), 3);
/// assert_eq!(doc.get_path("title.en").and_then(|v| v.as_str()), Some("Hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Normalize a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    pub fn from_json(json: JsonValue) -> Result<Self, Error> {
        match json {
            JsonValue::Object(map) => Ok(Self::from_json_map(map)),
            other => Err(InvalidInputError::Document {
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }
            .into()),
        }
    }

    /// Normalize a JSON object map.
    pub fn from_json_map(map: Map<String, JsonValue>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect(),
        )
    }

    /// Parse a JSON string into a document.
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let json: JsonValue = serde_json::from_str(s).map_err(|e| InvalidInputError::Document {
            reason: e.to_string(),
        })?;
        Self::from_json(json)
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.to_json_map())
    }

    pub fn to_json_map(&self) -> Map<String, JsonValue> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Look up a dotted path such as `title.en`. Numeric segments index arrays.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?;

        for part in parts {
            current = match current {
                Value::Document(doc) => doc.get(part)?,
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Set a dotted path, creating intermediate documents as needed.
    ///
    /// A non-document value in the middle of the path is replaced.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) {
        match path.split_once('.') {
            None => {
                self.insert(path, value);
            }
            Some((head, rest)) => {
                let entry = self
                    .0
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Document(Document::new()));
                if !matches!(entry, Value::Document(_)) {
                    *entry = Value::Document(Document::new());
                }
                if let Value::Document(child) = entry {
                    child.set_path(rest, value);
                }
            }
        }
    }

    /// Remove a dotted path. Returns the removed value.
    pub fn remove_path(&mut self, path: &str) -> Option<Value> {
        match path.split_once('.') {
            None => self.remove(path),
            Some((head, rest)) => match self.0.get_mut(head)? {
                Value::Document(child) => child.remove_path(rest),
                _ => None,
            },
        }
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl From<Map<String, JsonValue>> for Document {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self::from_json_map(map)
    }
}

impl TryFrom<JsonValue> for Document {
    type Error = Error;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json(json)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = JsonValue::deserialize(deserializer)?;
        Document::from_json(json).map_err(serde::de::Error::custom)
    }
}
