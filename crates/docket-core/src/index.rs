//! Index definitions.

use serde::{Deserialize, Serialize};

use crate::document::{Document, Value};
use crate::error::{Error, InvalidInputError};

/// How a single key is indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Ascending,
    Descending,
    Hashed,
    Text,
}

impl IndexKind {
    /// Store-level marker: `1`, `-1`, `"hashed"` or `"text"`.
    pub fn to_value(self) -> Value {
        match self {
            Self::Ascending => Value::Int(1),
            Self::Descending => Value::Int(-1),
            Self::Hashed => Value::from("hashed"),
            Self::Text => Value::from("text"),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(1) => Some(Self::Ascending),
            Value::Int(-1) => Some(Self::Descending),
            Value::String(s) if s == "hashed" => Some(Self::Hashed),
            Value::String(s) if s == "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Parse the CLI/config spelling: `1`, `-1`, `asc`, `desc`, `hashed`, `text`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" | "asc" => Some(Self::Ascending),
            "-1" | "desc" => Some(Self::Descending),
            "hashed" => Some(Self::Hashed),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Language settings attached to every index created by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    /// Language used for text indexes.
    pub default_language: String,
    /// Document field that overrides the language per document.
    pub language_override: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            default_language: "english".to_string(),
            language_override: "custom_language".to_string(),
        }
    }
}

/// A named index definition.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexModel {
    name: String,
    keys: Vec<(String, IndexKind)>,
    options: IndexOptions,
}

impl IndexModel {
    /// Build a definition.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, no keys, or a repeated key.
    pub fn new(name: impl Into<String>, keys: Vec<(String, IndexKind)>) -> Result<Self, Error> {
        let name = name.into();
        let invalid = |reason: &str| InvalidInputError::Index {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("name cannot be empty").into());
        }
        if keys.is_empty() {
            return Err(invalid("at least one key is required").into());
        }
        for (i, (field, _)) in keys.iter().enumerate() {
            if field.trim().is_empty() {
                return Err(invalid("key field cannot be empty").into());
            }
            if keys[..i].iter().any(|(f, _)| f == field) {
                return Err(invalid(&format!("key '{field}' is repeated")).into());
            }
        }

        Ok(Self {
            name,
            keys,
            options: IndexOptions::default(),
        })
    }

    pub fn with_options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[(String, IndexKind)] {
        &self.keys
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Listing shape: `{name, key: {field: marker}, default_language,
    /// language_override}`.
    ///
    /// Key order is not preserved by [`Document`]; the `key_order` array
    /// records it.
    pub fn to_document(&self) -> Document {
        let key: Document = self
            .keys
            .iter()
            .map(|(field, kind)| (field.clone(), kind.to_value()))
            .collect();
        let order: Vec<Value> = self
            .keys
            .iter()
            .map(|(field, _)| Value::from(field.as_str()))
            .collect();

        let mut doc = Document::new();
        doc.insert("name", self.name.as_str());
        doc.insert("key", key);
        doc.insert("key_order", order);
        doc.insert("default_language", self.options.default_language.as_str());
        doc.insert("language_override", self.options.language_override.as_str());
        doc
    }

    /// Inverse of [`IndexModel::to_document`].
    pub fn from_document(doc: &Document) -> Result<Self, Error> {
        let name = doc.get_str("name").to_string();
        let key = doc.get_object("key");

        let mut ordered: Vec<String> = doc
            .get_array("key_order")
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .filter(|f| key.contains_key(f))
            .collect();
        for field in key.keys() {
            if !ordered.iter().any(|f| f == field) {
                ordered.push(field.to_string());
            }
        }

        let mut keys = Vec::with_capacity(ordered.len());
        for field in ordered {
            let kind = key.get(&field).and_then(IndexKind::from_value).ok_or_else(|| {
                InvalidInputError::Index {
                    name: name.clone(),
                    reason: format!("unsupported key marker for '{field}'"),
                }
            })?;
            keys.push((field, kind));
        }

        let mut options = IndexOptions::default();
        if doc.contains_key("default_language") {
            options.default_language = doc.get_str("default_language").to_string();
        }
        if doc.contains_key("language_override") {
            options.language_override = doc.get_str("language_override").to_string();
        }

        Ok(Self::new(name, keys)?.with_options(options))
    }
}
