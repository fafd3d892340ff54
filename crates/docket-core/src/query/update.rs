//! Update descriptors for find-and-modify calls.

use serde_json::{Map, Value as JsonValue};

use crate::document::{Document, Value};

/// A set of field updates applied atomically to one document.
///
/// Paths may be dotted (`title.en`).
///
/// # Example
///
/// ```
/// use docket_core::Update;
/// use serde_json::json;
///
/// let update = Update::new().set("title.en", "New").inc("plays", 1).unset("draft");
/// assert_eq!(
///     update.to_json(),
///     json!({"$set": {"title.en": "New"}, "$inc": {"plays": 1}, "$unset": {"draft": ""}})
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Update {
    set: Vec<(String, Value)>,
    unset: Vec<String>,
    inc: Vec<(String, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// `$set` every top-level field of `doc`.
    pub fn set_document(doc: Document) -> Self {
        Self {
            set: doc.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((path.into(), value.into()));
        self
    }

    pub fn unset(mut self, path: impl Into<String>) -> Self {
        self.unset.push(path.into());
        self
    }

    /// Add a number to a numeric field (missing fields count as zero).
    pub fn inc(mut self, path: impl Into<String>, by: impl Into<Value>) -> Self {
        self.inc.push((path.into(), by.into()));
        self
    }

    pub fn sets(&self) -> &[(String, Value)] {
        &self.set
    }

    pub fn unsets(&self) -> &[String] {
        &self.unset
    }

    pub fn incs(&self) -> &[(String, Value)] {
        &self.inc
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty() && self.inc.is_empty()
    }

    /// Store-level update document.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        if !self.set.is_empty() {
            map.insert("$set".to_string(), pairs_json(&self.set));
        }
        if !self.inc.is_empty() {
            map.insert("$inc".to_string(), pairs_json(&self.inc));
        }
        if !self.unset.is_empty() {
            let unset: Map<String, JsonValue> = self
                .unset
                .iter()
                .map(|p| (p.clone(), JsonValue::String(String::new())))
                .collect();
            map.insert("$unset".to_string(), JsonValue::Object(unset));
        }
        JsonValue::Object(map)
    }
}

fn pairs_json(pairs: &[(String, Value)]) -> JsonValue {
    JsonValue::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}
