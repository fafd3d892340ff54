//! Tagged document values.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use super::Document;
use crate::types::ObjectId;

/// A dynamically-typed document value.
///
/// Integer widths collapse into [`Value::Int`] and float widths into
/// [`Value::Float`] at construction, so readers only ever see one
/// representation per kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Document(Document),
    DateTime(DateTime<Utc>),
    ObjectId(ObjectId),
}

impl Value {
    /// Short name of the stored kind, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Document(_) => "document",
            Self::DateTime(_) => "datetime",
            Self::ObjectId(_) => "objectId",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::ObjectId(oid) => Some(oid),
            _ => None,
        }
    }

    /// Normalize a JSON value.
    ///
    /// Recognizes the Extended JSON wrappers `{"$oid": "<hex>"}` and
    /// `{"$date": "<rfc3339>" | <millis>}`.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => from_number(&n),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(arr) => Self::Array(arr.into_iter().map(Self::from_json).collect()),
            JsonValue::Object(map) => match extended(&map) {
                Some(value) => value,
                None => Self::Document(Document::from_json_map(map)),
            },
        }
    }

    /// Render as JSON, using Extended JSON for ids and timestamps.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::Number((*n).into()),
            Self::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Array(arr) => JsonValue::Array(arr.iter().map(Self::to_json).collect()),
            Self::Document(doc) => doc.to_json(),
            Self::DateTime(dt) => {
                let mut map = Map::new();
                map.insert(
                    "$date".to_string(),
                    JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
                JsonValue::Object(map)
            }
            Self::ObjectId(oid) => {
                let mut map = Map::new();
                map.insert("$oid".to_string(), JsonValue::String(oid.to_hex()));
                JsonValue::Object(map)
            }
        }
    }

    /// The current time truncated to millisecond precision, as stored.
    pub fn now() -> Self {
        let millis = Utc::now().timestamp_millis();
        Self::DateTime(Utc.timestamp_millis_opt(millis).single().unwrap_or_default())
    }
}

fn from_number(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        Value::Float(n.as_f64().unwrap_or(0.0))
    }
}

fn extended(map: &Map<String, JsonValue>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }

    if let Some(JsonValue::String(hex)) = map.get("$oid") {
        return ObjectId::parse_str(hex).ok().map(Value::ObjectId);
    }

    match map.get("$date")? {
        JsonValue::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc))),
        JsonValue::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(Value::DateTime),
        _ => None,
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n)
            .map(Value::Int)
            .unwrap_or(Value::Float(n as f64))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::from(n as u64)
    }
}

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
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

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<ObjectId> for Value {
    fn from(oid: ObjectId) -> Self {
        Value::ObjectId(oid)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from_json(json)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(Value::from_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_widths_collapse() {
        assert_eq!(Value::from(7u8), Value::Int(7));
        assert_eq!(Value::from(-7i16), Value::Int(-7));
        assert_eq!(Value::from(7u32), Value::Int(7));
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn float_widths_collapse() {
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
        assert_eq!(Value::from(1.5f64), Value::Float(1.5));
    }

    #[test]
    fn json_numbers() {
        assert_eq!(Value::from_json(json!(3)), Value::Int(3));
        assert_eq!(Value::from_json(json!(3.25)), Value::Float(3.25));
        assert_eq!(Value::from_json(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn extended_object_id() {
        let value = Value::from_json(json!({"$oid": "507f1f77bcf86cd799439011"}));
        assert_eq!(
            value.as_object_id().map(|o| o.to_hex()),
            Some("507f1f77bcf86cd799439011".to_string())
        );
        assert_eq!(value.to_json(), json!({"$oid": "507f1f77bcf86cd799439011"}));
    }

    #[test]
    fn invalid_oid_wrapper_stays_a_document() {
        let value = Value::from_json(json!({"$oid": "nope"}));
        assert!(value.as_document().is_some());
    }

    #[test]
    fn extended_date_forms() {
        let from_str = Value::from_json(json!({"$date": "2024-03-01T10:00:00Z"}));
        let from_millis = Value::from_json(json!({"$date": 1_709_287_200_000i64}));
        assert!(from_str.as_datetime().is_some());
        assert_eq!(from_str, from_millis);
        assert_eq!(
            from_str.to_json(),
            json!({"$date": "2024-03-01T10:00:00.000Z"})
        );
    }

    #[test]
    fn nan_renders_as_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), JsonValue::Null);
    }
}
