//! Typed field access with zero-value fallback.
//!
//! None of these accessors fail. A missing key or a value of the wrong kind
//! yields the documented zero value and a `trace` diagnostic.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use super::{Document, Value};

/// Hours in the far-past sentinel returned by [`Document::get_datetime_from_str`].
const SENTINEL_HOURS: i64 = 50 * 8760;

impl Document {
    /// String value, or `""`.
    pub fn get_str(&self, key: &str) -> &str {
        match self.get(key) {
            Some(Value::String(s)) => s,
            other => {
                mismatch(key, "string", other);
                ""
            }
        }
    }

    /// Bool value, or `false`.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            other => {
                mismatch(key, "bool", other);
                false
            }
        }
    }

    /// Integer value of any width, or `0`. Floats are not coerced.
    pub fn get_int(&self, key: &str) -> i64 {
        match self.get(key) {
            Some(Value::Int(n)) => *n,
            other => {
                mismatch(key, "int", other);
                0
            }
        }
    }

    /// Float value of either precision, or `0.0`. Integers are not coerced.
    pub fn get_float(&self, key: &str) -> f64 {
        match self.get(key) {
            Some(Value::Float(f)) => *f,
            other => {
                mismatch(key, "float", other);
                0.0
            }
        }
    }

    /// Nested document, or an empty one.
    pub fn get_object(&self, key: &str) -> Document {
        match self.get(key) {
            Some(Value::Document(doc)) => doc.clone(),
            other => {
                mismatch(key, "document", other);
                Document::new()
            }
        }
    }

    /// Array elements, or an empty vector.
    pub fn get_array(&self, key: &str) -> Vec<Value> {
        match self.get(key) {
            Some(Value::Array(arr)) => arr.clone(),
            other => {
                mismatch(key, "array", other);
                Vec::new()
            }
        }
    }

    /// Stored timestamp, or one second before now.
    pub fn get_datetime(&self, key: &str) -> DateTime<Utc> {
        match self.get(key) {
            Some(Value::DateTime(dt)) => *dt,
            other => {
                mismatch(key, "datetime", other);
                Utc::now() - Duration::seconds(1)
            }
        }
    }

    /// Parse an RFC 3339 string field.
    ///
    /// Returns a sentinel fifty years before now when the key is missing,
    /// not a string, or not parseable, so callers can tell it from real
    /// dates.
    pub fn get_datetime_from_str(&self, key: &str) -> DateTime<Utc> {
        let sentinel = || Utc::now() - Duration::hours(SENTINEL_HOURS);

        let Some(Value::String(s)) = self.get(key) else {
            mismatch(key, "string", self.get(key));
            return sentinel();
        };

        match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(e) => {
                trace!(key, error = %e, "could not parse date string");
                sentinel()
            }
        }
    }

    /// The sub-document holding the listed keys that are present.
    ///
    /// `fields` is comma separated; whitespace around names is ignored and
    /// unknown names are skipped.
    pub fn get_fields(&self, fields: &str) -> Document {
        fields
            .split(',')
            .map(str::trim)
            .filter_map(|field| self.get(field).map(|v| (field, v.clone())))
            .collect()
    }
}

fn mismatch(key: &str, expected: &str, found: Option<&Value>) {
    match found {
        Some(value) => trace!(
            key,
            expected,
            actual = value.type_name(),
            "field present with a different type"
        ),
        None => trace!(key, expected, "field not present"),
    }
}
