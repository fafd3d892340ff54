//! Document identifier: an object id or an opaque string.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ObjectId;
use crate::document::{Document, Value};
use crate::error::{Error, InvalidInputError};

/// Identifier of a stored document.
///
/// A string that decodes to a twelve byte object id is always treated as an
/// id; any other string is opaque (a slug or caller-chosen key).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Object(ObjectId),
    Str(String),
}

impl DocumentId {
    /// Classify a raw identifier string.
    pub fn parse(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        match ObjectId::parse_str(s) {
            Ok(oid) => Self::Object(oid),
            Err(_) => Self::Str(s.to_string()),
        }
    }

    /// Read the `_id` of a document.
    ///
    /// # Errors
    ///
    /// Fails when `_id` is missing or is neither an object id nor a string.
    pub fn from_document(doc: &Document) -> Result<Self, Error> {
        match doc.get("_id") {
            Some(Value::ObjectId(oid)) => Ok(Self::Object(*oid)),
            Some(Value::String(s)) => Ok(Self::Str(s.clone())),
            Some(other) => Err(InvalidInputError::UnsupportedIdType {
                actual: other.type_name().to_string(),
            }
            .into()),
            None => Err(InvalidInputError::MissingId.into()),
        }
    }

    pub fn is_object_id(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Object(oid) => Some(oid),
            Self::Str(_) => None,
        }
    }

    /// The `_id` value as stored.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Object(oid) => Value::ObjectId(*oid),
            Self::Str(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(oid) => write!(f, "{oid}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<ObjectId> for DocumentId {
    fn from(oid: ObjectId) -> Self {
        Self::Object(oid)
    }
}
