//! Store-native object id.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, InvalidInputError};

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A twelve byte object id, written as 24 hex characters.
///
/// Layout: 4 byte big-endian seconds since the epoch, 5 random bytes, and a
/// 3 byte counter.
///
/// # Example
///
/// ```
/// use docket_core::ObjectId;
///
/// let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
/// assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
/// assert!(!ObjectId::is_valid("not-an-id"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh object id.
    pub fn new() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let random = Uuid::new_v4();
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&random.as_bytes()[..5]);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }

    /// Build an object id from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parse a 24 character hex string.
    ///
    /// # Errors
    ///
    /// Returns an error unless the string decodes to exactly 12 bytes.
    pub fn parse_str(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let invalid = |reason: &str| InvalidInputError::ObjectId {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if s.len() != 24 {
            return Err(invalid("must be 24 hex characters").into());
        }

        let mut bytes = [0u8; 12];
        for (i, pair) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_digit(pair[0]).ok_or_else(|| invalid("contains a non-hex character"))?;
            let lo = hex_digit(pair[1]).ok_or_else(|| invalid("contains a non-hex character"))?;
            bytes[i] = (hi << 4) | lo;
        }

        Ok(Self(bytes))
    }

    /// Returns true if the string is a valid object id.
    pub fn is_valid(s: &str) -> bool {
        Self::parse_str(s).is_ok()
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut out = String::with_capacity(24);
        for b in self.0 {
            out.push(DIGITS[(b >> 4) as usize] as char);
            out.push(DIGITS[(b & 0x0f) as usize] as char);
        }
        out
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// The creation time encoded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(secs), 0)
            .single()
            .unwrap_or_default()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse_str(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_object_id() {
        assert!(ObjectId::is_valid("507f1f77bcf86cd799439011"));
        assert!(ObjectId::is_valid("507F1F77BCF86CD799439011"));
    }

    #[test]
    fn invalid_object_ids() {
        assert!(!ObjectId::is_valid("not-an-id"));
        assert!(!ObjectId::is_valid(""));
        assert!(!ObjectId::is_valid("507f1f77bcf86cd79943901"));
        assert!(!ObjectId::is_valid("507f1f77bcf86cd7994390111"));
        assert!(!ObjectId::is_valid("507f1f77bcf86cd79943901g"));
    }

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::new();
        let parsed = ObjectId::parse_str(id.to_hex()).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(id.to_string().len(), 24);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn timestamp_is_recent() {
        let id = ObjectId::new();
        let age = Utc::now() - id.timestamp();
        assert!(age.num_seconds() < 5);
    }

    #[test]
    fn serde_as_hex_string() {
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"507f1f77bcf86cd799439011\"");

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ObjectId>("\"slug\"").is_err());
    }
}
