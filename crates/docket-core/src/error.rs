//! Error types for docket.
//!
//! A single error type with explicit variants for store failures and input
//! validation. Type mismatches inside documents are not errors: the field
//! accessors degrade to zero values instead.

use thiserror::Error;

/// The unified error type for docket operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors raised by (or on the way to) the document store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Input rejected before it reached the store.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this error is a store timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Store(StoreError::Timeout { .. }))
    }

    /// Returns true if the store found nothing to operate on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(StoreError::NotFound { .. }))
    }
}

/// Store-level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The call did not finish within its deadline.
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: &'static str,
        duration_ms: u64,
    },

    /// No document matched.
    #[error("no document found in '{collection}' for {filter}")]
    NotFound { collection: String, filter: String },

    /// A stored document could not be decoded.
    #[error("error decoding documents: {message}")]
    Decode { message: String },

    /// Underlying I/O failure.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// An index with the same name but a different definition exists.
    #[error("index '{name}' already exists with a different definition")]
    IndexConflict { name: String },

    /// The named index does not exist.
    #[error("index '{name}' not found")]
    IndexNotFound { name: String },

    /// A document with the same `_id` already exists.
    #[error("duplicate key: _id {key} already exists")]
    DuplicateKey { key: String },

    /// A `$text` query ran against a collection without a text index.
    #[error("text index required for $text query on '{collection}'")]
    TextIndexRequired { collection: String },

    /// The cursor was used after being closed.
    #[error("cursor is closed")]
    CursorClosed,

    /// A background worker failed before reporting a result.
    #[error("worker failed: {message}")]
    Worker { message: String },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Store(StoreError::from(err))
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Not a 24 character hex object id.
    #[error("invalid object id '{value}': {reason}")]
    ObjectId { value: String, reason: String },

    /// Projection string had no fields.
    #[error("fields string cannot be empty")]
    EmptyProjection,

    /// Projection mixed `field` and `-field` entries.
    #[error("mix of inclusion and exclusion fields is not allowed (at '{field}')")]
    MixedProjection { field: String },

    /// Malformed projection entry.
    #[error("invalid projection '{value}': {reason}")]
    Projection { value: String, reason: String },

    /// The document has no `_id`.
    #[error("missing _id field")]
    MissingId,

    /// The `_id` is neither an object id nor a string.
    #[error("unsupported _id type: {actual}")]
    UnsupportedIdType { actual: String },

    /// The value is not a usable document.
    #[error("invalid document: {reason}")]
    Document { reason: String },

    /// Collection names must be usable as a single path segment.
    #[error("invalid collection name '{value}': {reason}")]
    CollectionName { value: String, reason: String },

    /// Malformed update descriptor.
    #[error("invalid update: {reason}")]
    Update { reason: String },

    /// A `$regex` pattern that does not compile.
    #[error("invalid regex '{pattern}': {reason}")]
    Regex { pattern: String, reason: String },

    /// Malformed index definition.
    #[error("invalid index '{name}': {reason}")]
    Index { name: String, reason: String },

    /// Invalid engine configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
