//! docket-core - Document model, query descriptors and store traits.

pub mod context;
pub mod document;
pub mod error;
pub mod index;
pub mod query;
pub mod traits;
pub mod types;

pub use context::{QueryParams, RequestContext};
pub use document::{Document, Value};
pub use error::Error;
pub use index::{IndexKind, IndexModel, IndexOptions};
pub use query::{
    Clause, Filter, FindOptions, Pagination, Projection, ProjectionMode, ReturnDocument,
    SortDirection, Update,
};
pub use traits::{Collection, DocumentCursor};
pub use types::{DocumentId, ObjectId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
