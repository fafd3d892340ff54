//! Query descriptors.
//!
//! Everything here is built per request, validated up front, and handed to a
//! [`Collection`](crate::Collection) unchanged. No descriptor talks to a
//! store.

mod filter;
mod options;
mod projection;
mod tokens;
mod update;

pub use filter::{Clause, Filter, parse_bool};
pub use options::{FindOptions, Pagination, ReturnDocument, SortDirection, merge_addon_fields, sort_key};
pub use projection::{Projection, ProjectionMode};
pub use tokens::search_tokens;
pub use update::Update;
