//! docket - Document query engine.
//!
//! Builds validated query descriptors from request parameters and runs them
//! against any [`Collection`] with per-operation deadlines. Index definitions
//! are reconciled through [`IndexManager`].
//!
//! # Example
//!
//! ```no_run
//! use docket::{Filter, QueryParams, Repository, RequestContext};
//! use docket::context::keys;
//! # use docket::Collection;
//!
//! # async fn example<C: Collection>(songs: C) -> Result<(), docket::Error> {
//! let repo = Repository::new(songs);
//!
//! let params = QueryParams::parse("title=rain&published=true");
//! let mut filter = Filter::new();
//! filter.append_find_by_title(&params);
//! filter.append_bool_filter(&params, "published");
//!
//! let ctx = RequestContext::new()
//!     .with_str(keys::FIELDS, "title,artist")
//!     .with_int(keys::LIMIT, 20);
//!
//! for song in repo.find(&ctx, &filter).await? {
//!     println!("{}", song.get_object("title").get_str("en"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod index;
pub mod profiler;
pub mod repository;
mod timeout;

pub use config::{EngineConfig, ProfilingConfig, Timeouts};
pub use index::{BulkIndexReport, IndexManager, IndexOutcome};
pub use profiler::Profiler;
pub use repository::Repository;

pub use docket_core::{
    Clause, Collection, Document, DocumentCursor, DocumentId, Error, Filter, FindOptions,
    IndexKind, IndexModel, IndexOptions, ObjectId, Pagination, Projection, ProjectionMode,
    QueryParams, RequestContext, Result, ReturnDocument, SortDirection, Update, Value, context,
    error, query,
};
