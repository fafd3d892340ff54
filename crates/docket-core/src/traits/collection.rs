//! Collection trait.

use async_trait::async_trait;

use super::DocumentCursor;
use crate::Result;
use crate::document::Document;
use crate::index::IndexModel;
use crate::query::{Filter, FindOptions, ReturnDocument, Update};
use crate::types::DocumentId;

/// A named collection in a document store.
///
/// This is the whole surface the engine needs from a driver. Calls are not
/// bounded here; callers wrap them in their own deadlines.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Cursor type returned by [`Collection::find`].
    type Cursor: DocumentCursor;

    /// The collection name.
    fn name(&self) -> &str;

    /// Open a cursor over documents matching `filter`, shaped by `options`.
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Self::Cursor>;

    /// The first document matching `filter`.
    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Insert a document, generating an object id `_id` when absent.
    async fn insert_one(&self, document: &Document) -> Result<DocumentId>;

    /// Delete the first document matching `filter`. Returns the number
    /// deleted (0 or 1).
    async fn delete_one(&self, filter: &Filter) -> Result<u64>;

    /// Apply `update` to the first match and return it.
    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>>;

    /// Delete the first match and return it.
    async fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Every index on the collection, each with at least a `name` field.
    async fn list_indexes(&self) -> Result<Vec<Document>>;

    /// Create an index and return its name.
    async fn create_index(&self, model: &IndexModel) -> Result<String>;

    /// Drop an index by name.
    async fn drop_index(&self, name: &str) -> Result<()>;
}
