//! Query facade over a [`Collection`].

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use docket_core::error::{InvalidInputError, StoreError};
use docket_core::{
    Collection, Document, DocumentCursor, DocumentId, Filter, FindOptions, ObjectId,
    RequestContext, Result, ReturnDocument, Update,
};

use crate::config::EngineConfig;
use crate::index::IndexManager;
use crate::profiler::Profiler;
use crate::timeout::bounded;

/// Store-facing operations, each bounded by a configured deadline.
///
/// Cheap to clone; clones share the collection handle.
#[derive(Debug)]
pub struct Repository<C> {
    collection: Arc<C>,
    config: EngineConfig,
}

impl<C> Clone for Repository<C> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            config: self.config.clone(),
        }
    }
}

impl<C: Collection> Repository<C> {
    /// Wrap a collection with the default configuration.
    pub fn new(collection: C) -> Self {
        Self::with_config(collection, EngineConfig::default())
    }

    pub fn with_config(collection: C, config: EngineConfig) -> Self {
        Self {
            collection: Arc::new(collection),
            config,
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Index administration for the same collection.
    pub fn indexes(&self) -> IndexManager<C> {
        IndexManager::new(Arc::clone(&self.collection), &self.config)
    }

    fn not_found(&self, filter: &Filter) -> StoreError {
        StoreError::NotFound {
            collection: self.collection.name().to_string(),
            filter: filter.to_json().to_string(),
        }
    }

    /// Insert a document and return its `_id`.
    #[instrument(skip(self, document), fields(collection = %self.collection.name()))]
    pub async fn insert_one(&self, document: &Document) -> Result<DocumentId> {
        let id = bounded(
            "insert_one",
            self.config.timeouts.insert(),
            self.collection.insert_one(document),
        )
        .await?;
        debug!(id = %id, "inserted");
        Ok(id)
    }

    /// Delete the first match. Returns whether a document was removed.
    #[instrument(skip(self, filter), fields(collection = %self.collection.name()))]
    pub async fn delete_one(&self, filter: &Filter) -> Result<bool> {
        let deleted = bounded(
            "delete_one",
            self.config.timeouts.delete(),
            self.collection.delete_one(filter),
        )
        .await?;
        Ok(deleted > 0)
    }

    /// Apply `update` to the first match and return the updated document.
    ///
    /// # Errors
    ///
    /// An empty update is rejected before the store is called; no match is
    /// [`StoreError::NotFound`].
    #[instrument(skip(self, filter, update), fields(collection = %self.collection.name()))]
    pub async fn find_one_and_update(&self, filter: &Filter, update: &Update) -> Result<Document> {
        if update.is_empty() {
            return Err(InvalidInputError::Update {
                reason: "update cannot be empty".to_string(),
            }
            .into());
        }

        bounded(
            "find_one_and_update",
            self.config.timeouts.modify(),
            self.collection
                .find_one_and_update(filter, update, ReturnDocument::After),
        )
        .await?
        .ok_or_else(|| self.not_found(filter).into())
    }

    /// Delete the first match and return it.
    #[instrument(skip(self, filter), fields(collection = %self.collection.name()))]
    pub async fn find_one_and_delete(&self, filter: &Filter) -> Result<Document> {
        bounded(
            "find_one_and_delete",
            self.config.timeouts.modify(),
            self.collection.find_one_and_delete(filter),
        )
        .await?
        .ok_or_else(|| self.not_found(filter).into())
    }

    /// Look up by object id when `id` is one, otherwise by `slug`.
    pub async fn find_by_id_or_slug(&self, id: &str) -> Result<Document> {
        if ObjectId::is_valid(id) {
            return self.find_by_id(id).await;
        }
        self.find_one(&Filter::eq("slug", id)).await
    }

    /// Look up by object id.
    ///
    /// # Errors
    ///
    /// [`InvalidInputError::ObjectId`] when `id` is not 24 hex characters.
    pub async fn find_by_id(&self, id: &str) -> Result<Document> {
        let oid = ObjectId::parse_str(id)?;
        self.find_one(&Filter::by_id(&DocumentId::Object(oid))).await
    }

    /// The first match, or [`StoreError::NotFound`].
    #[instrument(skip(self, filter), fields(collection = %self.collection.name()))]
    pub async fn find_one(&self, filter: &Filter) -> Result<Document> {
        bounded(
            "find_one",
            self.config.timeouts.read(),
            self.collection.find_one(filter),
        )
        .await?
        .ok_or_else(|| self.not_found(filter).into())
    }

    /// Every match, shaped by the request's fields, sort and paging.
    pub async fn find(&self, ctx: &RequestContext, filter: &Filter) -> Result<Vec<Document>> {
        self.find_with_addon_fields(ctx, filter, "").await
    }

    /// Like [`Repository::find`], with `addon_fields` always returned when
    /// the request narrows the projection.
    #[instrument(skip(self, ctx, filter), fields(collection = %self.collection.name()))]
    pub async fn find_with_addon_fields(
        &self,
        ctx: &RequestContext,
        filter: &Filter,
        addon_fields: &str,
    ) -> Result<Vec<Document>> {
        let options = FindOptions::from_context(ctx, addon_fields)?;
        self.find_with_options(filter, &options).await
    }

    /// Run a find with prebuilt options.
    ///
    /// The cursor is closed on every path once opened, including decode
    /// failures and timeouts while reading.
    pub async fn find_with_options(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        let profiler = Profiler::start(&self.config.profiling);
        let read = self.config.timeouts.read();

        let mut cursor = bounded("find", read, self.collection.find(filter, options)).await?;
        let result = bounded("find", read, cursor.collect_all()).await;

        if let Err(e) = cursor.close().await {
            warn!(error = %e, "failed to close cursor");
        }

        let docs = result?;
        profiler.end_record(&format!("find {}", self.collection.name()));
        debug!(count = docs.len(), "find complete");
        Ok(docs)
    }
}
