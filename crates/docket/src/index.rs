//! Index lifecycle: existence checks, drop-then-create and bulk creation.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use docket_core::error::StoreError;
use docket_core::{Collection, Document, Error, IndexKind, IndexModel, IndexOptions, Result};

use crate::config::EngineConfig;
use crate::timeout::bounded;

/// Result of creating one index in a bulk request.
#[derive(Debug)]
pub struct IndexOutcome {
    pub name: String,
    pub result: Result<String>,
}

impl IndexOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-name outcomes of a bulk creation, in request order.
#[derive(Debug, Default)]
pub struct BulkIndexReport {
    pub outcomes: Vec<IndexOutcome>,
}

impl BulkIndexReport {
    /// Outcomes whose creation failed.
    pub fn failures(&self) -> impl Iterator<Item = &IndexOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Names created successfully.
    pub fn created(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_ok())
            .map(|o| o.name.as_str())
    }

    /// True when every requested index was created.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(IndexOutcome::is_ok)
    }
}

/// Reconciles named index definitions on one collection.
///
/// Creation is idempotent: any existing index with the requested name is
/// dropped first, so redefining an index replaces it.
#[derive(Debug)]
pub struct IndexManager<C> {
    collection: Arc<C>,
    timeout: Duration,
    options: IndexOptions,
}

impl<C> Clone for IndexManager<C> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            timeout: self.timeout,
            options: self.options.clone(),
        }
    }
}

impl<C> IndexManager<C> {
    pub fn new(collection: Arc<C>, config: &EngineConfig) -> Self {
        Self {
            collection,
            timeout: config.timeouts.index(),
            options: IndexOptions::default(),
        }
    }

    /// Replace the language options attached to created indexes.
    pub fn with_options(mut self, options: IndexOptions) -> Self {
        self.options = options;
        self
    }
}

impl<C: Collection + 'static> IndexManager<C> {
    /// Every index definition, as listed by the store.
    pub async fn list(&self) -> Result<Vec<Document>> {
        bounded(
            "list_indexes",
            self.timeout,
            self.collection.list_indexes(),
        )
        .await
    }

    /// Whether an index named `name` exists.
    pub async fn index_exists(&self, name: &str) -> Result<bool> {
        let indexes = self.list().await?;
        Ok(indexes.iter().any(|index| index.get_str("name") == name))
    }

    /// Drop `name` if it exists. Returns whether a drop happened.
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn drop_index(&self, name: &str) -> Result<bool> {
        if !self.index_exists(name).await? {
            return Ok(false);
        }

        bounded(
            "drop_index",
            self.timeout,
            self.collection.drop_index(name),
        )
        .await?;
        debug!("dropped index");
        Ok(true)
    }

    /// Drop any index named `name`, then create it over `keys` (in order)
    /// with the manager's language options. Returns the created name.
    #[instrument(skip(self, keys), fields(collection = %self.collection.name()))]
    pub async fn create_index_with_fields(
        &self,
        name: &str,
        keys: Vec<(String, IndexKind)>,
    ) -> Result<String> {
        let model = IndexModel::new(name, keys)?.with_options(self.options.clone());

        self.drop_index(name).await?;

        let created = bounded(
            "create_index",
            self.timeout,
            self.collection.create_index(&model),
        )
        .await?;
        debug!(index = %created, "created index");
        Ok(created)
    }

    /// One ascending index per name, each on the field of the same name.
    pub async fn create_single_indexes<S: AsRef<str>>(&self, names: &[S]) -> BulkIndexReport {
        self.create_single(names, IndexKind::Ascending).await
    }

    /// One hashed index per name, each on the field of the same name.
    pub async fn create_single_hash_indexes<S: AsRef<str>>(&self, names: &[S]) -> BulkIndexReport {
        self.create_single(names, IndexKind::Hashed).await
    }

    /// Create every index on its own task and wait for all of them.
    ///
    /// A failure (or panic) in one task is recorded in the report and does
    /// not stop the others.
    async fn create_single<S: AsRef<str>>(&self, names: &[S], kind: IndexKind) -> BulkIndexReport {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();

        let handles = names.iter().cloned().map(|name| {
            let manager = self.clone();
            tokio::spawn(async move {
                let keys = vec![(name.clone(), kind)];
                manager.create_index_with_fields(&name, keys).await
            })
        });
        let joined = join_all(handles).await;

        let outcomes: Vec<IndexOutcome> = names
            .into_iter()
            .zip(joined)
            .map(|(name, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    Err(Error::Store(StoreError::Worker {
                        message: e.to_string(),
                    }))
                });
                if let Err(e) = &result {
                    warn!(index = %name, error = %e, "index creation failed");
                }
                IndexOutcome { name, result }
            })
            .collect();

        let report = BulkIndexReport { outcomes };
        info!(
            collection = %self.collection.name(),
            requested = report.outcomes.len(),
            failed = report.failures().count(),
            "bulk index creation finished"
        );
        report
    }
}
