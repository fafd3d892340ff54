#![allow(dead_code)]

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use docket::error::StoreError;
use docket::{
    Collection, Document, DocumentId, Filter, FindOptions, IndexModel, Result, ReturnDocument,
    Update,
};
use docket_file::{FileCollection, FileCursor, FileStore};
use serde_json::json;
use tempfile::TempDir;

/// A fresh `songs` collection in a temp directory.
pub fn songs() -> (TempDir, FileCollection) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let collection = FileStore::new(temp.path())
        .collection("songs")
        .expect("valid collection name");
    (temp, collection)
}

pub fn doc(json: serde_json::Value) -> Document {
    Document::from_json(json).expect("object literal")
}

/// Sample catalogue used across tests.
pub fn catalogue() -> Vec<Document> {
    vec![
        doc(json!({
            "slug": "purple-rain",
            "title": {"en": "Purple Rain", "mm": "Khayan Mo"},
            "keywords": {"en": "classic", "mm": ""},
            "artist": "Prince",
            "plays": 30,
            "published": true,
        })),
        doc(json!({
            "slug": "golden-city",
            "title": {"en": "Golden City", "mm": "Shwe Myo"},
            "keywords": {"en": "night lights", "mm": ""},
            "artist": "Lay Phyu",
            "plays": 10,
            "published": false,
        })),
        doc(json!({
            "slug": "silent-sea",
            "title": {"en": "Silent Sea", "mm": "Pinle"},
            "keywords": {"en": "calm rain", "mm": ""},
            "artist": "Nobody",
            "plays": 20,
            "published": true,
        })),
    ]
}

/// Wraps a [`FileCollection`], failing index creation for chosen names and
/// optionally stalling every call.
pub struct FaultyCollection {
    inner: FileCollection,
    fail_indexes: HashSet<String>,
    panic_indexes: HashSet<String>,
    delay: Option<Duration>,
}

impl FaultyCollection {
    pub fn new(inner: FileCollection) -> Self {
        Self {
            inner,
            fail_indexes: HashSet::new(),
            panic_indexes: HashSet::new(),
            delay: None,
        }
    }

    pub fn failing_index(mut self, name: &str) -> Self {
        self.fail_indexes.insert(name.to_string());
        self
    }

    pub fn panicking_index(mut self, name: &str) -> Self {
        self.panic_indexes.insert(name.to_string());
        self
    }

    pub fn stalled(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn stall(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Collection for FaultyCollection {
    type Cursor = FileCursor;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<FileCursor> {
        self.stall().await;
        self.inner.find(filter, options).await
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        self.stall().await;
        self.inner.find_one(filter).await
    }

    async fn insert_one(&self, document: &Document) -> Result<DocumentId> {
        self.stall().await;
        self.inner.insert_one(document).await
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64> {
        self.stall().await;
        self.inner.delete_one(filter).await
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>> {
        self.stall().await;
        self.inner
            .find_one_and_update(filter, update, return_document)
            .await
    }

    async fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<Document>> {
        self.stall().await;
        self.inner.find_one_and_delete(filter).await
    }

    async fn list_indexes(&self) -> Result<Vec<Document>> {
        self.stall().await;
        self.inner.list_indexes().await
    }

    async fn create_index(&self, model: &IndexModel) -> Result<String> {
        self.stall().await;
        if self.panic_indexes.contains(model.name()) {
            panic!("index worker crashed on {}", model.name());
        }
        if self.fail_indexes.contains(model.name()) {
            return Err(StoreError::Io {
                message: format!("disk full while creating {}", model.name()),
            }
            .into());
        }
        self.inner.create_index(model).await
    }

    async fn drop_index(&self, name: &str) -> Result<()> {
        self.stall().await;
        self.inner.drop_index(name).await
    }
}
