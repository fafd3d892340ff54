//! [`Collection`] implementation over a [`FileStore`] directory.

use async_trait::async_trait;
use tracing::{debug, instrument};

use docket_core::error::{Error, InvalidInputError, StoreError};
use docket_core::{
    Collection, Document, DocumentId, Filter, FindOptions, IndexKind, IndexModel, ObjectId,
    ReturnDocument, Result, Update,
};

use crate::cursor::FileCursor;
use crate::matcher::{self, Matcher};
use crate::store::{Entry, FileStore, document_key};

/// One collection of a [`FileStore`].
#[derive(Debug, Clone)]
pub struct FileCollection {
    store: FileStore,
    name: String,
}

impl FileCollection {
    pub(crate) fn new(store: FileStore, name: String) -> Self {
        Self { store, name }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Number of stored documents.
    pub fn count(&self) -> Result<usize> {
        let _lock = self.store.lock_shared(&self.name)?;
        Ok(self.store.load_entries(&self.name)?.len())
    }

    /// Fields covered by the text index, or an error when a `$text` clause
    /// has nothing to search.
    fn text_fields(&self, filter: &Filter) -> Result<Vec<String>> {
        if !matcher::needs_text_index(filter) {
            return Ok(Vec::new());
        }

        let fields: Vec<String> = self
            .store
            .load_indexes(&self.name)?
            .iter()
            .flat_map(|index| index.keys().iter())
            .filter(|(_, kind)| *kind == IndexKind::Text)
            .map(|(field, _)| field.clone())
            .collect();

        if fields.is_empty() {
            return Err(StoreError::TextIndexRequired {
                collection: self.name.clone(),
            }
            .into());
        }
        Ok(fields)
    }

    /// `filter` compiled against this collection's text index.
    fn matcher(&self, filter: &Filter) -> Result<Matcher> {
        Matcher::new(filter, self.text_fields(filter)?)
    }

    /// First matching entry. Caller holds a lock.
    fn first_match(&self, filter: &Filter) -> Result<Option<Entry>> {
        let compiled = self.matcher(filter)?;
        Ok(self
            .store
            .load_entries(&self.name)?
            .into_iter()
            .find(|entry| compiled.matches(&entry.doc)))
    }
}

#[async_trait]
impl Collection for FileCollection {
    type Cursor = FileCursor;

    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, filter, options), fields(collection = %self.name))]
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<FileCursor> {
        let Some(_lock) = self.store.lock_shared(&self.name)? else {
            return Ok(FileCursor::new(self.name.clone(), Vec::new()));
        };

        let compiled = self.matcher(filter)?;
        let mut docs: Vec<Document> = self
            .store
            .load_entries(&self.name)?
            .into_iter()
            .filter(|entry| compiled.matches(&entry.doc))
            .map(|entry| entry.doc)
            .collect();

        matcher::sort_documents(&mut docs, options.sort());

        let skip = usize::try_from(options.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(options.limit()).unwrap_or(usize::MAX);
        let docs: Vec<Document> = docs
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match options.projection() {
                Some(projection) => matcher::project(&doc, projection),
                None => doc,
            })
            .collect();

        debug!(count = docs.len(), "opened cursor");
        Ok(FileCursor::new(self.name.clone(), docs))
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let Some(_lock) = self.store.lock_shared(&self.name)? else {
            return Ok(None);
        };
        Ok(self.first_match(filter)?.map(|entry| entry.doc))
    }

    #[instrument(skip(self, document), fields(collection = %self.name))]
    async fn insert_one(&self, document: &Document) -> Result<DocumentId> {
        let mut doc = document.clone();
        let id = match DocumentId::from_document(&doc) {
            Ok(id) => id,
            Err(Error::InvalidInput(InvalidInputError::MissingId)) => {
                let oid = ObjectId::new();
                doc.insert("_id", oid);
                DocumentId::Object(oid)
            }
            Err(e) => return Err(e),
        };

        let _lock = self.store.lock_exclusive(&self.name)?;
        let key = document_key(&id);
        if self.store.document_exists(&self.name, &key) {
            return Err(StoreError::DuplicateKey { key: id.to_string() }.into());
        }

        let entry = Entry {
            seq: self.store.next_seq(&self.name)?,
            key,
            doc,
        };
        self.store.write_document(&self.name, &entry)?;

        debug!(id = %id, "inserted document");
        Ok(id)
    }

    #[instrument(skip(self, filter), fields(collection = %self.name))]
    async fn delete_one(&self, filter: &Filter) -> Result<u64> {
        let _lock = self.store.lock_exclusive(&self.name)?;
        match self.first_match(filter)? {
            Some(entry) => {
                let removed = self.store.remove_document(&self.name, &entry.key)?;
                Ok(u64::from(removed))
            }
            None => Ok(0),
        }
    }

    #[instrument(skip(self, filter, update), fields(collection = %self.name))]
    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        return_document: ReturnDocument,
    ) -> Result<Option<Document>> {
        matcher::validate_update(update)?;

        let _lock = self.store.lock_exclusive(&self.name)?;
        let Some(mut entry) = self.first_match(filter)? else {
            return Ok(None);
        };

        let before = entry.doc.clone();
        matcher::apply_update(&mut entry.doc, update)?;
        self.store.write_document(&self.name, &entry)?;

        debug!(key = %entry.key, "updated document");
        Ok(Some(match return_document {
            ReturnDocument::Before => before,
            ReturnDocument::After => entry.doc,
        }))
    }

    #[instrument(skip(self, filter), fields(collection = %self.name))]
    async fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<Document>> {
        let _lock = self.store.lock_exclusive(&self.name)?;
        let Some(entry) = self.first_match(filter)? else {
            return Ok(None);
        };
        self.store.remove_document(&self.name, &entry.key)?;
        Ok(Some(entry.doc))
    }

    async fn list_indexes(&self) -> Result<Vec<Document>> {
        let Some(_lock) = self.store.lock_shared(&self.name)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .load_indexes(&self.name)?
            .iter()
            .map(IndexModel::to_document)
            .collect())
    }

    /// Creating an identical index again is a no-op. A different definition
    /// under an existing name, the same keys under a second name, or a second
    /// text index all conflict.
    #[instrument(skip(self, model), fields(collection = %self.name, index = %model.name()))]
    async fn create_index(&self, model: &IndexModel) -> Result<String> {
        let _lock = self.store.lock_exclusive(&self.name)?;
        let mut indexes = self.store.load_indexes(&self.name)?;

        if let Some(existing) = indexes.iter().find(|i| i.name() == model.name()) {
            if existing == model {
                debug!("index already exists");
                return Ok(model.name().to_string());
            }
            return Err(StoreError::IndexConflict {
                name: model.name().to_string(),
            }
            .into());
        }

        let has_text = |index: &IndexModel| index.keys().iter().any(|(_, k)| *k == IndexKind::Text);
        if let Some(existing) = indexes
            .iter()
            .find(|i| i.keys() == model.keys() || (has_text(i) && has_text(model)))
        {
            return Err(StoreError::IndexConflict {
                name: existing.name().to_string(),
            }
            .into());
        }

        indexes.push(model.clone());
        self.store.save_indexes(&self.name, &indexes)?;

        debug!("created index");
        Ok(model.name().to_string())
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn drop_index(&self, name: &str) -> Result<()> {
        let not_found = || StoreError::IndexNotFound {
            name: name.to_string(),
        };

        if !self.store.exists(&self.name) {
            return Err(not_found().into());
        }

        let _lock = self.store.lock_exclusive(&self.name)?;
        let mut indexes = self.store.load_indexes(&self.name)?;
        let before = indexes.len();
        indexes.retain(|i| i.name() != name);
        if indexes.len() == before {
            return Err(not_found().into());
        }

        self.store.save_indexes(&self.name, &indexes)?;
        debug!("dropped index");
        Ok(())
    }
}
