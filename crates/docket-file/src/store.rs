//! On-disk layout and locking for the file-backed store.
//!
//! ```text
//! <root>/<collection>/
//!     .lock           advisory lock, shared for reads, exclusive for writes
//!     meta.json       insertion counter
//!     indexes.json    index catalog
//!     docs/<key>.json one file per document
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use docket_core::error::{Error, InvalidInputError, StoreError};
use docket_core::{Document, DocumentId, IndexModel, Result};

use crate::collection::FileCollection;

fn map_io(err: std::io::Error) -> Error {
    Error::Store(StoreError::Io {
        message: format!("IO error: {}", err),
    })
}

fn map_decode(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Store(StoreError::Decode {
        message: format!("{}: {}", path.display(), err),
    })
}

fn map_encode(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

/// A document file: its insertion sequence plus the Extended JSON body.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    seq: u64,
    doc: JsonValue,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionMeta {
    next_seq: u64,
}

/// A decoded document together with where it lives.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub seq: u64,
    pub key: String,
    pub doc: Document,
}

/// Held for the duration of one collection operation.
#[derive(Debug)]
pub(crate) struct CollectionLock {
    file: File,
}

impl Drop for CollectionLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            warn!(error = %e, "failed to release collection lock");
        }
    }
}

/// String ids longer than this are keyed by digest so the file name, plus
/// the temporary suffix used while writing, stays within common name limits.
const MAX_PLAIN_ID_BYTES: usize = 96;

/// File name stem for a document id.
///
/// Object ids use their hex form. String ids are hex encoded behind an `s_`
/// prefix, or for long ids the hex SHA-256 digest behind `h_`, so any string
/// is a valid file name and the three forms never collide.
pub(crate) fn document_key(id: &DocumentId) -> String {
    match id {
        DocumentId::Object(oid) => oid.to_hex(),
        DocumentId::Str(s) if s.len() <= MAX_PLAIN_ID_BYTES => {
            format!("s_{}", hex(s.as_bytes()))
        }
        DocumentId::Str(s) => format!("h_{}", hex(&Sha256::digest(s.as_bytes()))),
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Filesystem-backed document store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. Nothing is touched until first use.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a collection handle.
    ///
    /// # Errors
    ///
    /// Fails when `name` cannot be used as a directory name.
    pub fn collection(&self, name: &str) -> Result<FileCollection> {
        validate_collection_name(name)?;
        Ok(FileCollection::new(self.clone(), name.to_string()))
    }

    /// Names of every collection that has been written to, sorted.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(map_io)? {
            let entry = entry.map_err(map_io)?;
            if !entry.file_type().map_err(map_io)?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_collection_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub(crate) fn exists(&self, name: &str) -> bool {
        self.collection_dir(name).exists()
    }

    fn collection_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn docs_dir(&self, name: &str) -> PathBuf {
        self.collection_dir(name).join("docs")
    }

    fn document_path(&self, name: &str, key: &str) -> PathBuf {
        self.docs_dir(name).join(format!("{}.json", key))
    }

    fn indexes_path(&self, name: &str) -> PathBuf {
        self.collection_dir(name).join("indexes.json")
    }

    fn meta_path(&self, name: &str) -> PathBuf {
        self.collection_dir(name).join("meta.json")
    }

    fn open_lock_file(&self, name: &str) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.collection_dir(name).join(".lock"))
            .map_err(map_io)
    }

    /// Shared lock for readers. `None` when the collection does not exist.
    pub(crate) fn lock_shared(&self, name: &str) -> Result<Option<CollectionLock>> {
        if !self.exists(name) {
            return Ok(None);
        }
        let file = self.open_lock_file(name)?;
        file.lock_shared().map_err(map_io)?;
        Ok(Some(CollectionLock { file }))
    }

    /// Exclusive lock for writers, creating the collection if needed.
    pub(crate) fn lock_exclusive(&self, name: &str) -> Result<CollectionLock> {
        fs::create_dir_all(self.docs_dir(name)).map_err(map_io)?;
        let file = self.open_lock_file(name)?;
        file.lock_exclusive().map_err(map_io)?;
        Ok(CollectionLock { file })
    }

    /// Every document in insertion order. Caller holds a lock.
    pub(crate) fn load_entries(&self, name: &str) -> Result<Vec<Entry>> {
        let dir = self.docs_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&dir).map_err(map_io)? {
            let path = dir_entry.map_err(map_io)?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path).map_err(map_io)?;
            let stored: StoredDocument =
                serde_json::from_str(&content).map_err(|e| map_decode(&path, e))?;
            let doc = Document::from_json(stored.doc).map_err(|e| map_decode(&path, e))?;

            entries.push(Entry {
                seq: stored.seq,
                key: key.to_string(),
                doc,
            });
        }

        entries.sort_by_key(|e| e.seq);
        Ok(entries)
    }

    pub(crate) fn document_exists(&self, name: &str, key: &str) -> bool {
        self.document_path(name, key).exists()
    }

    /// Write a document file atomically. Caller holds the exclusive lock.
    pub(crate) fn write_document(&self, name: &str, entry: &Entry) -> Result<()> {
        let stored = StoredDocument {
            seq: entry.seq,
            doc: entry.doc.to_json(),
        };
        let content = serde_json::to_string_pretty(&stored).map_err(map_encode)?;
        write_atomic(&self.document_path(name, &entry.key), &content)?;
        debug!(collection = %name, key = %entry.key, "wrote document");
        Ok(())
    }

    /// Remove a document file. Returns false when it was already gone.
    pub(crate) fn remove_document(&self, name: &str, key: &str) -> Result<bool> {
        let path = self.document_path(name, key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(map_io)?;
        debug!(collection = %name, key = %key, "removed document");
        Ok(true)
    }

    /// Reserve the next insertion sequence number. Caller holds the
    /// exclusive lock.
    pub(crate) fn next_seq(&self, name: &str) -> Result<u64> {
        let path = self.meta_path(name);
        let mut meta = if path.exists() {
            let content = fs::read_to_string(&path).map_err(map_io)?;
            serde_json::from_str::<CollectionMeta>(&content).map_err(|e| map_decode(&path, e))?
        } else {
            CollectionMeta::default()
        };

        let seq = meta.next_seq;
        meta.next_seq += 1;

        let content = serde_json::to_string(&meta).map_err(map_encode)?;
        write_atomic(&path, &content)?;
        Ok(seq)
    }

    pub(crate) fn load_indexes(&self, name: &str) -> Result<Vec<IndexModel>> {
        let path = self.indexes_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(map_io)?;
        let raw: Vec<JsonValue> =
            serde_json::from_str(&content).map_err(|e| map_decode(&path, e))?;

        raw.into_iter()
            .map(|json| {
                let doc = Document::from_json(json).map_err(|e| map_decode(&path, e))?;
                IndexModel::from_document(&doc).map_err(|e| map_decode(&path, e))
            })
            .collect()
    }

    #[instrument(skip(self, indexes), fields(count = indexes.len()))]
    pub(crate) fn save_indexes(&self, name: &str, indexes: &[IndexModel]) -> Result<()> {
        let raw: Vec<JsonValue> = indexes.iter().map(|i| i.to_document().to_json()).collect();
        let content = serde_json::to_string_pretty(&raw).map_err(map_encode)?;
        write_atomic(&self.indexes_path(name), &content)
    }
}

/// Write to a uniquely named sibling and rename over the target.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    fs::write(&temp_path, content).map_err(map_io)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(map_io(e));
    }
    Ok(())
}

fn validate_collection_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::InvalidInput(InvalidInputError::CollectionName {
            value: name.to_string(),
            reason: reason.to_string(),
        }))
    };

    if name.trim().is_empty() {
        return invalid("name cannot be empty");
    }
    if name.starts_with('.') {
        return invalid("name cannot start with '.'");
    }
    if name.contains(['/', '\\', '\0', ':']) {
        return invalid("name cannot contain path separators");
    }
    if name.starts_with("system.") {
        return invalid("'system.' prefix is reserved");
    }
    Ok(())
}
