//! docket-file - Filesystem-backed document store.
//!
//! Each collection is a directory holding one JSON file per document plus an
//! index catalog. Writers take an exclusive lock on the collection and
//! replace files atomically, so several processes may share a root.

mod collection;
mod cursor;
mod matcher;
mod store;

pub use collection::FileCollection;
pub use cursor::FileCursor;
pub use store::FileStore;
