//! Cursor over a materialized result set.

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::{debug, warn};

use docket_core::error::StoreError;
use docket_core::{Document, DocumentCursor, Result};

/// Cursor returned by [`FileCollection::find`](crate::FileCollection).
///
/// Results are read under the collection lock when the cursor is opened, so
/// later writes do not show up in an open cursor.
#[derive(Debug)]
pub struct FileCursor {
    collection: String,
    docs: VecDeque<Document>,
    closed: bool,
}

impl FileCursor {
    pub(crate) fn new(collection: String, docs: Vec<Document>) -> Self {
        Self {
            collection,
            docs: docs.into(),
            closed: false,
        }
    }

    /// Documents not yet returned by [`DocumentCursor::next`].
    pub fn remaining(&self) -> usize {
        self.docs.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl DocumentCursor for FileCursor {
    async fn next(&mut self) -> Result<Option<Document>> {
        if self.closed {
            return Err(StoreError::CursorClosed.into());
        }
        Ok(self.docs.pop_front())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.docs.clear();
            debug!(collection = %self.collection, "closed cursor");
        }
        Ok(())
    }
}

impl Drop for FileCursor {
    fn drop(&mut self) {
        if !self.closed {
            warn!(collection = %self.collection, "cursor dropped without close");
        }
    }
}
