//! Cursor trait.

use async_trait::async_trait;

use crate::Result;
use crate::document::Document;

/// A server-side iterator over the results of a find.
///
/// Cursors hold store resources until [`DocumentCursor::close`] is called;
/// callers must close them on every path, including after a failed read.
#[async_trait]
pub trait DocumentCursor: Send {
    /// Decode the next document, or `None` when exhausted.
    async fn next(&mut self) -> Result<Option<Document>>;

    /// Release the cursor. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Decode every remaining document in order.
    async fn collect_all(&mut self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        while let Some(doc) = self.next().await? {
            docs.push(doc);
        }
        Ok(docs)
    }
}
