//! CouchDB destination
//!
//! Documents reach a CouchDB database through `POST <db>/_bulk_docs`. The
//! [`BulkWriter`] trait is the seam the delivery worker writes through, so
//! tests can substitute a recording implementation.

pub mod bulk;

pub use bulk::{bulk_docs_url, CouchDbBulkWriter};

use crate::domain::{Document, Result};
use async_trait::async_trait;

/// Writes one batch of documents to a destination database
#[async_trait]
pub trait BulkWriter: Send + Sync {
    /// Write `docs` in a single request
    ///
    /// # Errors
    ///
    /// Returns `CopyError::Transport` when the request fails or the
    /// destination does not acknowledge the batch.
    async fn write_bulk(&self, docs: &[Document]) -> Result<()>;

    /// Destination name used in logs (credentials redacted)
    fn destination(&self) -> &str;
}
