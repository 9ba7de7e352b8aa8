//! `_bulk_docs` writer

use super::BulkWriter;
use crate::domain::{Address, CopyError, Document, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

const BULK_DOCS_SEGMENT: &str = "_bulk_docs";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Request body for `_bulk_docs`
#[derive(Serialize)]
struct BulkDocs<'a> {
    docs: &'a [Document],
}

/// Resolve the `_bulk_docs` endpoint of a database URL
///
/// A trailing slash on the database URL is tolerated; query strings are kept.
///
/// # Errors
///
/// Returns `CopyError::Configuration` if the address is not an absolute URL.
pub fn bulk_docs_url(database: &Address) -> Result<Url> {
    let mut url = Url::parse(database.as_str()).map_err(|e| {
        CopyError::Configuration(format!("Invalid destination URL {database}: {e}"))
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            CopyError::Configuration(format!("Destination URL {database} cannot take a path"))
        })?
        .pop_if_empty()
        .push(BULK_DOCS_SEGMENT);

    Ok(url)
}

/// Bulk writer for a CouchDB database
pub struct CouchDbBulkWriter {
    client: Client,
    url: Url,
    display: String,
}

impl CouchDbBulkWriter {
    /// Create a writer targeting `database`
    ///
    /// # Errors
    ///
    /// Returns an error if the database address is not a usable URL.
    pub fn new(client: Client, database: &Address) -> Result<Self> {
        let url = bulk_docs_url(database)?;
        let display = Address::new(url.as_str())
            .map(|a| a.redacted())
            .unwrap_or_else(|_| database.redacted());

        Ok(Self {
            client,
            url,
            display,
        })
    }
}

#[async_trait]
impl BulkWriter for CouchDbBulkWriter {
    async fn write_bulk(&self, docs: &[Document]) -> Result<()> {
        let body = serde_json::to_vec(&BulkDocs { docs })?;

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| CopyError::transport(&self.display, e.to_string()))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                destination = %self.display,
                "Bulk write rejected"
            );
            return Err(CopyError::transport_status(
                status.as_u16(),
                &self.display,
                body,
            ));
        }

        tracing::trace!(documents = docs.len(), destination = %self.display, "Bulk write acknowledged");
        Ok(())
    }

    fn destination(&self) -> &str {
        &self.display
    }
}
