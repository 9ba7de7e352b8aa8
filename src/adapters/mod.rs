//! External system integrations for couchcopy.
//!
//! - [`source`] - Opens the source byte stream (HTTP GET or local file)
//! - [`couchdb`] - `_bulk_docs` writer behind the [`couchdb::BulkWriter`] trait
//! - [`file`] - Local file destinations (verbatim copy and line-delimited documents)
//! - [`http`] - HTTP client construction
//!
//! # Example
//!
//! ```rust,no_run
//! use couchcopy::adapters::couchdb::{BulkWriter, CouchDbBulkWriter};
//! use couchcopy::adapters::http::bulk_client;
//! use couchcopy::config::HttpConfig;
//! use couchcopy::domain::Address;
//!
//! # async fn example() -> couchcopy::domain::Result<()> {
//! let client = bulk_client(&HttpConfig::default())?;
//! let target = Address::new("http://localhost:5984/target").unwrap();
//! let writer = CouchDbBulkWriter::new(client, &target)?;
//! writer.write_bulk(&[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod couchdb;
pub mod file;
pub mod http;
pub mod source;
