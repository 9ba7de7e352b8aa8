//! Core transfer logic for couchcopy.
//!
//! # Modules
//!
//! - [`decode`] - Streaming decoder for `{"total_rows": N, "rows": [...]}` exports
//! - [`transform`] - Document normalization before delivery
//! - [`transfer`] - Producer/consumer pipeline, delivery worker and progress tracking
//!
//! # Transfer Workflow
//!
//! 1. **Open**: Open the source stream (HTTP GET or local file)
//! 2. **Decode**: Read `total_rows`, then pull one row at a time
//! 3. **Normalize**: Drop the `_rev` member of each document
//! 4. **Enqueue**: Send the document on a channel bounded by `bulk_size`
//! 5. **Deliver**: Batch into `_bulk_docs` requests, or append lines to a file
//! 6. **Finish**: Close the channel, emit final progress, wait for the last flush
//!
//! # Example
//!
//! ```rust,no_run
//! use couchcopy::config::load_config;
//! use couchcopy::core::transfer::TransferCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = load_config(None)?;
//! config.transfer.input = "http://localhost:5984/src/_all_docs?include_docs=true".to_string();
//! config.transfer.output = "http://localhost:5984/dst".to_string();
//!
//! let summary = TransferCoordinator::new(config).execute().await?;
//! println!("Delivered: {}", summary.documents);
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod transfer;
pub mod transform;
