//! Domain models and types for couchcopy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Documents** ([`Document`]) flowing through the transfer pipeline
//! - **Addresses** ([`Address`]) naming sources and destinations
//! - **Error types** ([`CopyError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CopyError>`]:
//!
//! ```rust
//! use couchcopy::domain::{Address, CopyError, Result};
//!
//! fn parse(raw: &str) -> Result<Address> {
//!     Address::new(raw).map_err(CopyError::Configuration)
//! }
//! ```

pub mod address;
pub mod document;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use address::Address;
pub use document::{Document, REVISION_KEY};
pub use errors::CopyError;
pub use result::Result;
