//! Document model
//!
//! A document is one record of the collection being copied: a JSON object
//! whose values are arbitrary JSON.

use serde_json::{Map, Value};

/// One record, keyed by field name
pub type Document = Map<String, Value>;

/// Revision token CouchDB attaches to every document.
///
/// Replaying it against another database triggers 409/412 conflicts, so it is
/// stripped before delivery.
pub const REVISION_KEY: &str = "_rev";
