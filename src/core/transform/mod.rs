//! Document normalization
//!
//! Documents copied from one database into another must not carry the source
//! revision: CouchDB would treat `_rev` as an update of an existing document
//! and reject the write as a conflict on a fresh target.

use crate::domain::{Document, REVISION_KEY};

/// Prepare a decoded document for delivery by removing its `_rev` member.
///
/// All other members, `_id` included, are left untouched.
///
/// # Examples
///
/// ```
/// use couchcopy::core::transform::normalize;
/// use serde_json::json;
///
/// let doc = json!({"_id": "a", "_rev": "3-abc", "n": 1});
/// let doc = normalize(doc.as_object().unwrap().clone());
/// assert!(doc.get("_rev").is_none());
/// assert_eq!(doc["_id"], "a");
/// ```
pub fn normalize(mut doc: Document) -> Document {
    doc.remove(REVISION_KEY);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_removes_revision() {
        let normalized = normalize(doc(json!({"_id": "a", "_rev": "1-x", "v": [1, 2]})));
        assert_eq!(normalized, doc(json!({"_id": "a", "v": [1, 2]})));
    }

    #[test]
    fn test_document_without_revision_unchanged() {
        let original = doc(json!({"_id": "b", "nested": {"_rev": "kept"}}));
        assert_eq!(normalize(original.clone()), original);
    }

    #[test]
    fn test_only_top_level_revision_removed() {
        let normalized = normalize(doc(json!({"_rev": "2-y", "child": {"_rev": "inner"}})));
        assert_eq!(normalized["child"]["_rev"], "inner");
        assert!(!normalized.contains_key("_rev"));
    }
}
