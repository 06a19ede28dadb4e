//! Schema-less documents and identity extraction.

use serde_json::{Map, Value};

/// Field every stored document must carry
pub const ID_FIELD: &str = "_id";

/// An opaque field-name → value mapping
pub type Document = Map<String, Value>;

/// Extract the identity of a document.
///
/// Strings are used as-is; numbers are rendered with their JSON representation so
/// `{"_id": 7}` and `{"_id": "7"}` address the same key. Anything else (missing,
/// null, empty string, objects) has no identity.
pub fn document_id(document: &Document) -> Option<String> {
    match document.get(ID_FIELD)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a document from a JSON value, returning `None` for non-objects
pub fn from_value(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
