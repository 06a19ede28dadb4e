//! Structural query matching
//!
//! A query is itself a document. A candidate matches when every query key exists in
//! the candidate with an equal value. Objects on both sides recurse, so a nested
//! query only has to name the nested fields it cares about. No type coercion:
//! `"1"` never matches `1`.

use serde_json::Value;

use super::document::Document;

/// Checks whether `document` is a structural superset of `query`
pub fn matches(document: &Document, query: &Document) -> bool {
    query.iter().all(|(field, expected)| match document.get(field) {
        Some(actual) => value_matches(actual, expected),
        None => false,
    })
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => matches(actual, expected),
        _ => actual == expected,
    }
}
