// src/core/toolkit/accessor.rs

//! Pure read/write operations on a single field of a record document.
//!
//! None of these functions touch storage. Writers return a new document and the
//! caller decides whether to persist it. Keys they do not name are carried over
//! verbatim and in their original order.

use crate::core::value::{Document, FieldValue};

/// Reads a field.
pub fn get<'a>(document: &'a Document, field: &str) -> Option<&'a FieldValue> {
    document.get(field)
}

/// Writes a field, appending it if it did not exist. An existing field keeps
/// its position.
pub fn set(document: &Document, field: &str, value: FieldValue) -> Document {
    let mut updated = document.clone();
    updated.insert(field.to_string(), value);
    updated
}

/// Renames `old_field` to `new_field` in place.
///
/// Returns `None` when `old_field` is absent or `new_field` already exists, so a
/// rename can never produce a duplicate key or overwrite another field.
pub fn rename(document: &Document, old_field: &str, new_field: &str) -> Option<Document> {
    if !document.contains_key(old_field) || document.contains_key(new_field) {
        return None;
    }
    Some(
        document
            .iter()
            .map(|(key, value)| {
                let key = if key == old_field { new_field } else { key.as_str() };
                (key.to_string(), value.clone())
            })
            .collect(),
    )
}

/// Removes a field. Returns `None` when the field is absent.
pub fn drop(document: &Document, field: &str) -> Option<Document> {
    if !document.contains_key(field) {
        return None;
    }
    let mut updated = document.clone();
    updated.shift_remove(field);
    Some(updated)
}
