//! User metadata stored alongside each object, and the codec that reads the
//! lifecycle fields out of it.
//!
//! The object store only knows a flat `String -> String` map. This module is
//! the one place that knows which keys carry meaning:
//!
//! | key              | meaning                                         |
//! |------------------|-------------------------------------------------|
//! | `name`           | original file name                              |
//! | `type`           | file extension, e.g. `json`                     |
//! | `deletetype`     | `HARD` or `PARTIAL`                             |
//! | `fixedfields`    | comma-separated JSON fields kept on partial delete |
//! | `lifecyclestate` | free-text lifecycle marker, e.g. `SUBMITTED`     |

use crate::errors::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key-value metadata attached to an object.
pub type ObjectMetadata = HashMap<String, String>;

pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const DELETE_TYPE: &str = "deletetype";
pub const FIXED_FIELDS: &str = "fixedfields";
pub const LIFECYCLE_STATE: &str = "lifecyclestate";

/// The only lifecycle state this service ever writes.
pub const LIFECYCLE_DELETED: &str = "DELETED";

/// How an object is removed when a delete is requested.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeleteType {
    Hard,
    Partial,
}

/// `PARTIAL` only on an exact, case-sensitive match; anything else is a hard delete.
pub fn decode_delete_type(metadata: &ObjectMetadata) -> DeleteType {
    match metadata.get(DELETE_TYPE).map(String::as_str) {
        Some("PARTIAL") => DeleteType::Partial,
        _ => DeleteType::Hard,
    }
}

/// Field names preserved by a partial delete.
///
/// A partial-delete object without usable `fixedfields` is rejected rather
/// than redacted down to nothing.
pub fn decode_fixed_fields(metadata: &ObjectMetadata) -> StorageResult<Vec<String>> {
    let raw = metadata
        .get(FIXED_FIELDS)
        .ok_or_else(|| StorageError::new("partial delete requires `fixedfields` metadata"))?;

    let fields: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();

    if fields.is_empty() {
        return Err(StorageError::new(
            "partial delete requires non-empty `fixedfields` metadata",
        ));
    }
    Ok(fields)
}

/// Metadata written for an uploaded file.
///
/// Layers, lowest to highest precedence: whatever is already stored at the
/// key, the caller's custom metadata, then the system-assigned `name`/`type`.
pub fn upload_metadata(
    existing: ObjectMetadata,
    custom: &HashMap<String, String>,
    file_name: &str,
) -> ObjectMetadata {
    let mut metadata = existing;
    metadata.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
    metadata.insert(NAME.to_string(), file_name.to_string());
    match file_extension(file_name) {
        Some(ext) => metadata.insert(TYPE.to_string(), ext.to_string()),
        None => metadata.remove(TYPE),
    };
    metadata
}

/// Copy of `metadata` with the lifecycle marker set to `DELETED`.
pub fn mark_deleted(metadata: &ObjectMetadata) -> ObjectMetadata {
    let mut updated = metadata.clone();
    updated.insert(LIFECYCLE_STATE.to_string(), LIFECYCLE_DELETED.to_string());
    updated
}

fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
