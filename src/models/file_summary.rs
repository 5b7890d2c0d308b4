//! Per-object listing projection and the sort applied to listings.

use crate::models::metadata::{NAME, ObjectMetadata, TYPE};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One row of a folder listing, derived from an object's key and metadata.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub bucket_name: String,

    pub key: String,

    /// Original file name, from the `name` metadata entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// File extension, from the `type` metadata entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    /// Full user metadata, only populated when the caller asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_metadata: Option<HashMap<String, String>>,
}

impl FileSummary {
    pub fn build(
        bucket_name: &str,
        key: &str,
        metadata: ObjectMetadata,
        include_custom: bool,
    ) -> Self {
        Self {
            bucket_name: bucket_name.to_string(),
            key: key.to_string(),
            file_name: metadata.get(NAME).cloned(),
            file_type: metadata.get(TYPE).cloned(),
            custom_metadata: include_custom.then_some(metadata),
        }
    }
}

type Accessor = fn(&FileSummary) -> Option<&str>;

/// Sortable properties, by their serialized name.
const SORT_FIELDS: [(&str, Accessor); 4] = [
    ("bucketName", bucket_name_of),
    ("key", key_of),
    ("fileName", file_name_of),
    ("fileType", file_type_of),
];

fn bucket_name_of(summary: &FileSummary) -> Option<&str> {
    Some(&summary.bucket_name)
}

fn key_of(summary: &FileSummary) -> Option<&str> {
    Some(&summary.key)
}

fn file_name_of(summary: &FileSummary) -> Option<&str> {
    summary.file_name.as_deref()
}

fn file_type_of(summary: &FileSummary) -> Option<&str> {
    summary.file_type.as_deref()
}

/// A resolved `field,direction` sort request.
#[derive(Clone, Copy)]
pub struct SortSpec {
    field: &'static str,
    accessor: Accessor,
    descending: bool,
}

impl std::fmt::Debug for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortSpec")
            .field("field", &self.field)
            .field("descending", &self.descending)
            .finish()
    }
}

impl SortSpec {
    /// Resolve `"field,direction"`.
    ///
    /// Returns `None` for a blank spec, for anything other than exactly two
    /// tokens, and for a field that is not a sortable property. Direction
    /// `desc` (any case) sorts descending; every other value sorts ascending.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let tokens: Vec<&str> = raw.split(',').map(str::trim).collect();
        let [field, direction] = tokens.as_slice() else {
            return None;
        };

        let (field, accessor) = SORT_FIELDS
            .iter()
            .find(|(name, _)| name == field)
            .copied()?;

        Some(Self {
            field,
            accessor,
            descending: direction.eq_ignore_ascii_case("desc"),
        })
    }

    /// Stable sort; entries without a value for the field go last whichever
    /// way the sort runs.
    pub fn apply(&self, summaries: &mut [FileSummary]) {
        summaries.sort_by(|a, b| {
            match ((self.accessor)(a), (self.accessor)(b)) {
                (Some(x), Some(y)) if self.descending => y.cmp(x),
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    }
}
