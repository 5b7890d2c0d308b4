//! Addressing and payload for a single storage operation.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;

/// A file received for upload.
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Original file name as sent by the client; becomes the last key segment.
    pub file_name: String,
    pub content: Bytes,
}

/// Built fresh by the HTTP layer for each call.
#[derive(Clone, Debug, Default)]
pub struct StorageRequest {
    pub bucket_name: String,
    pub folder_path: String,
    pub key: String,
    pub custom_metadata: HashMap<String, String>,
    pub files: Vec<UploadFile>,
}

impl StorageRequest {
    /// Request addressing a single existing object.
    pub fn for_object(bucket_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    /// Request addressing a folder within a bucket.
    pub fn for_folder(bucket_name: impl Into<String>, folder_path: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            folder_path: folder_path.into(),
            ..Default::default()
        }
    }

    /// Key an uploaded file is stored under.
    pub fn upload_key(&self, file_name: &str) -> String {
        format!("{}/{}", self.folder_path, file_name)
    }

    /// Prefix that selects everything inside the folder.
    pub fn folder_prefix(&self) -> String {
        format!("{}/", self.folder_path)
    }
}

/// Outcome of storing one uploaded file.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}
