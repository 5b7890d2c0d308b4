//! The object-store seam.
//!
//! Everything above this trait works in terms of buckets, keys, bytes and
//! metadata maps; everything below it speaks a concrete SDK. Implementations
//! translate every backend failure into a [`StorageError`] carrying the
//! backend's message and never retry.

use crate::{errors::StorageResult, models::metadata::ObjectMetadata};
use async_trait::async_trait;
use bytes::Bytes;

/// What the backend reports back after a put.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PutOutcome {
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
}

/// One historical revision of an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
}

#[async_trait]
pub trait ObjectGateway: Send + Sync {
    /// Create the bucket unless it already exists.
    ///
    /// A concurrent creator winning the race is not an error.
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()>;

    /// Store `content` with `metadata`, replacing whatever is at `key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        metadata: ObjectMetadata,
    ) -> StorageResult<PutOutcome>;

    /// Full content of the current version.
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// User metadata without transferring content; `None` if there is no such object.
    async fn head_metadata(&self, bucket: &str, key: &str)
    -> StorageResult<Option<ObjectMetadata>>;

    /// Keys starting with `prefix`. Only the first page the backend returns.
    async fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete the current object, or one specific version of it.
    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> StorageResult<()>;

    /// Versions of exactly `key`.
    async fn list_versions(&self, bucket: &str, key: &str) -> StorageResult<Vec<ObjectVersion>>;

    async fn is_versioning_enabled(&self, bucket: &str) -> StorageResult<bool>;
}
