//! src/services/storage_service.rs
//!
//! StorageService: the operations exposed over HTTP, built on an
//! [`ObjectGateway`] for object I/O and a [`DeleteEventPublisher`] for
//! delete notifications. Upload and download live here; listing and the
//! delete lifecycle are in `listing.rs` and `lifecycle.rs`.

use crate::{
    errors::{StorageError, StorageResult},
    models::{
        metadata::{ObjectMetadata, upload_metadata},
        storage_request::{StorageRequest, UploadResult},
    },
    services::{
        gateway::{ObjectGateway, PutOutcome},
        notification::DeleteEventPublisher,
    },
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info};

/// Handles are shared; cloning is cheap and every clone talks to the same
/// backend and topic.
#[derive(Clone)]
pub struct StorageService {
    pub(crate) gateway: Arc<dyn ObjectGateway>,
    pub(crate) publisher: Arc<dyn DeleteEventPublisher>,
}

impl StorageService {
    pub fn new(gateway: Arc<dyn ObjectGateway>, publisher: Arc<dyn DeleteEventPublisher>) -> Self {
        Self { gateway, publisher }
    }

    /// Store every file of the request under `folder_path/file_name`.
    ///
    /// Files are written one after another. A failure stops the batch and
    /// leaves earlier files in place.
    pub async fn upload(&self, request: &StorageRequest) -> StorageResult<Vec<UploadResult>> {
        let bucket = &request.bucket_name;
        self.gateway.ensure_bucket(bucket).await?;

        let mut results = Vec::with_capacity(request.files.len());
        for file in &request.files {
            let key = request.upload_key(&file.file_name);
            info!(
                "uploading file: {} to bucket: {} with key: {}",
                file.file_name, bucket, key
            );

            let outcome = self
                .put_with_metadata(request, &key, &file.file_name, file.content.clone())
                .await
                .inspect_err(|_| {
                    error!(
                        "Fail to upload file: {} in bucket: {}",
                        file.file_name, bucket
                    )
                })?;

            results.push(UploadResult {
                key,
                e_tag: outcome.e_tag,
                version_id: outcome.version_id,
            });
        }
        Ok(results)
    }

    async fn put_with_metadata(
        &self,
        request: &StorageRequest,
        key: &str,
        file_name: &str,
        content: Bytes,
    ) -> StorageResult<PutOutcome> {
        let existing = self
            .gateway
            .head_metadata(&request.bucket_name, key)
            .await?
            .unwrap_or_else(ObjectMetadata::new);
        let metadata = upload_metadata(existing, &request.custom_metadata, file_name);
        self.gateway
            .put_object(&request.bucket_name, key, content, metadata)
            .await
    }

    /// Full content of `bucket_name/key`.
    pub async fn download(&self, request: &StorageRequest) -> StorageResult<Bytes> {
        info!(
            "Download file: {} from bucket: {}",
            request.key, request.bucket_name
        );
        let content = self
            .gateway
            .get_object(&request.bucket_name, &request.key)
            .await
            .inspect_err(|_| {
                error!(
                    "Fail to download file: {} from bucket: {}",
                    request.key, request.bucket_name
                )
            })?;
        info!("File downloaded successfully.");
        Ok(content)
    }

    /// Content of `bucket_name/key` as UTF-8 text.
    pub async fn get_data(&self, request: &StorageRequest) -> StorageResult<String> {
        let content = self.download(request).await?;
        String::from_utf8(content.to_vec()).map_err(StorageError::from)
    }
}
