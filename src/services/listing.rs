//! Folder listing with optional metadata and single-key sort.

use crate::{
    errors::{StorageError, StorageResult},
    models::{
        file_summary::{FileSummary, SortSpec},
        storage_request::StorageRequest,
    },
    services::storage_service::StorageService,
};
use tracing::{error, warn};

impl StorageService {
    /// Summaries of every object under `folder_path/`.
    ///
    /// Costs one metadata round-trip per object. `sort` is `"field,direction"`;
    /// a spec that cannot be resolved leaves the listing order untouched.
    pub async fn list_files(
        &self,
        request: &StorageRequest,
        include_metadata: bool,
        sort: Option<&str>,
    ) -> StorageResult<Vec<FileSummary>> {
        let bucket = &request.bucket_name;
        let result = self.summaries(request, include_metadata).await;
        let mut summaries = result.inspect_err(|_| {
            error!(
                "Fail to list files from bucket: {} with folderPath: {}",
                bucket, request.folder_path
            )
        })?;

        if let Some(raw) = sort.filter(|raw| !raw.trim().is_empty()) {
            match SortSpec::parse(raw) {
                Some(spec) => spec.apply(&mut summaries),
                None => warn!("ignoring unusable sort `{}`", raw),
            }
        }
        Ok(summaries)
    }

    async fn summaries(
        &self,
        request: &StorageRequest,
        include_metadata: bool,
    ) -> StorageResult<Vec<FileSummary>> {
        let bucket = &request.bucket_name;
        let keys = self
            .gateway
            .list_keys(bucket, &request.folder_prefix())
            .await?;

        let mut summaries = Vec::with_capacity(keys.len());
        for key in keys {
            let metadata = self
                .gateway
                .head_metadata(bucket, &key)
                .await?
                .ok_or_else(|| {
                    StorageError::new(format!("object {}/{} disappeared while listing", bucket, key))
                })?;
            summaries.push(FileSummary::build(bucket, &key, metadata, include_metadata));
        }
        Ok(summaries)
    }
}
