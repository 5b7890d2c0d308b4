//! Delete lifecycle: hard removal or partial redaction, chosen per object
//! from its `deletetype` metadata.
//!
//! ```text
//!          head metadata
//!                |
//!       deletetype == PARTIAL?
//!          /            \
//!        no              yes
//!        |                |
//!   delete object    redact content + metadata,
//!                    re-put, prune old versions
//!        \               /
//!      publish delete event (best effort)
//! ```

use crate::{
    errors::{StorageError, StorageResult},
    models::{
        delete_event::DeleteEvent,
        metadata::{
            DeleteType, LIFECYCLE_DELETED, ObjectMetadata, TYPE, decode_delete_type,
            decode_fixed_fields, mark_deleted,
        },
        storage_request::StorageRequest,
    },
    services::storage_service::StorageService,
};
use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, error, info};

/// In-content counterpart of the `lifecyclestate` metadata entry.
const CONTENT_LIFECYCLE_FIELD: &str = "lifecycleState";

impl StorageService {
    /// Delete `bucket_name/key` the way its metadata asks for.
    ///
    /// The delete event is published only after the delete itself succeeded,
    /// and a failed publish does not undo or fail the delete.
    pub async fn delete(&self, request: &StorageRequest) -> StorageResult<()> {
        let bucket = &request.bucket_name;
        let key = &request.key;
        info!("Remove file: {} from bucket: {}", key, bucket);

        let event = self.delete_by_type(bucket, key).await.inspect_err(|_| {
            error!("Fail to remove file: {} from bucket: {}", key, bucket)
        })?;
        info!("File {} is removed successfully ({:?}).", key, event.delete_type);

        if let Err(err) = self.publisher.publish(&event).await {
            error!(
                "delete of {}/{} succeeded but its event was not published: {}",
                bucket, key, err
            );
        }
        Ok(())
    }

    async fn delete_by_type(&self, bucket: &str, key: &str) -> StorageResult<DeleteEvent> {
        let metadata = self
            .gateway
            .head_metadata(bucket, key)
            .await?
            .ok_or_else(|| StorageError::new(format!("object {}/{} not found", bucket, key)))?;

        match decode_delete_type(&metadata) {
            DeleteType::Hard => self.hard_delete(bucket, key).await,
            DeleteType::Partial => self.partial_delete(bucket, key, &metadata).await,
        }
    }

    async fn hard_delete(&self, bucket: &str, key: &str) -> StorageResult<DeleteEvent> {
        self.gateway.delete_object(bucket, key, None).await?;
        Ok(DeleteEvent::hard(bucket, key))
    }

    async fn partial_delete(
        &self,
        bucket: &str,
        key: &str,
        metadata: &ObjectMetadata,
    ) -> StorageResult<DeleteEvent> {
        let fixed_fields = decode_fixed_fields(metadata)?;

        let content = self.gateway.get_object(bucket, key).await?;
        let content = match metadata.get(TYPE).map(String::as_str) {
            Some("json") => Bytes::from(redact_json(&content, &fixed_fields)?),
            _ => content,
        };

        self.gateway
            .put_object(bucket, key, content, mark_deleted(metadata))
            .await?;

        if self.gateway.is_versioning_enabled(bucket).await? {
            self.prune_old_versions(bucket, key).await?;
        }

        Ok(DeleteEvent::partial(bucket, key, fixed_fields))
    }

    /// Delete every version of `key` except the latest.
    async fn prune_old_versions(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let versions = self.gateway.list_versions(bucket, key).await?;
        for version in versions.iter().filter(|version| !version.is_latest) {
            debug!("pruning version {} of {}/{}", version.version_id, bucket, key);
            self.gateway
                .delete_object(bucket, key, Some(&version.version_id))
                .await?;
        }
        Ok(())
    }
}

/// Keep only `fixed_fields` of a JSON object and mark it deleted.
///
/// Field order of the surviving entries is preserved.
fn redact_json(content: &[u8], fixed_fields: &[String]) -> StorageResult<String> {
    let mut document: Value = serde_json::from_slice(content)?;
    let fields = document
        .as_object_mut()
        .ok_or_else(|| StorageError::new("partial delete requires a JSON object document"))?;

    fields.retain(|name, _| fixed_fields.iter().any(|fixed| fixed == name));
    fields.insert(
        CONTENT_LIFECYCLE_FIELD.to_string(),
        Value::String(LIFECYCLE_DELETED.to_string()),
    );

    Ok(serde_json::to_string(&document)?)
}
