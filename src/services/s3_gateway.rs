//! [`ObjectGateway`] backed by Amazon S3 (or any S3-compatible endpoint)
//! through `aws-sdk-s3`.

use crate::{
    errors::{StorageError, StorageResult},
    models::metadata::ObjectMetadata,
    services::gateway::{ObjectGateway, ObjectVersion, PutOutcome},
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration},
};
use bytes::Bytes;
use tracing::{debug, info, warn};

/// Region that rejects an explicit location constraint on bucket creation.
const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone, Debug)]
pub struct S3Gateway {
    client: Client,
    region: String,
}

impl S3Gateway {
    pub fn new(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

/// Wrap an SDK failure, keeping the full error chain in the message.
fn backend_error(action: &str, target: &str, err: impl std::error::Error) -> StorageError {
    StorageError::new(format!(
        "failed to {} {}: {}",
        action,
        target,
        DisplayErrorContext(err)
    ))
}

#[async_trait]
impl ObjectGateway for S3Gateway {
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => return Ok(()),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {}
            Err(err) => return Err(backend_error("check bucket", bucket, err)),
        }

        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!("created bucket {}", bucket);
                Ok(())
            }
            Err(err)
                if err.as_service_error().is_some_and(|e| {
                    e.is_bucket_already_owned_by_you() || e.is_bucket_already_exists()
                }) =>
            {
                debug!("bucket {} was created concurrently", bucket);
                Ok(())
            }
            Err(err) => Err(backend_error("create bucket", bucket, err)),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        metadata: ObjectMetadata,
    ) -> StorageResult<PutOutcome> {
        debug!("S3 PUT: {}/{} ({} bytes)", bucket, key, content.len());
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(content.len() as i64)
            .set_metadata(Some(metadata))
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|err| backend_error("upload", &format!("{}/{}", bucket, key), err))?;

        Ok(PutOutcome {
            e_tag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        debug!("S3 GET: {}/{}", bucket, key);
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| backend_error("download", &format!("{}/{}", bucket, key), err))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|err| backend_error("read body of", &format!("{}/{}", bucket, key), err))?;
        Ok(data.into_bytes())
    }

    async fn head_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> StorageResult<Option<ObjectMetadata>> {
        debug!("S3 HEAD: {}/{}", bucket, key);
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => Ok(Some(output.metadata().cloned().unwrap_or_default())),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(None),
            Err(err) => Err(backend_error(
                "read metadata of",
                &format!("{}/{}", bucket, key),
                err,
            )),
        }
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        debug!("S3 LIST: {}/{}", bucket, prefix);
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|err| backend_error("list", &format!("{}/{}", bucket, prefix), err))?;

        if output.is_truncated().unwrap_or(false) {
            warn!(
                "listing of {}/{} is truncated; only the first page is returned",
                bucket, prefix
            );
        }

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect())
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> StorageResult<()> {
        debug!("S3 DELETE: {}/{} version {:?}", bucket, key, version_id);
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(str::to_string))
            .send()
            .await
            .map_err(|err| backend_error("delete", &format!("{}/{}", bucket, key), err))?;
        Ok(())
    }

    async fn list_versions(&self, bucket: &str, key: &str) -> StorageResult<Vec<ObjectVersion>> {
        let output = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .prefix(key)
            .send()
            .await
            .map_err(|err| {
                backend_error("list versions of", &format!("{}/{}", bucket, key), err)
            })?;

        if output.is_truncated().unwrap_or(false) {
            warn!(
                "version listing of {}/{} is truncated; only the first page is returned",
                bucket, key
            );
        }

        // The prefix also matches longer keys such as `a.json.bak`.
        Ok(output
            .versions()
            .iter()
            .filter(|version| version.key() == Some(key))
            .filter_map(|version| {
                Some(ObjectVersion {
                    key: key.to_string(),
                    version_id: version.version_id()?.to_string(),
                    is_latest: version.is_latest().unwrap_or(false),
                })
            })
            .collect())
    }

    async fn is_versioning_enabled(&self, bucket: &str) -> StorageResult<bool> {
        let output = self
            .client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| backend_error("read versioning of", bucket, err))?;
        Ok(matches!(
            output.status(),
            Some(BucketVersioningStatus::Enabled)
        ))
    }
}
