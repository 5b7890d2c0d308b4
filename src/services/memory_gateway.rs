//! In-memory [`ObjectGateway`] for tests.
//!
//! Keeps every version of every object, so versioned and unversioned buckets
//! behave like S3 closely enough for the lifecycle flows. Each call is
//! recorded, and individual operations can be made to fail.

use crate::{
    errors::{StorageError, StorageResult},
    models::metadata::ObjectMetadata,
    services::gateway::{ObjectGateway, ObjectVersion, PutOutcome},
};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct StoredVersion {
    pub version_id: String,
    pub content: Bytes,
    pub metadata: ObjectMetadata,
}

/// A recorded gateway call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    HeadBucket(String),
    CreateBucket(String),
    Put { bucket: String, key: String },
    Get { bucket: String, key: String },
    Head { bucket: String, key: String },
    List { bucket: String, prefix: String },
    Delete {
        bucket: String,
        key: String,
        version_id: Option<String>,
    },
    ListVersions { bucket: String, key: String },
    VersioningStatus(String),
}

/// Operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Put,
    Get,
    Head,
    List,
    Delete,
    ListVersions,
}

#[derive(Default)]
struct State {
    buckets: HashSet<String>,
    versioned: HashSet<String>,
    /// (bucket, key) -> versions, oldest first.
    objects: BTreeMap<(String, String), Vec<StoredVersion>>,
    calls: Vec<Call>,
    failing: HashSet<Op>,
    latest_listed_second: bool,
}

#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str, versioned: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.buckets.insert(bucket.to_string());
            if versioned {
                state.versioned.insert(bucket.to_string());
            }
        }
        self
    }

    /// List versions with the latest one in second place instead of first.
    pub fn with_latest_listed_second(self) -> Self {
        self.state.lock().unwrap().latest_listed_second = true;
        self
    }

    /// Seed an object without recording a call.
    pub fn seed(&self, bucket: &str, key: &str, content: &str, metadata: &[(&str, &str)]) {
        let metadata = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.store(bucket, key, Bytes::from(content.to_string()), metadata);
    }

    /// Seed explicit versions, oldest first; the last one is the latest.
    pub fn seed_versions(&self, bucket: &str, key: &str, version_ids: &[&str]) {
        let mut state = self.state.lock().unwrap();
        let versions = state
            .objects
            .entry((bucket.to_string(), key.to_string()))
            .or_default();
        for id in version_ids {
            versions.push(StoredVersion {
                version_id: id.to_string(),
                content: Bytes::new(),
                metadata: ObjectMetadata::new(),
            });
        }
    }

    pub fn fail_on(&self, op: Op) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Version ids passed to versioned deletes, in call order.
    pub fn deleted_versions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete {
                    version_id: Some(id),
                    ..
                } => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn latest(&self, bucket: &str, key: &str) -> Option<StoredVersion> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .and_then(|versions| versions.last().cloned())
    }

    pub fn version_ids(&self, bucket: &str, key: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|versions| versions.iter().map(|v| v.version_id.clone()).collect())
            .unwrap_or_default()
    }

    fn store(&self, bucket: &str, key: &str, content: Bytes, metadata: ObjectMetadata) -> String {
        let mut state = self.state.lock().unwrap();
        let versioned = state.versioned.contains(bucket);
        let version_id = Uuid::new_v4().to_string();
        let versions = state
            .objects
            .entry((bucket.to_string(), key.to_string()))
            .or_default();
        if !versioned {
            versions.clear();
        }
        versions.push(StoredVersion {
            version_id: version_id.clone(),
            content,
            metadata,
        });
        version_id
    }

    fn record(&self, call: Call, op: Option<Op>) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match op {
            Some(op) if state.failing.contains(&op) => {
                Err(StorageError::new(format!("injected {:?} failure", op)))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectGateway for MemoryGateway {
    async fn ensure_bucket(&self, bucket: &str) -> StorageResult<()> {
        self.record(Call::HeadBucket(bucket.to_string()), None)?;
        let mut state = self.state.lock().unwrap();
        if !state.buckets.contains(bucket) {
            state.calls.push(Call::CreateBucket(bucket.to_string()));
            state.buckets.insert(bucket.to_string());
        }
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: Bytes,
        metadata: ObjectMetadata,
    ) -> StorageResult<PutOutcome> {
        self.record(
            Call::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            Some(Op::Put),
        )?;
        let versioned = self.state.lock().unwrap().versioned.contains(bucket);
        let version_id = self.store(bucket, key, content, metadata);
        Ok(PutOutcome {
            e_tag: Some(format!("etag-{}", version_id)),
            version_id: versioned.then_some(version_id),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.record(
            Call::Get {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            Some(Op::Get),
        )?;
        self.latest(bucket, key)
            .map(|version| version.content)
            .ok_or_else(|| StorageError::new(format!("no such key {}/{}", bucket, key)))
    }

    async fn head_metadata(
        &self,
        bucket: &str,
        key: &str,
    ) -> StorageResult<Option<ObjectMetadata>> {
        self.record(
            Call::Head {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            Some(Op::Head),
        )?;
        Ok(self.latest(bucket, key).map(|version| version.metadata))
    }

    async fn list_keys(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>> {
        self.record(
            Call::List {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
            },
            Some(Op::List),
        )?;
        let state = self.state.lock().unwrap();
        Ok(state
            .objects
            .iter()
            .filter(|((b, k), versions)| b == bucket && k.starts_with(prefix) && !versions.is_empty())
            .map(|((_, k), _)| k.clone())
            .collect())
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> StorageResult<()> {
        self.record(
            Call::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
                version_id: version_id.map(str::to_string),
            },
            Some(Op::Delete),
        )?;
        let mut state = self.state.lock().unwrap();
        let id = (bucket.to_string(), key.to_string());
        match version_id {
            Some(version_id) => {
                if let Some(versions) = state.objects.get_mut(&id) {
                    versions.retain(|v| v.version_id != version_id);
                }
            }
            None => {
                state.objects.remove(&id);
            }
        }
        Ok(())
    }

    async fn list_versions(&self, bucket: &str, key: &str) -> StorageResult<Vec<ObjectVersion>> {
        self.record(
            Call::ListVersions {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            Some(Op::ListVersions),
        )?;
        let state = self.state.lock().unwrap();
        let versions = state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default();
        let latest = versions.len().saturating_sub(1);
        // S3 lists newest first.
        let mut listed: Vec<ObjectVersion> = versions
            .into_iter()
            .enumerate()
            .rev()
            .map(|(index, version)| ObjectVersion {
                key: key.to_string(),
                version_id: version.version_id,
                is_latest: index == latest,
            })
            .collect();
        if state.latest_listed_second && listed.len() > 1 {
            listed.swap(0, 1);
        }
        Ok(listed)
    }

    async fn is_versioning_enabled(&self, bucket: &str) -> StorageResult<bool> {
        self.record(Call::VersioningStatus(bucket.to_string()), None)?;
        Ok(self.state.lock().unwrap().versioned.contains(bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unversioned_put_replaces_previous_content() {
        let gateway = MemoryGateway::new().with_bucket("b", false);
        gateway
            .put_object("b", "k", Bytes::from_static(b"one"), ObjectMetadata::new())
            .await
            .unwrap();
        gateway
            .put_object("b", "k", Bytes::from_static(b"two"), ObjectMetadata::new())
            .await
            .unwrap();

        assert_eq!(gateway.version_ids("b", "k").len(), 1);
        assert_eq!(gateway.get_object("b", "k").await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn versioned_put_keeps_history_and_marks_newest_latest() {
        let gateway = MemoryGateway::new().with_bucket("b", true);
        gateway.seed_versions("b", "k", &["old"]);
        let outcome = gateway
            .put_object("b", "k", Bytes::from_static(b"new"), ObjectMetadata::new())
            .await
            .unwrap();

        let versions = gateway.list_versions("b", "k").await.unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions[0].is_latest);
        assert_eq!(Some(versions[0].version_id.clone()), outcome.version_id);
        assert!(!versions[1].is_latest);
    }

    #[tokio::test]
    async fn injected_failures_are_recorded_then_returned() {
        let gateway = MemoryGateway::new();
        gateway.fail_on(Op::Get);
        assert!(gateway.get_object("b", "k").await.is_err());
        assert_eq!(gateway.calls().len(), 1);
    }
}
