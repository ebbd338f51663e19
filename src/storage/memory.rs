//! In-process bucket store implementing `ObjectBackend`.
//!
//! Buckets must be created before use, mirroring S3's `NoSuchBucket`
//! failure for unknown names.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{ObjectBackend, unsupported};
use crate::core::models::Location;
use crate::errors::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct Buckets {
    names: BTreeSet<String>,
    objects: BTreeMap<(String, String), StoredObject>,
}

impl Buckets {
    fn ensure_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if self.names.contains(bucket) {
            Ok(())
        } else {
            Err(StorageError::Backend(format!(
                "NoSuchBucket: the specified bucket does not exist: {bucket}"
            )))
        }
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Buckets>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_bucket(&self, bucket: &str) {
        self.inner.write().await.names.insert(bucket.to_string());
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.inner
            .read()
            .await
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.objects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn bucket_and_key(location: &Location) -> Result<(&str, &str), StorageError> {
    match location {
        Location::Remote { bucket, key } => Ok((bucket, key)),
        Location::Local(_) => Err(unsupported("memory", location)),
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn read_bytes(&self, location: &Location) -> Result<Vec<u8>, StorageError> {
        let (bucket, key) = bucket_and_key(location)?;
        let buckets = self.inner.read().await;
        buckets.ensure_bucket(bucket)?;
        buckets
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|object| object.body.clone())
            .ok_or_else(|| StorageError::NotFound(location.to_string()))
    }

    async fn write_bytes(
        &self,
        location: &Location,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let (bucket, key) = bucket_and_key(location)?;
        let mut buckets = self.inner.write().await;
        buckets.ensure_bucket(bucket)?;
        buckets.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn list(&self, prefix: &Location) -> Result<Vec<Location>, StorageError> {
        let (bucket, prefix) = bucket_and_key(prefix)?;
        let buckets = self.inner.read().await;
        buckets.ensure_bucket(bucket)?;
        Ok(buckets
            .objects
            .keys()
            .filter(|(b, key)| b == bucket && key.starts_with(prefix))
            .map(|(b, key)| Location::remote(b.as_str(), key.as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_bucket_fails_like_s3() {
        let backend = MemoryBackend::new();
        let err = backend
            .write_bytes(&Location::remote("missing", "k"), vec![1], None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend(msg) if msg.contains("NoSuchBucket")));
    }

    #[tokio::test]
    async fn keeps_content_type() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b").await;
        backend
            .write_bytes(&Location::remote("b", "img.png"), vec![0], Some("image/png"))
            .await
            .unwrap();
        let stored = backend.object("b", "img.png").await.unwrap();
        assert_eq!(stored.content_type.as_deref(), Some("image/png"));
        assert!(!backend.is_empty().await);
    }
}
