//! Recursive bucket listing filtered by file extension.
//!
//! Object stores have no real folders: a single prefix enumeration already
//! covers every nesting depth below the prefix. Given
//!
//! ```text
//! my-bucket/
//! └── processed_day=1/
//!     ├── IdClient=1/file1.parquet
//!     └── IdClient=2/file3.parquet
//! ```
//!
//! listing prefix `processed_day=1` yields both files as `s3://` URIs.
//!
//! Two policies are offered through [`Enumerate`]: [`StrictListing`] reports
//! every failure, [`LenientListing`] turns any failure, and a prefix with no
//! objects at all, into `None`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::core::models::Location;
use crate::errors::StorageError;
use crate::storage::{ObjectBackend, Storage};

/// Enumerates a bucket prefix into fully qualified object URIs.
#[async_trait]
pub trait Enumerate {
    type Output;

    async fn enumerate(&self, bucket: &str, prefix: &str) -> Self::Output;
}

/// Keys under `prefix` ending in `extension`, in backend order.
async fn matching_uris(
    backend: &dyn ObjectBackend,
    bucket: &str,
    prefix: &str,
    extension: &str,
) -> Result<Option<Vec<String>>, StorageError> {
    let objects = backend.list(&Location::remote(bucket, prefix)).await?;
    if objects.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        objects
            .into_iter()
            .filter(|location| match location {
                Location::Remote { key, .. } => key.ends_with(extension),
                Location::Local(_) => false,
            })
            .map(|location| location.to_string())
            .collect(),
    ))
}

pub struct StrictListing {
    backend: Arc<dyn ObjectBackend>,
    extension: String,
}

impl StrictListing {
    pub fn new(backend: Arc<dyn ObjectBackend>, extension: impl Into<String>) -> Self {
        Self {
            backend,
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl Enumerate for StrictListing {
    type Output = Result<Vec<String>, StorageError>;

    async fn enumerate(&self, bucket: &str, prefix: &str) -> Self::Output {
        let uris = matching_uris(self.backend.as_ref(), bucket, prefix, &self.extension).await?;
        Ok(uris.unwrap_or_default())
    }
}

pub struct LenientListing {
    backend: Arc<dyn ObjectBackend>,
    extension: String,
}

impl LenientListing {
    pub fn new(backend: Arc<dyn ObjectBackend>, extension: impl Into<String>) -> Self {
        Self {
            backend,
            extension: extension.into(),
        }
    }
}

#[async_trait]
impl Enumerate for LenientListing {
    type Output = Option<Vec<String>>;

    async fn enumerate(&self, bucket: &str, prefix: &str) -> Self::Output {
        match matching_uris(self.backend.as_ref(), bucket, prefix, &self.extension).await {
            Ok(uris) => uris,
            Err(e) => {
                debug!(bucket, prefix, error = %e, "listing failed, reporting nothing found");
                None
            }
        }
    }
}

impl Storage {
    #[must_use]
    pub fn strict_listing(&self) -> StrictListing {
        StrictListing::new(self.remote(), self.list_extension())
    }

    #[must_use]
    pub fn lenient_listing(&self) -> LenientListing {
        LenientListing::new(self.remote(), self.list_extension())
    }

    /// All objects under `prefix` in `bucket` with the configured extension,
    /// as `s3://bucket/key` URIs. Returns `None` on any failure or when the
    /// prefix holds no objects.
    pub async fn list_uris(&self, prefix: &str, bucket: &str) -> Option<Vec<String>> {
        self.lenient_listing().enumerate(bucket, prefix).await
    }

    /// Strict form of [`Storage::list_uris`].
    ///
    /// # Errors
    ///
    /// Returns the backend's error if enumeration fails.
    pub async fn try_list_uris(&self, prefix: &str, bucket: &str) -> Result<Vec<String>, StorageError> {
        self.strict_listing().enumerate(bucket, prefix).await
    }
}
