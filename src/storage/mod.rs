//! Byte-level storage backends
//!
//! Submodules:
//! - `local`: local filesystem backend
//! - `s3`: S3-compatible backend built on `aws-sdk-s3`
//! - `memory`: in-process bucket store, used as a fake remote
//!
//! `Storage` owns one local and one remote backend and routes each call by
//! the variant of the `Location` it is given. Format-specific operations
//! (JSON, serialized objects, tables, images, listing) live in `features`.

pub mod local;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::config::StorageConfig;
use crate::core::models::Location;
use crate::errors::StorageError;

pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use s3::S3Backend;

/// Capability set shared by every backend.
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Reads the whole object at `location`.
    async fn read_bytes(&self, location: &Location) -> Result<Vec<u8>, StorageError>;

    /// Replaces the object at `location` with `body`.
    async fn write_bytes(
        &self,
        location: &Location,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Every object whose name starts with `prefix`, at any depth.
    async fn list(&self, prefix: &Location) -> Result<Vec<Location>, StorageError>;
}

pub(crate) fn unsupported(backend: &str, location: &Location) -> StorageError {
    StorageError::Precondition(format!("{backend} backend cannot address {location}"))
}

/// Entry point for all load/save operations.
#[derive(Clone)]
pub struct Storage {
    local: Arc<LocalBackend>,
    remote: Arc<dyn ObjectBackend>,
    list_extension: String,
}

impl Storage {
    /// Uses `remote` for every `Location::Remote`, with default settings.
    pub fn new(remote: Arc<dyn ObjectBackend>) -> Self {
        Self {
            local: Arc::new(LocalBackend::new()),
            remote,
            list_extension: crate::core::config::DEFAULT_LIST_EXTENSION.to_string(),
        }
    }

    /// Builds an S3-backed storage from `config`.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let remote = S3Backend::from_config(config).await;
        Self::new(Arc::new(remote)).with_list_extension(config.list_extension.clone())
    }

    #[must_use]
    pub fn with_list_extension(mut self, extension: impl Into<String>) -> Self {
        self.list_extension = extension.into();
        self
    }

    #[must_use]
    pub fn list_extension(&self) -> &str {
        &self.list_extension
    }

    #[must_use]
    pub fn remote(&self) -> Arc<dyn ObjectBackend> {
        Arc::clone(&self.remote)
    }

    /// Picks the backend able to address `location`.
    #[must_use]
    pub fn backend_for(&self, location: &Location) -> &dyn ObjectBackend {
        match location {
            Location::Local(_) => self.local.as_ref(),
            Location::Remote { .. } => self.remote.as_ref(),
        }
    }

    /// # Errors
    ///
    /// Returns `NotFound` if nothing exists at `location`, or the backend's error.
    pub async fn read_bytes(&self, location: &Location) -> Result<Vec<u8>, StorageError> {
        self.backend_for(location).read_bytes(location).await
    }

    /// # Errors
    ///
    /// Returns the backend's error if the write fails.
    pub async fn write_bytes(
        &self,
        location: &Location,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.backend_for(location)
            .write_bytes(location, body, content_type)
            .await
    }

    /// # Errors
    ///
    /// Returns the backend's error if enumeration fails.
    pub async fn list(&self, prefix: &Location) -> Result<Vec<Location>, StorageError> {
        self.backend_for(prefix).list(prefix).await
    }
}
