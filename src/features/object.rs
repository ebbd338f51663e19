//! Opaque serialized objects (bincode) on local disk or in a bucket.
//!
//! No compatibility is promised across versions of the serialized type or of
//! bincode itself; callers own that.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::models::Location;
use crate::errors::StorageError;
use crate::storage::Storage;
use crate::utils::mime::content_type_for;

/// # Errors
///
/// Returns `Serialization` if `value` cannot be encoded.
pub fn to_object_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StorageError> {
    bincode::serialize(value).map_err(|e| StorageError::Serialization(format!("bincode: {e}")))
}

/// # Errors
///
/// Returns `MalformedContent` for corrupt or incompatible bytes.
pub fn from_object_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    bincode::deserialize(bytes).map_err(|e| StorageError::MalformedContent(format!("bincode: {e}")))
}

impl Storage {
    /// Loads a serialized object from `location`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing file or key, `MalformedContent` if the
    /// bytes do not decode as `T`, or the backend's error.
    pub async fn load_object<T: DeserializeOwned>(&self, location: &Location) -> Result<T, StorageError> {
        let bytes = self.read_bytes(location).await?;
        from_object_bytes(&bytes)
    }

    /// Serializes `value` and writes it to `location`.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if `value` cannot be encoded, or the backend's error.
    pub async fn save_object<T: Serialize + ?Sized>(
        &self,
        value: &T,
        location: &Location,
    ) -> Result<(), StorageError> {
        let body = to_object_bytes(value)?;
        let content_type = location.file_name().map(content_type_for);
        self.write_bytes(location, body, content_type.as_deref()).await
    }
}
