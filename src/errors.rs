use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Malformed content: {0}")]
    MalformedContent(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Storage backend failure: {0}")]
    Backend(String),

    #[error("Failed to serialize value: {0}")]
    Serialization(String),
}

// Generic implementation for AWS SDK errors
impl<E, R> From<SdkError<E, R>> for StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(error: SdkError<E, R>) -> Self {
        StorageError::Backend(DisplayErrorContext(&error).to_string())
    }
}

impl From<arrow::error::ArrowError> for StorageError {
    fn from(error: arrow::error::ArrowError) -> Self {
        StorageError::Serialization(format!("arrow: {error}"))
    }
}

impl From<parquet::errors::ParquetError> for StorageError {
    fn from(error: parquet::errors::ParquetError) -> Self {
        StorageError::Serialization(format!("parquet: {error}"))
    }
}
