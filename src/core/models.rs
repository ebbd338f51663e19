use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::StorageError;

pub const S3_SCHEME: &str = "s3";

/// Where a payload lives: a path on local disk or a key inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Local(PathBuf),
    Remote { bucket: String, key: String },
}

impl Location {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Location::Local(path.into())
    }

    pub fn remote(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Location::Remote {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parses `s3://bucket/key` into a remote location; anything else is a
    /// local path.
    ///
    /// # Errors
    ///
    /// Returns a precondition error for an `s3://` URI without a bucket.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let Some(rest) = raw.strip_prefix("s3://") else {
            return Ok(Location::local(raw));
        };
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(StorageError::Precondition(format!(
                "missing bucket name in {raw:?}"
            )));
        }
        Ok(Location::remote(bucket, key))
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote { .. })
    }

    /// Last path segment, used to guess content types.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Location::Local(path) => path.file_name().and_then(|name| name.to_str()),
            Location::Remote { key, .. } => key.rsplit('/').next().filter(|s| !s.is_empty()),
        }
    }

    #[must_use]
    pub fn as_local_path(&self) -> Option<&Path> {
        match self {
            Location::Local(path) => Some(path),
            Location::Remote { .. } => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Remote { bucket, key } => write!(f, "{S3_SCHEME}://{bucket}/{key}"),
        }
    }
}

impl FromStr for Location {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::parse(s)
    }
}
