//! Local filesystem backend.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use super::{ObjectBackend, unsupported};
use crate::core::models::Location;
use crate::errors::StorageError;

/// Reads and writes caller-supplied paths, relative or absolute.
#[derive(Debug, Default, Clone)]
pub struct LocalBackend;

impl LocalBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn local_path<'a>(location: &'a Location) -> Result<&'a Path, StorageError> {
    location
        .as_local_path()
        .ok_or_else(|| unsupported("local", location))
}

fn io_error(path: &Path, error: std::io::Error) -> StorageError {
    let message = format!("{}: {error}", path.display());
    if error.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(message)
    } else {
        StorageError::Backend(message)
    }
}

/// Directory to walk for `prefix` and whether it was implied.
///
/// Prefixes ending in a separator walk themselves; anything else walks its
/// parent so siblings sharing the string prefix are seen too. A bare relative
/// name walks `.` implicitly.
fn walk_root(prefix: &Path, prefix_str: &str) -> (PathBuf, bool) {
    if prefix_str.ends_with(std::path::MAIN_SEPARATOR) || prefix_str.ends_with('/') {
        return (prefix.to_path_buf(), false);
    }
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => (parent.to_path_buf(), false),
        _ => (PathBuf::from("."), true),
    }
}

#[async_trait]
impl ObjectBackend for LocalBackend {
    async fn read_bytes(&self, location: &Location) -> Result<Vec<u8>, StorageError> {
        let path = local_path(location)?;
        let buf = fs::read(path).await.map_err(|e| io_error(path, e))?;
        debug!(path = %path.display(), bytes = buf.len(), "read local file");
        Ok(buf)
    }

    async fn write_bytes(
        &self,
        location: &Location,
        body: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let path = local_path(location)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(|e| io_error(dir, e))?;
        }
        let mut f = fs::File::create(path).await.map_err(|e| io_error(path, e))?;
        f.write_all(&body).await.map_err(|e| io_error(path, e))?;
        f.flush().await.map_err(|e| io_error(path, e))?;
        debug!(path = %path.display(), bytes = body.len(), "wrote local file");
        Ok(())
    }

    async fn list(&self, prefix: &Location) -> Result<Vec<Location>, StorageError> {
        let prefix_path = local_path(prefix)?;
        let prefix_str = prefix_path.to_string_lossy();
        let (root, implicit_root) = walk_root(prefix_path, &prefix_str);

        let mut found = Vec::new();
        let mut pending = vec![root];
        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                // a prefix under a missing directory matches nothing, as in S3
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(&dir, e)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|e| io_error(&path, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                let path = if implicit_root {
                    path.strip_prefix(".").map(Path::to_path_buf).unwrap_or(path)
                } else {
                    path
                };
                if path.to_string_lossy().starts_with(prefix_str.as_ref()) {
                    found.push(path);
                }
            }
        }

        found.sort();
        debug!(prefix = %prefix_str, count = found.len(), "listed local files");
        Ok(found.into_iter().map(Location::Local).collect())
    }
}
