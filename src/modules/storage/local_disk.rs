//! Local filesystem disk
//!
//! Stores objects below a configured root directory, mirroring the key
//! layout of the S3 disk (visibility prefix + media path). Direct URLs
//! are built from a configured base URL; there is no signing, so the
//! presigned URL of a local object is just its direct URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::config::LocalDiskConfig;
use crate::core::error::AppError;
use crate::modules::storage::disk::{Disk, Visibility};
use crate::shared::constants::LOCAL_DISK;

pub struct LocalDisk {
    root: PathBuf,
    base_url: String,
}

impl LocalDisk {
    pub fn new(config: &LocalDiskConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, key: &str) -> Result<PathBuf, AppError> {
        // Keys are built from sanitised file names and UUIDs, but reject
        // traversal outright in case a caller hands us a raw key.
        if key.split('/').any(|part| part == "..") {
            return Err(AppError::BadRequest(format!("Invalid object key: {}", key)));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Disk for LocalDisk {
    fn name(&self) -> &str {
        LOCAL_DISK
    }

    fn key_for(&self, visibility: Visibility, path: &str) -> String {
        format!("{}/{}", visibility.as_str(), path)
    }

    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<(), AppError> {
        let path = self.full_path(key)?;
        Self::ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            AppError::Internal(format!("Failed to create file '{}': {}", path.display(), e))
        })?;
        file.write_all(data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file '{}': {}", path.display(), e))
        })?;
        file.flush().await.map_err(|e| {
            AppError::Internal(format!("Failed to flush file '{}': {}", path.display(), e))
        })?;

        debug!("Wrote object '{}' to local disk", key);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.full_path(key)?;
        fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("Object '{}' not found on local disk", key))
            } else {
                AppError::Internal(format!("Failed to read file '{}': {}", path.display(), e))
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.full_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted object '{}' from local disk", key);
                Ok(())
            }
            // Deleting something already gone is not an error
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!(
                "Failed to delete file '{}': {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let path = self.full_path(key)?;
        fs::try_exists(&path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to check file '{}' exists: {}",
                path.display(),
                e
            ))
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    async fn presigned_url(&self, key: &str) -> Result<String, AppError> {
        Ok(self.url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_in(dir: &tempfile::TempDir) -> LocalDisk {
        LocalDisk::new(&LocalDiskConfig {
            root: dir.path().to_string_lossy().into_owned(),
            base_url: "http://localhost:3000/storage/".to_string(),
        })
    }

    #[tokio::test]
    async fn test_put_read_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk_in(&dir);

        let key = disk.key_for(Visibility::Public, "abc/document.txt");
        assert_eq!(key, "public/abc/document.txt");

        disk.put(&key, b"hello", "text/plain").await.unwrap();
        assert!(disk.exists(&key).await.unwrap());
        assert_eq!(disk.read(&key).await.unwrap(), b"hello");

        disk.delete(&key).await.unwrap();
        assert!(!disk.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk_in(&dir);

        let err = disk.read("public/nope.txt").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk_in(&dir);

        disk.delete("public/nope.txt").await.unwrap();
    }

    #[test]
    fn test_url_strips_trailing_slash_from_base() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk_in(&dir);

        assert_eq!(
            disk.url("public/abc/file.txt"),
            "http://localhost:3000/storage/public/abc/file.txt"
        );
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk_in(&dir);

        let err = disk.full_path("public/../../etc/passwd").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
