use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::modules::storage::disk::Disk;
use crate::modules::storage::local_disk::LocalDisk;
use crate::modules::storage::s3_disk::S3Disk;

/// Resolves configured disk names to storage backends.
///
/// The local disk is always registered; the S3 disk only when configured.
/// The default disk name is validated at construction so a bad
/// `STORAGE_DEFAULT_DISK` fails at startup rather than on first upload.
#[derive(Debug)]
pub struct DiskManager {
    disks: HashMap<String, Arc<dyn Disk>>,
    default_disk: String,
}

impl DiskManager {
    pub async fn from_config(config: &StorageConfig) -> Result<Self, AppError> {
        let mut disks: HashMap<String, Arc<dyn Disk>> = HashMap::new();

        let local: Arc<dyn Disk> = Arc::new(LocalDisk::new(&config.local));
        disks.insert(local.name().to_string(), local);

        if let Some(s3_config) = &config.s3 {
            let s3: Arc<dyn Disk> = Arc::new(S3Disk::new(s3_config.clone()).await?);
            disks.insert(s3.name().to_string(), s3);
        }

        if !disks.contains_key(&config.default_disk) {
            return Err(AppError::UnknownDisk(config.default_disk.clone()));
        }

        info!(
            "Disk manager initialized: disks=[{}], default={}",
            disks.keys().cloned().collect::<Vec<_>>().join(", "),
            config.default_disk
        );

        Ok(Self {
            disks,
            default_disk: config.default_disk.clone(),
        })
    }

    /// Resolve a disk by name
    pub fn disk(&self, name: &str) -> Result<Arc<dyn Disk>, AppError> {
        self.disks
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::UnknownDisk(name.to_string()))
    }

    /// Name of the default disk
    pub fn default_disk(&self) -> &str {
        &self.default_disk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LocalDiskConfig;

    fn local_only_config(root: &str, default_disk: &str) -> StorageConfig {
        StorageConfig {
            default_disk: default_disk.to_string(),
            local: LocalDiskConfig {
                root: root.to_string(),
                base_url: "http://localhost:3000/storage".to_string(),
            },
            s3: None,
        }
    }

    #[tokio::test]
    async fn test_resolves_local_disk() {
        let dir = tempfile::tempdir().unwrap();
        let manager =
            DiskManager::from_config(&local_only_config(dir.path().to_str().unwrap(), "local"))
                .await
                .unwrap();

        assert_eq!(manager.default_disk(), "local");
        assert_eq!(manager.disk("local").unwrap().name(), "local");
    }

    #[tokio::test]
    async fn test_unknown_disk_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manager =
            DiskManager::from_config(&local_only_config(dir.path().to_str().unwrap(), "local"))
                .await
                .unwrap();

        let err = manager.disk("dropbox").unwrap_err();
        assert!(matches!(err, AppError::UnknownDisk(name) if name == "dropbox"));
    }

    #[tokio::test]
    async fn test_unresolvable_default_disk_fails_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            DiskManager::from_config(&local_only_config(dir.path().to_str().unwrap(), "s3"))
                .await
                .unwrap_err();

        assert!(matches!(err, AppError::UnknownDisk(name) if name == "s3"));
    }
}
