//! MinIO/S3-compatible disk
//!
//! Uses the rust-s3 crate for lightweight S3 operations. Objects are
//! keyed below a public or private prefix; public objects get direct
//! URLs on the public endpoint, private objects get presigned GET URLs.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::S3DiskConfig;
use crate::core::error::AppError;
use crate::modules::storage::disk::{Disk, Visibility};
use crate::shared::constants::S3_DISK;

pub struct S3Disk {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    presigned_url_expiry_secs: u32,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
    private_prefix: String,
}

impl S3Disk {
    /// Create a new S3 disk from configuration and make sure the bucket
    /// exists.
    pub async fn new(config: S3DiskConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create S3 bucket: {}", e)))?;

        // Path-style URLs for MinIO (http://endpoint/bucket, not http://bucket.endpoint)
        bucket.set_path_style();

        let disk = Self {
            bucket,
            region,
            credentials,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            public_prefix: config.public_prefix,
            private_prefix: config.private_prefix,
        };

        disk.ensure_bucket_exists().await?;

        info!(
            "S3 disk initialized for endpoint: {}, bucket: {}, public_prefix: {}, private_prefix: {}",
            disk.endpoint,
            disk.bucket.name(),
            disk.public_prefix,
            disk.private_prefix
        );

        Ok(disk)
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                // Bucket already exists - this is fine
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    Ok(())
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                    Ok(())
                }
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), AppError> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Internal(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    fn prefix(&self, visibility: Visibility) -> &str {
        match visibility {
            Visibility::Public => &self.public_prefix,
            Visibility::Private => &self.private_prefix,
        }
    }

    fn is_public_key(&self, key: &str) -> bool {
        key.starts_with(&format!("{}/", self.public_prefix))
    }
}

#[async_trait]
impl Disk for S3Disk {
    fn name(&self) -> &str {
        S3_DISK
    }

    fn key_for(&self, visibility: Visibility, path: &str) -> String {
        format!("{}/{}", self.prefix(visibility), path)
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload object '{}': {}", key, e)))?;

        debug!(
            "Uploaded object '{}' to bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let response = self.bucket.get_object(key).await.map_err(|e| {
            AppError::Internal(format!("Failed to download object '{}': {}", key, e))
        })?;

        debug!(
            "Downloaded object '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(response.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete object '{}': {}", key, e)))?;

        debug!(
            "Deleted object '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Internal(format!(
                        "Failed to check object '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }

    fn url(&self, key: &str) -> String {
        if self.is_public_key(key) {
            format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
        } else {
            format!("{}/{}/{}", self.endpoint, self.bucket.name(), key)
        }
    }

    async fn presigned_url(&self, key: &str) -> Result<String, AppError> {
        self.bucket
            .presign_get(key, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_disk() -> S3Disk {
        S3Disk::new(S3DiskConfig {
            endpoint: "http://localhost:9000".to_string(),
            public_endpoint: "https://cdn.example.com".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "media-uploads".to_string(),
            region: "us-east-1".to_string(),
            public_prefix: "public".to_string(),
            private_prefix: "private".to_string(),
            presigned_url_expiry_secs: 3600,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_key_for_applies_visibility_prefix() {
        let disk = test_disk().await;
        assert_eq!(
            disk.key_for(Visibility::Public, "abc/file.png"),
            "public/abc/file.png"
        );
        assert_eq!(
            disk.key_for(Visibility::Private, "abc/file.png"),
            "private/abc/file.png"
        );
    }

    #[tokio::test]
    async fn test_url_uses_public_endpoint_for_public_keys() {
        let disk = test_disk().await;
        assert_eq!(
            disk.url("public/abc/file.png"),
            "https://cdn.example.com/media-uploads/public/abc/file.png"
        );
        assert_eq!(
            disk.url("private/abc/file.png"),
            "http://localhost:9000/media-uploads/private/abc/file.png"
        );
    }
}
