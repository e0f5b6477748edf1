use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::media::dtos::{MediaResponseDto, VisibilityDto};
use crate::features::media::models::{Media, MediaModel};
use crate::features::media::services::MediaUploader;
use crate::modules::storage::{Disk, DiskManager, Visibility};
use crate::shared::types::PaginationQuery;

/// Service for media operations
pub struct MediaService {
    pool: PgPool,
    disks: Arc<DiskManager>,
}

impl MediaService {
    pub fn new(pool: PgPool, disks: Arc<DiskManager>) -> Self {
        Self { pool, disks }
    }

    /// Start a new upload targeting the default disk
    pub fn uploader(&self) -> Result<MediaUploader> {
        MediaUploader::new(self.pool.clone(), Arc::clone(&self.disks))
    }

    /// Fetch one media record
    pub async fn get(&self, id: Uuid) -> Result<MediaResponseDto> {
        let media = self.find(id).await?;
        self.to_response(media)
    }

    /// List media records, newest first
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<MediaResponseDto>, i64)> {
        let rows: Vec<Media> =
            sqlx::query_as("SELECT * FROM media ORDER BY created_at DESC LIMIT $1 OFFSET $2")
                .bind(pagination.limit())
                .bind(pagination.offset())
                .fetch_all(&self.pool)
                .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media")
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(|media| self.to_response(media))
            .collect::<Result<Vec<_>>>()?;

        Ok((items, total))
    }

    /// Access URL for a media item: direct for public media, presigned
    /// for private media.
    pub async fn access_url(&self, id: Uuid) -> Result<String> {
        let media = self.find(id).await?;
        let disk = self.disks.disk(&media.disk)?;
        let visibility: Visibility = media.visibility.parse()?;
        let key = disk.key_for(visibility, &media.path());

        match visibility {
            Visibility::Public => Ok(disk.url(&key)),
            Visibility::Private => disk.presigned_url(&key).await,
        }
    }

    /// Download a media item's bytes together with its MIME type and
    /// file name
    pub async fn download(&self, id: Uuid) -> Result<(Vec<u8>, String, String)> {
        let media = self.find(id).await?;
        let disk = self.disks.disk(&media.disk)?;
        let visibility: Visibility = media.visibility.parse()?;
        let key = disk.key_for(visibility, &media.path());

        let data = disk.read(&key).await?;
        Ok((data, media.mime_type, media.file_name))
    }

    /// Delete a media item: remove the stored object, then the record
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let media = self.find(id).await?;
        let disk = self.disks.disk(&media.disk)?;
        let visibility: Visibility = media.visibility.parse()?;
        let key = disk.key_for(visibility, &media.path());

        disk.delete(&key).await?;
        debug!("Media object deleted: disk={}, key={}", media.disk, key);

        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Media deleted: id={}, file_name={}", media.id, media.file_name);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Media> {
        let media: Option<Media> = sqlx::query_as("SELECT * FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        media.ok_or_else(|| AppError::NotFound(format!("Media '{}' not found", id)))
    }

    /// Build the response DTO, resolving the record's disk for its URL
    pub fn to_response(&self, media: Media) -> Result<MediaResponseDto> {
        let disk = self.disks.disk(&media.disk)?;
        let visibility: Visibility = media.visibility.parse()?;
        let key = disk.key_for(visibility, &media.path());
        let url = disk.url(&key);

        Ok(MediaResponseDto {
            id: media.id,
            name: media.name,
            file_name: media.file_name,
            disk: media.disk,
            mime_type: media.mime_type,
            size: media.size,
            visibility: VisibilityDto::from(visibility),
            attributes: media.attributes,
            url,
            created_at: media.created_at,
        })
    }
}
