use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::modules::storage::Visibility;

/// Media visibility enum for API requests/responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityDto {
    /// Public media is accessible via direct URL
    #[default]
    Public,
    /// Private media requires presigned URLs for access
    Private,
}

impl From<VisibilityDto> for Visibility {
    fn from(dto: VisibilityDto) -> Self {
        match dto {
            VisibilityDto::Public => Visibility::Public,
            VisibilityDto::Private => Visibility::Private,
        }
    }
}

impl From<Visibility> for VisibilityDto {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => VisibilityDto::Public,
            Visibility::Private => VisibilityDto::Private,
        }
    }
}

/// Upload media request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Display name of the media item (defaults to the file stem)
    #[schema(example = "quarterly-report")]
    pub name: Option<String>,
    /// Media visibility: "public" (default) or "private"
    #[schema(example = "public")]
    pub visibility: Option<String>,
    /// Target disk (defaults to the configured default disk)
    #[schema(example = "s3")]
    pub disk: Option<String>,
    /// Additional attributes as a JSON object
    #[schema(example = r#"{"album":"holiday"}"#)]
    pub attributes: Option<String>,
}

/// Response DTO for media operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaResponseDto {
    /// Unique identifier for the media item
    pub id: Uuid,
    /// Display name of the media item
    pub name: String,
    /// Sanitised file name
    pub file_name: String,
    /// Disk the file is stored on
    pub disk: String,
    /// MIME type of the file
    pub mime_type: String,
    /// Size of the file in bytes
    pub size: i64,
    /// Media visibility (public or private)
    pub visibility: VisibilityDto,
    /// Caller-supplied attributes
    pub attributes: serde_json::Value,
    /// Direct URL of the stored file
    pub url: String,
    /// Timestamp when the media was uploaded
    pub created_at: DateTime<Utc>,
}

/// Response DTO for the access-URL endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaUrlResponseDto {
    /// Direct URL for public media, presigned URL for private media
    pub url: String,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponseDto {
    /// Confirmation that the media item was deleted
    pub deleted: bool,
}

/// Allowed MIME types for media uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_dto_maps_to_storage_visibility() {
        assert_eq!(Visibility::from(VisibilityDto::Public), Visibility::Public);
        assert_eq!(
            Visibility::from(VisibilityDto::Private),
            Visibility::Private
        );
        assert_eq!(VisibilityDto::from(Visibility::Private), VisibilityDto::Private);
    }

    #[test]
    fn test_mime_type_allow_list() {
        assert!(is_mime_type_allowed("image/png"));
        assert!(is_mime_type_allowed("text/plain"));
        assert!(!is_mime_type_allowed("application/x-msdownload"));
    }
}
