use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::media::dtos::{
    is_mime_type_allowed, DeleteMediaResponseDto, MediaResponseDto, MediaUrlResponseDto,
    UploadMediaDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
use crate::features::media::services::MediaService;
use crate::modules::storage::Visibility;
use crate::shared::constants::DEFAULT_MIME_TYPE;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Resolve the effective MIME type of an upload (client-supplied, or
/// guessed from the file name) and check it against the allow-list. A
/// missing Content-Type must not skip the check.
fn resolve_mime_type(content_type: Option<&str>, file_name: &str) -> Result<String, AppError> {
    let mime_type = match content_type {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(file_name)
            .first_raw()
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string(),
    };

    if !is_mime_type_allowed(&mime_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            mime_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    Ok(mime_type)
}

/// Upload a media file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `name`: Display name (optional, defaults to the file stem)
/// - `visibility`: "public" or "private" (optional, defaults to "public")
/// - `disk`: Target disk name (optional, defaults to the configured default)
/// - `attributes`: JSON object with additional attributes (optional)
#[utoipa::path(
    post,
    path = "/api/media/upload",
    tag = "media",
    request_body(
        content = UploadMediaDto,
        content_type = "multipart/form-data",
        description = "Media upload form with optional name, visibility, disk and attributes fields",
    ),
    responses(
        (status = 201, description = "Media uploaded successfully", body = ApiResponse<MediaResponseDto>),
        (status = 400, description = "Invalid file or validation error"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_media(
    State(service): State<Arc<MediaService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaResponseDto>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut name: Option<String> = None;
    let mut visibility = Visibility::Public;
    let mut disk: Option<String> = None;
    let mut attributes: Option<serde_json::Map<String, serde_json::Value>> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field.content_type().map(|s| s.to_string());

                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                content_type = ct;
            }
            "name" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read name field: {}", e))
                })?;
                if !text.is_empty() {
                    name = Some(text);
                }
            }
            "visibility" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read visibility field: {}", e))
                })?;
                visibility = text.to_lowercase().parse()?;
            }
            "disk" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read disk field: {}", e))
                })?;
                if !text.is_empty() {
                    disk = Some(text);
                }
            }
            "attributes" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read attributes field: {}", e))
                })?;
                if !text.is_empty() {
                    let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
                        AppError::BadRequest(format!("attributes must be a JSON object: {}", e))
                    })?;
                    match value {
                        serde_json::Value::Object(map) => attributes = Some(map),
                        _ => {
                            return Err(AppError::BadRequest(
                                "attributes must be a JSON object".to_string(),
                            ))
                        }
                    }
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    // Validate required fields
    let file_data =
        file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;

    // Validate file size
    if file_data.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    // Validate the MIME type whether or not the client supplied one
    let mime_type = resolve_mime_type(content_type.as_deref(), &file_name)?;

    // Build the upload
    let mut uploader = service
        .uploader()?
        .from_bytes(file_data, &file_name)
        .mime_type(&mime_type)
        .visibility(visibility);

    if let Some(name) = &name {
        uploader = uploader.name(name);
    }
    if let Some(disk) = &disk {
        uploader = uploader.disk(disk)?;
    }
    if let Some(attributes) = attributes {
        uploader = uploader.attributes(attributes);
    }

    let media = uploader.upload().await?;
    let response = service.to_response(media)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// List media items, newest first
#[utoipa::path(
    get,
    path = "/api/media",
    tag = "media",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Media list", body = ApiResponse<Vec<MediaResponseDto>>)
    )
)]
pub async fn list_media(
    State(service): State<Arc<MediaService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<MediaResponseDto>>>, AppError> {
    let (items, total) = service.list(&pagination).await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Fetch a single media item
#[utoipa::path(
    get,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media item", body = ApiResponse<MediaResponseDto>),
        (status = 404, description = "Media not found")
    )
)]
pub async fn get_media(
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MediaResponseDto>>, AppError> {
    let media = service.get(id).await?;

    Ok(Json(ApiResponse::success(Some(media), None, None)))
}

/// Get an access URL for a media item
///
/// Public media gets its direct URL; private media gets a presigned URL.
#[utoipa::path(
    get,
    path = "/api/media/{id}/url",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Access URL", body = ApiResponse<MediaUrlResponseDto>),
        (status = 404, description = "Media not found")
    )
)]
pub async fn get_media_url(
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MediaUrlResponseDto>>, AppError> {
    let url = service.access_url(id).await?;

    Ok(Json(ApiResponse::success(
        Some(MediaUrlResponseDto { url }),
        None,
        None,
    )))
}

/// Download a media item's file
#[utoipa::path(
    get,
    path = "/api/media/{id}/download",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "File content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Media not found")
    )
)]
pub async fn download_media(
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (data, mime_type, file_name) = service.download(id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// Delete a media item and its stored file
#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    tag = "media",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media deleted successfully", body = ApiResponse<DeleteMediaResponseDto>),
        (status = 404, description = "Media not found")
    )
)]
pub async fn delete_media(
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteMediaResponseDto>>, AppError> {
    service.delete(id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteMediaResponseDto { deleted: true }),
        Some("Media deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mime_type_keeps_allowed_supplied_type() {
        assert_eq!(
            resolve_mime_type(Some("image/png"), "photo.bin").unwrap(),
            "image/png"
        );
    }

    #[test]
    fn test_resolve_mime_type_guesses_when_content_type_is_absent() {
        assert_eq!(resolve_mime_type(None, "photo.png").unwrap(), "image/png");
    }

    #[test]
    fn test_resolve_mime_type_rejects_guessed_disallowed_type() {
        // Omitting the Content-Type must not bypass the allow-list
        let err = resolve_mime_type(None, "tool.exe").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_resolve_mime_type_rejects_supplied_disallowed_type() {
        let err = resolve_mime_type(Some("application/x-msdownload"), "tool.png").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
