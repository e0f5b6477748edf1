use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::media::dtos::MAX_FILE_SIZE;
use crate::features::media::handlers::{
    delete_media, download_media, get_media, get_media_url, list_media, upload_media,
};
use crate::features::media::services::MediaService;

/// Create routes for the media feature
pub fn routes(media_service: Arc<MediaService>) -> Router {
    Router::new()
        .route(
            "/api/media/upload",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(upload_media).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024)),
        )
        .route("/api/media", get(list_media))
        .route("/api/media/{id}", get(get_media).delete(delete_media))
        .route("/api/media/{id}/url", get(get_media_url))
        .route("/api/media/{id}/download", get(download_media))
        .with_state(media_service)
}
