use utoipa::{Modify, OpenApi};

use crate::features::media::{dtos as media_dtos, handlers as media_handlers};
use crate::shared::types::Meta;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Media
        media_handlers::upload_media,
        media_handlers::list_media,
        media_handlers::get_media,
        media_handlers::get_media_url,
        media_handlers::download_media,
        media_handlers::delete_media,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Media
            media_dtos::VisibilityDto,
            media_dtos::UploadMediaDto,
            media_dtos::MediaResponseDto,
            media_dtos::MediaUrlResponseDto,
            media_dtos::DeleteMediaResponseDto,
        )
    ),
    tags(
        (name = "media", description = "Media upload and management"),
    ),
    info(
        title = "Media API",
        version = "0.1.0",
        description = "Media upload and storage API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
