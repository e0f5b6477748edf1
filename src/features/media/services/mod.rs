mod media_service;
mod media_uploader;

pub use media_service::MediaService;
pub use media_uploader::MediaUploader;
