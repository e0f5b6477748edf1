mod media_dto;

pub use media_dto::{
    is_mime_type_allowed, DeleteMediaResponseDto, MediaResponseDto, MediaUrlResponseDto,
    UploadMediaDto, VisibilityDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
