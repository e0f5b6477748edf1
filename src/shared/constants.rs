/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Fallback MIME type when detection from the file name fails
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Name of the local filesystem disk
pub const LOCAL_DISK: &str = "local";

/// Name of the S3/MinIO disk
pub const S3_DISK: &str = "s3";
