use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::media::models::{Media, MediaModel};
use crate::modules::storage::{Disk, DiskManager, Visibility};
use crate::shared::constants::DEFAULT_MIME_TYPE;
use crate::shared::validation::sanitise_file_name;

/// Where the uploaded bytes come from
#[derive(Debug)]
enum UploadSource {
    /// A file on the local filesystem, read at upload time
    Path(PathBuf),
    /// An already-received upload held in memory
    Memory(Vec<u8>),
}

/// Fluent builder that uploads a file and creates a media record.
///
/// One instance handles one upload: pick a source, adjust the metadata,
/// then call [`upload`](Self::upload) to persist the record and write
/// the bytes to the resolved disk.
///
/// ```rust,ignore
/// let media = service
///     .uploader()?
///     .from_path("/tmp/report.pdf")
///     .name("Quarterly report")
///     .visibility(Visibility::Private)
///     .attribute("quarter", serde_json::json!("Q3"))
///     .upload()
///     .await?;
/// ```
#[derive(Debug)]
pub struct MediaUploader<M: MediaModel = Media> {
    pool: PgPool,
    disks: Arc<DiskManager>,
    disk: Arc<dyn Disk>,
    source: Option<UploadSource>,
    file_name: Option<String>,
    name: Option<String>,
    mime_type: Option<String>,
    visibility: Visibility,
    attributes: serde_json::Map<String, serde_json::Value>,
    _model: PhantomData<M>,
}

impl MediaUploader<Media> {
    /// Create an uploader targeting the default disk and the default
    /// `Media` model.
    pub fn new(pool: PgPool, disks: Arc<DiskManager>) -> Result<Self> {
        let disk = disks.disk(disks.default_disk())?;

        Ok(Self {
            pool,
            disks,
            disk,
            source: None,
            file_name: None,
            name: None,
            mime_type: None,
            visibility: Visibility::default(),
            attributes: serde_json::Map::new(),
            _model: PhantomData,
        })
    }
}

#[allow(dead_code)]
impl<M: MediaModel> MediaUploader<M> {
    /// Switch the record type the upload is persisted as.
    ///
    /// The model carries its own table name and row mapping, so there is
    /// nothing to validate at runtime.
    pub fn model<N: MediaModel>(self) -> MediaUploader<N> {
        MediaUploader {
            pool: self.pool,
            disks: self.disks,
            disk: self.disk,
            source: self.source,
            file_name: self.file_name,
            name: self.name,
            mime_type: self.mime_type,
            visibility: self.visibility,
            attributes: self.attributes,
            _model: PhantomData,
        }
    }

    /// Use a file on the local filesystem as the upload source.
    ///
    /// The file name defaults to the path's sanitised basename and the
    /// display name to the basename's unsanitised stem; both can still
    /// be overridden.
    pub fn from_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.name = Some(derive_name(&base));
        self.file_name = Some(sanitise_file_name(&base));
        self.source = Some(UploadSource::Path(path));
        self
    }

    /// Use an in-memory upload (e.g. a received multipart file) as the
    /// source. The stored file name is the sanitised client name; the
    /// display name keeps the original stem.
    pub fn from_bytes(mut self, data: Vec<u8>, original_file_name: &str) -> Self {
        self.name = Some(derive_name(original_file_name));
        self.file_name = Some(sanitise_file_name(original_file_name));
        self.source = Some(UploadSource::Memory(data));
        self
    }

    /// Set the disk used for file storage. Unresolvable names fail here,
    /// not at upload time.
    pub fn disk(mut self, name: &str) -> Result<Self> {
        self.disk = self.disks.disk(name)?;
        Ok(self)
    }

    /// Set the stored file name (sanitised)
    pub fn file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(sanitise_file_name(file_name));
        self
    }

    /// Set the display name of the media item
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Override the MIME type instead of guessing it from the file name
    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }

    /// Set the file visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Add a single caller-supplied attribute
    pub fn attribute(mut self, key: &str, value: serde_json::Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// Merge a set of caller-supplied attributes
    pub fn attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Upload the file and create the media record.
    ///
    /// Reads the source bytes, persists one record into the model's
    /// table and writes the bytes once to the resolved disk at
    /// `{id}/{file_name}` below the visibility prefix.
    pub async fn upload(self) -> Result<M> {
        let source = self.source.ok_or_else(|| {
            AppError::Validation("An upload source is required before uploading".to_string())
        })?;
        let file_name = self.file_name.ok_or_else(|| {
            AppError::Validation("A file name is required before uploading".to_string())
        })?;
        let name = self.name.ok_or_else(|| {
            AppError::Validation("A name is required before uploading".to_string())
        })?;

        let data = match source {
            UploadSource::Memory(data) => data,
            UploadSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::MissingSource(path.display().to_string())
                } else {
                    AppError::Internal(format!("Failed to read '{}': {}", path.display(), e))
                }
            })?,
        };

        let mime_type = self
            .mime_type
            .unwrap_or_else(|| detect_mime(&file_name));
        let size = data.len() as i64;
        let id = Uuid::new_v4();

        let sql = format!(
            "INSERT INTO {} (id, name, file_name, disk, mime_type, size, visibility, attributes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
            M::TABLE
        );

        let record: M = sqlx::query_as(&sql)
            .bind(id)
            .bind(&name)
            .bind(&file_name)
            .bind(self.disk.name())
            .bind(&mime_type)
            .bind(size)
            .bind(self.visibility.as_str())
            .bind(serde_json::Value::Object(self.attributes))
            .fetch_one(&self.pool)
            .await?;

        let key = self.disk.key_for(self.visibility, &record.path());
        self.disk.put(&key, &data, &mime_type).await?;

        debug!("Media object written: disk={}, key={}", self.disk.name(), key);
        info!(
            "Media uploaded: id={}, file_name={}, disk={}, mime_type={}, size={}",
            record.id(),
            record.file_name(),
            self.disk.name(),
            mime_type,
            size
        );

        Ok(record)
    }
}

/// File stem of the client-supplied file name, kept unsanitised
fn derive_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

/// Guess the MIME type from a file name, falling back to octet-stream
fn detect_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{LocalDiskConfig, StorageConfig};

    async fn manager(dir: &tempfile::TempDir) -> Arc<DiskManager> {
        Arc::new(
            DiskManager::from_config(&StorageConfig {
                default_disk: "local".to_string(),
                local: LocalDiskConfig {
                    root: dir.path().to_string_lossy().into_owned(),
                    base_url: "http://localhost:3000/storage".to_string(),
                },
                s3: None,
            })
            .await
            .unwrap(),
        )
    }

    fn lazy_pool() -> PgPool {
        // Never connected in these tests; every path under test fails
        // before touching the database.
        PgPool::connect_lazy("postgres://postgres@localhost/media_test").unwrap()
    }

    #[test]
    fn test_derive_name_is_file_stem() {
        assert_eq!(derive_name("document.txt"), "document");
        assert_eq!(derive_name("archive.tar.gz"), "archive.tar");
        assert_eq!(derive_name("noext"), "noext");
    }

    #[tokio::test]
    async fn test_from_path_keeps_unsanitised_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = MediaUploader::new(lazy_pool(), manager(&dir).await)
            .unwrap()
            .from_path("/tmp/my report.pdf");

        assert_eq!(uploader.name.as_deref(), Some("my report"));
        assert_eq!(uploader.file_name.as_deref(), Some("my-report.pdf"));
    }

    #[tokio::test]
    async fn test_from_bytes_keeps_unsanitised_stem_as_name() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = MediaUploader::new(lazy_pool(), manager(&dir).await)
            .unwrap()
            .from_bytes(b"data".to_vec(), "my report.pdf");

        assert_eq!(uploader.name.as_deref(), Some("my report"));
        assert_eq!(uploader.file_name.as_deref(), Some("my-report.pdf"));
    }

    #[test]
    fn test_detect_mime_falls_back_to_octet_stream() {
        assert_eq!(detect_mime("photo.png"), "image/png");
        assert_eq!(detect_mime("document.txt"), "text/plain");
        assert_eq!(detect_mime("mystery.zzz"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_without_source_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = MediaUploader::new(lazy_pool(), manager(&dir).await).unwrap();

        let err = uploader.upload().await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upload_from_missing_path_is_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = MediaUploader::new(lazy_pool(), manager(&dir).await)
            .unwrap()
            .from_path("/definitely/not/here.txt");

        let err = uploader.upload().await.unwrap_err();
        assert!(matches!(err, AppError::MissingSource(path) if path.ends_with("here.txt")));
    }

    #[tokio::test]
    async fn test_unresolvable_disk_fails_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let err = MediaUploader::new(lazy_pool(), manager(&dir).await)
            .unwrap()
            .disk("dropbox")
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownDisk(name) if name == "dropbox"));
    }
}
