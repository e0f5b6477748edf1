use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use uuid::Uuid;

/// A persistable media record type.
///
/// The uploader is generic over this trait: the table name and row
/// mapping come from the implementation, so pointing the uploader at a
/// type that is not a media record is a compile error rather than a
/// runtime check.
pub trait MediaModel: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table the record is inserted into
    const TABLE: &'static str;

    fn id(&self) -> Uuid;

    fn file_name(&self) -> &str;

    /// Storage path of the underlying file, relative to the disk's
    /// visibility prefix
    fn path(&self) -> String {
        format!("{}/{}", self.id(), self.file_name())
    }
}

/// Database model for media records
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct Media {
    pub id: Uuid,
    pub name: String,
    pub file_name: String,
    pub disk: String,
    pub mime_type: String,
    pub size: i64,
    pub visibility: String,
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaModel for Media {
    const TABLE: &'static str = "media";

    fn id(&self) -> Uuid {
        self.id
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_id_slash_file_name() {
        let media = Media {
            id: Uuid::nil(),
            name: "document".to_string(),
            file_name: "document.txt".to_string(),
            disk: "local".to_string(),
            mime_type: "text/plain".to_string(),
            size: 5,
            visibility: "public".to_string(),
            attributes: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            media.path(),
            "00000000-0000-0000-0000-000000000000/document.txt"
        );
    }
}
