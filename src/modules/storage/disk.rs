use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::core::error::AppError;

/// File visibility for stored objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Public files are accessible via direct URL
    #[default]
    Public,
    /// Private files require presigned URLs for access
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(AppError::InvalidVisibility(other.to_string())),
        }
    }
}

/// A named storage backend.
///
/// Object keys are logical paths below a visibility prefix; `key_for` maps
/// a media path to the backend key, and the remaining operations act on
/// that key. Each operation calls the underlying backend exactly once.
#[async_trait]
#[allow(dead_code)]
pub trait Disk: Send + Sync {
    /// The configured name of this disk
    fn name(&self) -> &str;

    /// Map a logical path to the backend key for the given visibility
    fn key_for(&self, visibility: Visibility, path: &str) -> String;

    /// Write an object
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError>;

    /// Read an object's bytes
    async fn read(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Delete an object
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Check whether an object exists
    async fn exists(&self, key: &str) -> Result<bool, AppError>;

    /// Direct URL for an object
    fn url(&self, key: &str) -> String;

    /// Presigned URL for temporary access to a private object
    async fn presigned_url(&self, key: &str) -> Result<String, AppError>;
}

impl fmt::Debug for dyn Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disk").field("name", &self.name()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_str() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!(
            "private".parse::<Visibility>().unwrap(),
            Visibility::Private
        );
    }

    #[test]
    fn test_visibility_rejects_unknown_values() {
        let err = "internal".parse::<Visibility>().unwrap_err();
        assert!(matches!(err, AppError::InvalidVisibility(v) if v == "internal"));
    }

    #[test]
    fn test_visibility_round_trips_as_str() {
        assert_eq!(Visibility::Public.as_str(), "public");
        assert_eq!(Visibility::Private.to_string(), "private");
    }
}
