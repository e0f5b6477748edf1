//! Storage module for file management
//!
//! Provides the pluggable disk abstraction the uploader writes through:
//! a local filesystem disk and a MinIO/S3-compatible disk, resolved by
//! name via the `DiskManager`.

mod disk;
mod local_disk;
mod manager;
mod s3_disk;

pub use disk::{Disk, Visibility};
pub use local_disk::LocalDisk;
pub use manager::DiskManager;
pub use s3_disk::S3Disk;
