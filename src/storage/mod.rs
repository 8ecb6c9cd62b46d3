//! Object storage for gallery images.
//!
//! The catalog never streams image bytes itself. Clients ask for a
//! presigned upload URL, PUT the file straight to the bucket, and store
//! the returned public URL in an entity's gallery. Deleting an entity asks
//! the store to delete each gallery object by key.
//!
//! ```text
//! client ──POST /api/upload──▶ ObjectStore::presign_upload ──▶ { uploadUrl, publicUrl, key }
//! client ──PUT uploadUrl─────▶ bucket
//! client ──POST /api/products { gallery: [publicUrl] }
//! ```

mod in_memory;
mod key;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use in_memory::InMemoryObjectStore;
pub use key::{key_from_public_url, sanitize_filename, upload_key, DEFAULT_UPLOAD_FOLDER};

/// Result of presigning an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    /// Time-limited URL the client writes the object to.
    pub upload_url: String,
    /// Where the object is readable once uploaded.
    pub public_url: String,
    pub key: String,
    /// Expiry of `upload_url`, milliseconds since the Unix epoch.
    pub expires_at: u64,
}

/// Error type for object storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The key is empty or otherwise unusable.
    InvalidKey(String),
    /// No object under this key.
    NotFound(String),
    /// A presigned URL was malformed, forged or expired.
    Rejected(String),
    /// The backing service failed.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidKey(key) => write!(f, "invalid object key: {:?}", key),
            StorageError::NotFound(key) => write!(f, "object not found: {}", key),
            StorageError::Rejected(msg) => write!(f, "upload rejected: {}", msg),
            StorageError::Backend(msg) => write!(f, "object storage error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// An object storage service (S3-compatible bucket or a test double).
pub trait ObjectStore: Send + Sync {
    /// Issue a time-limited write URL for `key`.
    fn presign_upload(&self, key: &str, content_type: &str) -> Result<PresignedUpload, StorageError>;

    /// Delete the object stored under `key`.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Base URL objects are publicly served from, e.g. `https://bucket.example.com`.
    fn public_base(&self) -> &str;

    /// Public URL of `key`.
    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base().trim_end_matches('/'), key)
    }

    /// Recover the object key from one of this store's public URLs.
    fn key_from_url(&self, url: &str) -> Option<String> {
        key_from_public_url(self.public_base(), url)
    }
}
