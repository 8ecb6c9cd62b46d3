//! InMemoryObjectStore - HashMap-backed bucket for tests and development.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::{ObjectStore, PresignedUpload, StorageError};
use crate::clock::now_millis;

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory bucket with presigned uploads.
///
/// Presigned URLs carry a base64 token encoding key, content type and
/// expiry; `upload` checks it the way a real bucket checks a signature.
/// Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryObjectStore {
    endpoint: String,
    public_base: String,
    expiry: Duration,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryObjectStore {
    /// Create a bucket served from `public_base`, with 60 second upload URLs.
    pub fn new(public_base: impl Into<String>) -> Self {
        let public_base = public_base.into();
        Self {
            endpoint: public_base.clone(),
            public_base,
            expiry: Duration::from_secs(60),
            objects: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Issue upload URLs against a separate write endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Lifetime of presigned upload URLs.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Make every `delete` of `key` fail with a backend error.
    pub fn fail_deletes_of(&self, key: impl Into<String>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(key.into());
        }
    }

    /// Write an object through a presigned URL.
    pub fn upload(&self, upload_url: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        self.upload_at(upload_url, content_type, bytes, now_millis())
    }

    /// Like `upload`, as if the request arrived at `now` (ms since epoch).
    pub fn upload_at(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: u64,
    ) -> Result<String, StorageError> {
        let token = upload_url
            .split_once("?token=")
            .map(|(_, t)| t)
            .ok_or_else(|| StorageError::Rejected("missing token".into()))?;

        let (key, signed_type, expires_at) = decode_token(token)?;
        if signed_type != content_type {
            return Err(StorageError::Rejected(format!(
                "content type {} does not match signed {}",
                content_type, signed_type
            )));
        }
        if now > expires_at {
            return Err(StorageError::Rejected("upload URL expired".into()));
        }

        self.put(&key, content_type, bytes)?;
        Ok(key)
    }

    /// Write an object directly.
    pub fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().ok()?.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn encode_token(key: &str, content_type: &str, expires_at: u64) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}\n{}\n{}", key, content_type, expires_at))
}

fn decode_token(token: &str) -> Result<(String, String, u64), StorageError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| StorageError::Rejected(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| StorageError::Rejected(e.to_string()))?;

    let mut parts = text.splitn(3, '\n');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(content_type), Some(expires_at)) => {
            let expires_at = expires_at
                .parse()
                .map_err(|_| StorageError::Rejected("malformed expiry".into()))?;
            Ok((key.to_string(), content_type.to_string(), expires_at))
        }
        _ => Err(StorageError::Rejected("malformed token".into())),
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn presign_upload(&self, key: &str, content_type: &str) -> Result<PresignedUpload, StorageError> {
        if key.is_empty() || key.contains('\n') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let expires_at = now_millis() + self.expiry.as_millis() as u64;
        let token = encode_token(key, content_type, expires_at);

        Ok(PresignedUpload {
            upload_url: format!("{}/{}?token={}", self.endpoint.trim_end_matches('/'), key, token),
            public_url: self.public_url(key),
            key: key.to_string(),
            expires_at,
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let failing = self
            .failing
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        if failing.contains(key) {
            return Err(StorageError::Backend(format!("delete of {} failed", key)));
        }

        let mut objects = self
            .objects
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn public_base(&self) -> &str {
        &self.public_base
    }
}
