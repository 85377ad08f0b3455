//! # Object Storage
//!
//! Uploaded files (KYC documents, profile pictures) go through the
//! [`ObjectStore`] trait. [`LocalObjectStore`] writes below a directory and
//! hands back `{public_base}/{key}` as the stored reference.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use lib_core::{AppError, Result};
use lib_utils::b64_decode;
use thiserror::Error;
use tracing::debug;

/// Largest accepted upload after base64 decoding (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for a JSON payload carrying `uploads` base64 files of
/// up to [`MAX_UPLOAD_BYTES`] each, plus room for the other fields.
pub const fn upload_body_limit(uploads: usize) -> usize {
    const ENCODED_MAX: usize = MAX_UPLOAD_BYTES.div_ceil(3) * 4;
    uploads * (ENCODED_MAX + 256) + 64 * 1024
}

/// Content types accepted for identity documents.
pub const DOCUMENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// Content types accepted for profile pictures.
pub const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, returning the reference to persist.
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> std::result::Result<String, StorageError>;
}

pub struct LocalObjectStore {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> std::result::Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> std::result::Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        debug!(key, content_type, size = bytes.len(), "[STORAGE] Stored object");
        Ok(format!("{}/{}", self.public_base, key))
    }
}

/// A validated, decoded upload.
#[derive(Debug)]
pub struct DecodedUpload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Decode a base64 upload and check its type and size.
///
/// `field` names the request field reported in validation errors.
pub fn decode_upload(field: &str, content_type: &str, data: &str, allowed: &[&'static str]) -> Result<DecodedUpload> {
    let content_type = allowed
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(content_type.trim()))
        .ok_or_else(|| AppError::invalid(field, format!("Unsupported file type: {}", content_type)))?;

    let bytes = b64_decode(data).map_err(|_| AppError::invalid(field, "File is not valid base64"))?;
    if bytes.is_empty() {
        return Err(AppError::invalid(field, "File is empty"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::invalid(field, "File exceeds the 5 MB limit"));
    }

    let extension = match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "pdf",
    };

    Ok(DecodedUpload {
        bytes,
        content_type,
        extension,
    })
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_traversal_keys() {
        let store = LocalObjectStore::new("/tmp/uploads", "http://localhost/uploads/");
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("/abs").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for("kyc/1/front.png").is_ok());
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_reference() {
        let root = std::env::temp_dir().join(format!("store-test-{}", uuid::Uuid::new_v4()));
        let store = LocalObjectStore::new(&root, "http://localhost/uploads/");

        let reference = store
            .put("profile/1/avatar.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert_eq!(reference, "http://localhost/uploads/profile/1/avatar.png");
        assert_eq!(tokio::fs::read(root.join("profile/1/avatar.png")).await.unwrap(), vec![1, 2, 3]);
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[test]
    fn test_decode_upload_checks_type() {
        let ok = decode_upload("image", "IMAGE/PNG", "data:image/png;base64,aGVsbG8=", IMAGE_TYPES).unwrap();
        assert_eq!(ok.bytes, b"hello");
        assert_eq!(ok.extension, "png");

        let err = decode_upload("image", "application/pdf", "aGVsbG8=", IMAGE_TYPES).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
