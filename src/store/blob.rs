//! Object storage for uploaded images.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::store::document::{StoreError, StoreResult};

/// Upload target returning a publicly reachable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at the relative `path` and return the download URL.
    async fn put(&self, path: &str, content_type: &str, bytes: &[u8]) -> StoreResult<String>;
}

/// Blob store writing under a local directory that the HTTP server exposes.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, content_type: &str, bytes: &[u8]) -> StoreResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::debug!(
            path = %path,
            content_type = %content_type,
            size = bytes.len(),
            "Blob stored"
        );
        Ok(format!("{}/{}", self.public_base, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobStore::new(dir.path(), "/media/");

        let url = blobs
            .put("properties/1700000000000-front.jpg", "image/jpeg", b"jpeg")
            .await
            .unwrap();

        assert_eq!(url, "/media/properties/1700000000000-front.jpg");
        let written = std::fs::read(dir.path().join("properties/1700000000000-front.jpg")).unwrap();
        assert_eq!(written, b"jpeg");
    }

    #[tokio::test]
    async fn test_put_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FsBlobStore::new(dir.path(), "/media");

        for path in ["../outside.jpg", "/etc/passwd", ""] {
            let err = blobs.put(path, "image/jpeg", b"x").await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidPath(_)));
        }
    }
}
