//! Object storage for rendered word-cloud images.
//!
//! Two backends: a local directory tree where each bucket is a directory, and
//! an S3/MinIO-style HTTP store. Both overwrite on a repeated key, and both
//! report the object key itself as the image location.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::{Settings, StorageBackend};
use crate::http_client::{build_client, ensure_success, join_url};
use crate::models::{FileId, ImageLocation};
use crate::services::{ArtifactReader, ArtifactStore, UpstreamError};

/// MIME type of every stored artifact.
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

/// Object key for a file's word cloud: `{fileId}.png`.
///
/// Deterministic per file, so a retried analysis overwrites the earlier image
/// instead of leaving an orphan behind.
pub fn artifact_key(file_id: FileId) -> String {
    format!("{}.png", file_id)
}

/// Reject keys that could escape the bucket.
fn validate_key(key: &str) -> Result<(), UpstreamError> {
    if key.is_empty()
        || key.contains(['/', '\\'])
        || key == "."
        || key.contains("..")
    {
        return Err(UpstreamError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Stores artifacts as `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FilesystemArtifactStore {
    root: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Construct the on-disk path for an object.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, UpstreamError> {
        validate_key(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageLocation, UpstreamError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());

        ImageLocation::new(key).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ArtifactReader for FilesystemArtifactStore {
    async fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, UpstreamError> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Stores artifacts with `PUT {endpoint}/{bucket}/{key}`.
#[derive(Clone)]
pub struct HttpArtifactStore {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl HttpArtifactStore {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<String, UpstreamError> {
        validate_key(bucket)?;
        validate_key(key)?;
        Ok(join_url(&self.endpoint, &format!("{bucket}/{key}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.access_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageLocation, UpstreamError> {
        let url = self.object_url(bucket, key)?;
        let size = bytes.len();
        let request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, IMAGE_CONTENT_TYPE)
            .body(bytes);
        ensure_success(self.authorize(request).send().await?)?;
        debug!("Uploaded {} bytes to {}", size, url);

        ImageLocation::new(key).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ArtifactReader for HttpArtifactStore {
    async fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, UpstreamError> {
        let url = self.object_url(bucket, key)?;
        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response)?;
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

/// The configured backend, usable for both writes and reads.
#[derive(Clone)]
pub struct ArtifactBackend {
    pub store: Arc<dyn ArtifactStore>,
    pub reader: Arc<dyn ArtifactReader>,
}

impl ArtifactBackend {
    /// Build the backend selected by `[storage] backend`.
    pub fn from_settings(settings: &Settings) -> Result<Self, UpstreamError> {
        match settings.storage.backend {
            StorageBackend::Filesystem => {
                let store = Arc::new(FilesystemArtifactStore::new(settings.artifact_root()));
                Ok(Self {
                    store: store.clone(),
                    reader: store,
                })
            }
            StorageBackend::Http => {
                let endpoint = settings.storage.endpoint.clone().ok_or_else(|| {
                    UpstreamError::Unavailable("storage.endpoint is not configured".into())
                })?;
                let client =
                    build_client(std::time::Duration::from_secs(settings.storage.timeout_secs))?;
                let store = Arc::new(HttpArtifactStore::new(
                    client,
                    endpoint,
                    settings.storage.access_token.clone(),
                ));
                Ok(Self {
                    store: store.clone(),
                    reader: store,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_key() {
        let id: FileId = "6f9619ff-8b86-d011-b42d-00c04fc964ff".parse().unwrap();
        assert_eq!(artifact_key(id), "6f9619ff-8b86-d011-b42d-00c04fc964ff.png");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("abc.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/b.png").is_err());
        assert!(validate_key("a\\b.png").is_err());
        assert!(validate_key("..").is_err());
    }

    #[tokio::test]
    async fn test_filesystem_store_overwrites_and_reads() {
        let dir = tempdir().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());

        let loc = store.store("images", "k.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(loc.as_str(), "k.png");

        store.store("images", "k.png", vec![9]).await.unwrap();
        assert_eq!(
            store.read("images", "k.png").await.unwrap(),
            Some(vec![9])
        );
        assert!(dir.path().join("images").join("k.png").exists());
    }

    #[tokio::test]
    async fn test_filesystem_read_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());
        assert_eq!(store.read("images", "nope.png").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_filesystem_rejects_escaping_key() {
        let dir = tempdir().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());
        let err = store.store("images", "../x.png", vec![1]).await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidKey(_)));
    }

    #[test]
    fn test_http_object_url() {
        let client = build_client(std::time::Duration::from_secs(1)).unwrap();
        let store = HttpArtifactStore::new(client, "http://minio:9000/", Some(String::new()));
        assert_eq!(
            store.object_url("analytics-images", "a.png").unwrap(),
            "http://minio:9000/analytics-images/a.png"
        );
        assert!(store.access_token.is_none());
    }
}
