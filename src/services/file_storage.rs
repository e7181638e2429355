//! Client for the upstream file-storage service.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use reqwest::Client;
use tracing::debug;

use super::{SourceFileFetcher, UpstreamError};
use crate::config::FileStorageConfig;
use crate::http_client::{build_client, ensure_success, join_url, parse_content_disposition_filename};
use crate::models::{FileId, SourceFile};

/// Fallback header some storage deployments use instead of Content-Disposition.
const FILE_NAME_HEADER: &str = "x-file-name";

/// Fetches files with `GET {endpoint}/api/files/{id}`.
#[derive(Clone)]
pub struct HttpFileFetcher {
    client: Client,
    endpoint: String,
}

impl HttpFileFetcher {
    pub fn new(config: &FileStorageConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: config.endpoint.clone(),
        })
    }

    fn file_url(&self, file_id: FileId) -> String {
        join_url(&self.endpoint, &format!("api/files/{file_id}"))
    }
}

/// Declared filename from response headers.
fn declared_name(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_disposition_filename)
        .or_else(|| {
            headers
                .get(FILE_NAME_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

#[async_trait]
impl SourceFileFetcher for HttpFileFetcher {
    async fn fetch(&self, file_id: FileId) -> Result<SourceFile, UpstreamError> {
        let url = self.file_url(file_id);
        debug!("Fetching source file from {}", url);

        let response = ensure_success(self.client.get(&url).send().await?)?;
        let name = declared_name(response.headers()).ok_or_else(|| {
            UpstreamError::InvalidResponse(format!("{url} did not declare a file name"))
        })?;
        let content = response.bytes().await?.to_vec();

        debug!("Fetched '{}' ({} bytes) for {}", name, content.len(), file_id);
        Ok(SourceFile::new(name, content))
    }
}
