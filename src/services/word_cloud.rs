//! Client for the word-cloud rendering service.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{ImageArtifactGenerator, UpstreamError};
use crate::config::WordCloudConfig;
use crate::http_client::{build_client, ensure_success, join_url};

/// Image dimensions requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    width: u32,
    height: u32,
    format: &'static str,
}

/// Renders PNG word clouds with `POST {endpoint}/generate`.
#[derive(Clone)]
pub struct WordCloudClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    options: WordCloudOptions,
}

impl WordCloudClient {
    pub fn new(config: &WordCloudConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: build_client(config.timeout())?,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            options: WordCloudOptions {
                width: config.width,
                height: config.height,
            },
        })
    }

    pub fn options(&self) -> WordCloudOptions {
        self.options
    }
}

#[async_trait]
impl ImageArtifactGenerator for WordCloudClient {
    async fn generate(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        let url = join_url(&self.endpoint, "generate");
        let body = GenerateRequest {
            text,
            width: self.options.width,
            height: self.options.height,
            format: "png",
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = ensure_success(request.send().await?)?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(UpstreamError::InvalidResponse(format!(
                "{url} returned an empty image"
            )));
        }

        debug!("Rendered word cloud ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }
}
