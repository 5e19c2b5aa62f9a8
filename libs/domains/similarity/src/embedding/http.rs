use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_parse, env_required};
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Deserialize;

use super::ImageEmbedder;
use crate::decode::DecodedImage;
use crate::error::{SimilarityError, SimilarityResult};

pub const DEFAULT_EMBEDDING_DIMENSION: usize = 512;

/// Image embedding endpoint configuration
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub dimension: usize,
}

impl HttpEmbedderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

impl FromEnv for HttpEmbedderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dimension = env_parse("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?;
        if dimension == 0 {
            return Err(ConfigError::ParseError {
                key: "EMBEDDING_DIMENSION".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            url: env_required("EMBEDDING_URL")?,
            api_key: env_optional("EMBEDDING_API_KEY"),
            dimension,
        })
    }
}

/// Embedding model served over HTTP.
///
/// The encoded image is POSTed as the request body with its MIME type; the
/// endpoint answers `{"embedding": [f32, ...]}`.
pub struct HttpImageEmbedder {
    client: Client,
    config: HttpEmbedderConfig,
}

impl HttpImageEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl ImageEmbedder for HttpImageEmbedder {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed_image(&self, image: &DecodedImage) -> SimilarityResult<Vec<f32>> {
        let mut request = self
            .client
            .post(&self.config.url)
            .header(CONTENT_TYPE, image.mime_type())
            .body(image.bytes().to_vec());

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SimilarityError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Embedding(format!(
                "embedding endpoint error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SimilarityError::Embedding(e.to_string()))?;

        if body.embedding.len() != self.config.dimension {
            return Err(SimilarityError::Embedding(format!(
                "expected {} dimensions, got {}",
                self.config.dimension,
                body.embedding.len()
            )));
        }

        Ok(body.embedding)
    }
}
