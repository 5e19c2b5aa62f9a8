//! Loading the stored image of a catalog record.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::io::ErrorKind;
use tracing::instrument;

use crate::error::{SimilarityError, SimilarityResult};

/// Fetches the encoded image of a stored record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceImageLoader: Send + Sync {
    /// Encoded image bytes, or `None` when the record has no stored image
    async fn load(&self, record_id: &str) -> SimilarityResult<Option<Vec<u8>>>;
}

/// Resolves `{prefix}{record_id}.jpg` on the local filesystem or, for
/// `http://` and `https://` prefixes, over HTTP.
pub struct PrefixImageLoader {
    prefix: String,
    client: Client,
}

impl PrefixImageLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            client: Client::new(),
        }
    }

    pub fn location(&self, record_id: &str) -> String {
        format!("{}{}.jpg", self.prefix, record_id)
    }

    fn is_remote(&self) -> bool {
        self.prefix.starts_with("http://") || self.prefix.starts_with("https://")
    }

    async fn load_remote(&self, url: &str) -> SimilarityResult<Option<Vec<u8>>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SimilarityError::ImageSource(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SimilarityError::ImageSource(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SimilarityError::ImageSource(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }

    async fn load_file(&self, path: &str) -> SimilarityResult<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SimilarityError::ImageSource(format!("{}: {}", path, e))),
        }
    }
}

/// Ids are spliced into a path or URL, so only `[A-Za-z0-9_-]` is accepted.
fn is_safe_record_id(record_id: &str) -> bool {
    !record_id.is_empty()
        && record_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[async_trait]
impl SourceImageLoader for PrefixImageLoader {
    #[instrument(skip(self))]
    async fn load(&self, record_id: &str) -> SimilarityResult<Option<Vec<u8>>> {
        if !is_safe_record_id(record_id) {
            return Err(SimilarityError::Validation(format!(
                "invalid record id: {}",
                record_id
            )));
        }

        let location = self.location(record_id);
        if self.is_remote() {
            self.load_remote(&location).await
        } else {
            self.load_file(&location).await
        }
    }
}
