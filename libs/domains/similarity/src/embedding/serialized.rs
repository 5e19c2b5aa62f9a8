use async_trait::async_trait;
use tokio::sync::Mutex;

use super::ImageEmbedder;
use crate::decode::DecodedImage;
use crate::error::SimilarityResult;

/// Runs at most one inference at a time through the wrapped embedder.
///
/// For model runtimes that are not safe to call concurrently.
pub struct SerializedEmbedder<E> {
    inner: Mutex<E>,
    dimension: usize,
}

impl<E: ImageEmbedder> SerializedEmbedder<E> {
    pub fn new(inner: E) -> Self {
        let dimension = inner.dimension();
        Self {
            inner: Mutex::new(inner),
            dimension,
        }
    }
}

#[async_trait]
impl<E: ImageEmbedder> ImageEmbedder for SerializedEmbedder<E> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_image(&self, image: &DecodedImage) -> SimilarityResult<Vec<f32>> {
        let inner = self.inner.lock().await;
        inner.embed_image(image).await
    }
}
