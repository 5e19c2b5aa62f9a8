use async_trait::async_trait;

use crate::decode::DecodedImage;
use crate::error::SimilarityResult;

/// Image embedding model handle.
///
/// Implementations return a single vector of `dimension()` values per image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Embed one decoded image
    async fn embed_image(&self, image: &DecodedImage) -> SimilarityResult<Vec<f32>>;
}
