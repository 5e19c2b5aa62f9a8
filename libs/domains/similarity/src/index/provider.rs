use async_trait::async_trait;

use crate::error::SimilarityResult;
use crate::models::SimilarityMatch;

/// Nearest-neighbor index over catalog image embeddings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Up to `top_k` matches for `vector`, best first
    async fn query(&self, vector: Vec<f32>, top_k: u64) -> SimilarityResult<Vec<SimilarityMatch>>;
}
