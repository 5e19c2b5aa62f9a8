//! Similarity Domain
//!
//! Finds catalog products that look like a query image. The image comes
//! either from an upload or from the stored image of a known product.
//!
//! ## Pipeline
//!
//! ```text
//! image -> decode -> ImageEmbedder -> VectorIndex (top_k) -> record ids
//!       -> drop source record -> CatalogLookup (one batch) -> category filter
//! ```
//!
//! Collaborators are traits held behind `Arc`, so the HTTP embedder, Qdrant
//! index and prefix image loader can be swapped for fakes in tests.

pub mod decode;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod lookup;
pub mod models;
pub mod service;
pub mod source;

pub use decode::DecodedImage;
pub use embedding::{HttpEmbedderConfig, HttpImageEmbedder, ImageEmbedder, SerializedEmbedder};
pub use error::{SimilarityError, SimilarityResult};
pub use handlers::{ApiDoc, DEFAULT_MAX_UPLOAD_BYTES};
pub use index::{QdrantConfig, QdrantVectorIndex, VectorIndex};
pub use lookup::CatalogLookup;
pub use models::{ItemsResponse, RecommendationRequest, SimilarityMatch};
pub use service::{DEFAULT_TOP_K, SimilarityService};
pub use source::{PrefixImageLoader, SourceImageLoader};
