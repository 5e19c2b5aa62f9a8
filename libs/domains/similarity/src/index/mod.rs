mod config;
mod provider;
mod qdrant;

pub use config::QdrantConfig;
#[cfg(test)]
pub use provider::MockVectorIndex;
pub use provider::VectorIndex;
pub use qdrant::QdrantVectorIndex;
