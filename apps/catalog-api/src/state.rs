//! Application state management

use domain_catalog::{CatalogService, MongoCatalogRepository};
use domain_similarity::{QdrantVectorIndex, SimilarityService};
use mongodb::{Client, Database};
use std::sync::Arc;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
    pub catalog: Arc<CatalogService<MongoCatalogRepository>>,
    pub similarity: Arc<SimilarityService>,
    pub vector_index: Arc<QdrantVectorIndex>,
}
