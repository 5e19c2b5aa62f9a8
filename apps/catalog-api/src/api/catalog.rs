//! Catalog API routes

use axum::Router;
use domain_catalog::{handlers, MongoCatalogRepository};

use crate::state::AppState;

/// Create catalog router
pub fn router(state: &AppState) -> Router {
    handlers::router(state.catalog.clone())
}

/// Create the single-attribute indexes used by listing filters
pub async fn init_indexes(repository: &MongoCatalogRepository) -> eyre::Result<()> {
    repository.init_indexes().await?;
    Ok(())
}
