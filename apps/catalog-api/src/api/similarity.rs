//! Similarity API routes

use axum::Router;
use domain_similarity::handlers;

use crate::state::AppState;

/// Create similarity router with the configured upload limit
pub fn router(state: &AppState) -> Router {
    handlers::router(
        state.similarity.clone(),
        state.config.similarity.max_upload_bytes,
    )
}
