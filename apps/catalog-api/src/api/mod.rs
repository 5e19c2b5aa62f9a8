//! API routes module

pub mod catalog;
pub mod health;
pub mod similarity;

use axum::{middleware, routing::get, Router};
use observability::metrics_middleware;

use crate::state::AppState;

/// Catalog and similarity routes, mounted at the root by `create_router`.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", catalog::router(state))
        .merge(similarity::router(state))
        .layer(middleware::from_fn(metrics_middleware))
}

/// `/ready` with live collaborator checks, merged beside the stateless app router.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
