//! Readiness checks against the MongoDB deployment and the vector index.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{run_health_checks, HealthCheckFuture};

pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "mongodb",
            Box::pin(async {
                database::mongodb::check_health(&state.db)
                    .await
                    .map_err(|e| format!("MongoDB ping failed: {}", e))
            }),
        ),
        (
            "qdrant",
            Box::pin(async {
                state
                    .vector_index
                    .health_check()
                    .await
                    .map_err(|e| format!("Qdrant health check failed: {}", e))
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
