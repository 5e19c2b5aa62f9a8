use mongodb::{Database, bson::doc};
use std::time::Instant;

use crate::common::{DatabaseError, DatabaseResult};

/// Health check status for MongoDB
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Error details when unhealthy
    pub message: Option<String>,
    pub response_time_ms: u64,
}

pub(crate) async fn ping(db: &Database) -> Result<(), mongodb::error::Error> {
    db.run_command(doc! { "ping": 1 }).await.map(|_| ())
}

/// Runs `ping` against `db`. Needs no privileges beyond database access.
pub async fn check_health(db: &Database) -> DatabaseResult<()> {
    ping(db)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))
}

/// Like [`check_health`] but also reports latency.
pub async fn check_health_detailed(db: &Database) -> HealthStatus {
    let start = Instant::now();
    let result = ping(db).await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthStatus {
            healthy: true,
            message: None,
            response_time_ms,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time_ms,
        },
    }
}
