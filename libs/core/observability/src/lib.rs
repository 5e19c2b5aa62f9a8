//! Observability utilities for the catalog service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Catalog query and similarity pipeline metrics
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, CatalogMetrics};
//!
//! init_metrics()?;
//!
//! CatalogMetrics::record_count_fallback();
//!
//! let app = Router::new().route("/metrics", get(metrics_handler));
//! ```

pub mod catalog;
pub mod middleware;
pub mod similarity;

pub use catalog::CatalogMetrics;
pub use middleware::metrics_middleware;
pub use similarity::{SimilarityMetrics, StageTimer};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once and return its handle.
///
/// Later calls return the existing handle. Fails if another global recorder
/// was installed first.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Catalog metrics
    describe_counter!(
        "catalog_queries_total",
        "Catalog operations by type and outcome"
    );
    describe_histogram!(
        "catalog_query_duration_seconds",
        "Catalog operation duration in seconds"
    );
    describe_counter!(
        "catalog_count_fallback_total",
        "Counts served by streaming records after the native count failed"
    );
    describe_counter!(
        "catalog_batch_missing_total",
        "Ids requested in batch lookups that matched no record"
    );

    // Similarity metrics
    describe_counter!(
        "similarity_searches_total",
        "Similarity searches by source and outcome"
    );
    describe_histogram!(
        "similarity_stage_duration_seconds",
        "Similarity pipeline stage duration in seconds"
    );
    describe_histogram!(
        "similarity_candidates",
        "Candidates per search returned by the index and after joining"
    );
}
