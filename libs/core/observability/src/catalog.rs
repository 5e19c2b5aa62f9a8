//! Catalog query metrics.

use metrics::{counter, histogram};
use std::time::Duration;

/// Catalog metrics recorder
pub struct CatalogMetrics;

impl CatalogMetrics {
    /// Record a completed catalog operation (`list`, `get`, `batch`).
    pub fn record_query(operation: &'static str, success: bool, duration: Duration) {
        let outcome = if success { "ok" } else { "error" };
        counter!(
            "catalog_queries_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
        histogram!("catalog_query_duration_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// The store's native count failed and the matching records were
    /// streamed and counted instead.
    pub fn record_count_fallback() {
        counter!("catalog_count_fallback_total").increment(1);
    }

    /// Ids requested in a batch lookup that had no matching record.
    pub fn record_batch_missing(missing: usize) {
        if missing > 0 {
            counter!("catalog_batch_missing_total").increment(missing as u64);
        }
    }
}
