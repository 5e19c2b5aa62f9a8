//! Similarity pipeline metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Similarity metrics recorder
pub struct SimilarityMetrics;

impl SimilarityMetrics {
    /// Record a finished search. `source` is `upload` or `record`.
    pub fn record_search(source: &'static str, success: bool, candidates: usize, returned: usize) {
        let outcome = if success { "ok" } else { "error" };
        counter!(
            "similarity_searches_total",
            "source" => source,
            "outcome" => outcome
        )
        .increment(1);

        if success {
            histogram!("similarity_candidates", "stage" => "index").record(candidates as f64);
            histogram!("similarity_candidates", "stage" => "returned").record(returned as f64);
        }

        tracing::debug!(
            source = source,
            candidates = candidates,
            returned = returned,
            "Similarity search finished"
        );
    }
}

/// Timer guard for one pipeline stage (`decode`, `embed`, `query`, `join`).
///
/// Records into `similarity_stage_duration_seconds` when `stop()` is called
/// or when dropped.
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
    stopped: bool,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns duration in milliseconds.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!("similarity_stage_duration_seconds", "stage" => self.stage)
            .record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_timer_records_once() {
        let mut timer = StageTimer::start("embed");
        timer.stop();
        assert_eq!(timer.stop(), 0);
    }
}
