//! Observability counters for a pipeline run.
//!
//! Metrics are created when a run starts and finalized exactly once at
//! the end; they never influence control flow.

use chrono::{DateTime, Utc};

use crate::error::ErrorCategory;

/// Counters and timings collected across one pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessingMetrics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub file_size_bytes: usize,
    pub tokens_used: u32,
    pub retry_count: u32,
    pub chunks_processed: usize,
    pub success: bool,
    pub method: Option<String>,
    pub error_category: Option<ErrorCategory>,
}

impl ProcessingMetrics {
    /// Start the clock for a new run.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            file_size_bytes: 0,
            tokens_used: 0,
            retry_count: 0,
            chunks_processed: 0,
            success: false,
            method: None,
            error_category: None,
        }
    }

    /// Accumulate one chunk's enhancement accounting.
    pub fn record_enhancement(&mut self, tokens: u32, retries: u32) {
        self.tokens_used += tokens;
        self.retry_count += retries;
        self.chunks_processed += 1;
    }

    /// Finalize a successful run.
    pub fn finish_ok(&mut self, method: &str) {
        self.finished_at = Some(Utc::now());
        self.success = true;
        self.method = Some(method.to_string());
    }

    /// Finalize a failed run.
    pub fn finish_err(&mut self, category: ErrorCategory) {
        self.finished_at = Some(Utc::now());
        self.success = false;
        self.error_category = Some(category);
    }

    /// Wall-clock duration of the run so far, in milliseconds.
    pub fn processing_time_ms(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }

    /// Source size in megabytes, rounded to two decimals.
    pub fn file_size_mb(&self) -> f64 {
        let mb = self.file_size_bytes as f64 / (1024.0 * 1024.0);
        (mb * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhancement_accounting_accumulates() {
        let mut metrics = ProcessingMetrics::start();
        metrics.record_enhancement(120, 0);
        metrics.record_enhancement(80, 3);

        assert_eq!(metrics.tokens_used, 200);
        assert_eq!(metrics.retry_count, 3);
        assert_eq!(metrics.chunks_processed, 2);
    }

    #[test]
    fn test_finish_ok_sets_success_and_method() {
        let mut metrics = ProcessingMetrics::start();
        metrics.finish_ok("heuristic-scrape");

        assert!(metrics.success);
        assert_eq!(metrics.method.as_deref(), Some("heuristic-scrape"));
        assert!(metrics.finished_at.is_some());
        assert!(metrics.processing_time_ms() >= 0);
    }

    #[test]
    fn test_finish_err_records_category() {
        let mut metrics = ProcessingMetrics::start();
        metrics.finish_err(ErrorCategory::Processing);

        assert!(!metrics.success);
        assert_eq!(metrics.error_category, Some(ErrorCategory::Processing));
    }

    #[test]
    fn test_file_size_mb_rounds() {
        let mut metrics = ProcessingMetrics::start();
        metrics.file_size_bytes = 1_572_864; // 1.5 MB
        assert_eq!(metrics.file_size_mb(), 1.5);

        metrics.file_size_bytes = 0;
        assert_eq!(metrics.file_size_mb(), 0.0);
    }
}
