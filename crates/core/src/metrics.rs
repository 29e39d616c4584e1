//! Metrics definitions for the catalog browser.
//!
//! Metrics are collected using the `metrics` crate. The binary decides
//! whether a recorder is installed; without one, every call here is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Initialize all metric descriptions.
/// Call this once at startup before any metrics are recorded.
pub fn init_metrics() {
    describe_counter!(
        "catalog_pages_fetched_total",
        "Total number of catalog pages successfully merged"
    );
    describe_counter!(
        "catalog_fetch_errors_total",
        "Total number of failed page fetches (transport or payload)"
    );
    describe_counter!(
        "catalog_total_drift_total",
        "Total number of total-count drift detections"
    );
    describe_counter!(
        "catalog_session_resets_total",
        "Total number of pagination session resets"
    );
    describe_histogram!(
        "catalog_page_fetch_duration_seconds",
        "Time taken for a page fetch round trip in seconds"
    );
}

/// Record a successfully merged page.
pub fn record_page_fetched() {
    counter!("catalog_pages_fetched_total").increment(1);
}

/// Record a failed page fetch.
pub fn record_fetch_error() {
    counter!("catalog_fetch_errors_total").increment(1);
}

/// Record a total-count drift detection.
pub fn record_total_drift() {
    counter!("catalog_total_drift_total").increment(1);
}

/// Record a pagination session reset.
pub fn record_session_reset() {
    counter!("catalog_session_resets_total").increment(1);
}

/// Record a page fetch round trip duration.
pub fn record_fetch_duration(duration_secs: f64) {
    histogram!("catalog_page_fetch_duration_seconds").record(duration_secs);
}

/// A timer that automatically records the fetch duration when dropped.
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    /// Start a new fetch timer.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for FetchTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_fetch_duration(duration);
    }
}
