//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Provider pool (list/download calls, discards, timeouts)
//! - Pipeline (selection and save outcomes)
//! - Refiners (successes/failures per refiner)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Provider pool metrics
// =============================================================================

/// `list_subtitles` calls per provider by result.
pub static PROVIDER_LIST_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subcore_provider_list_requests_total",
            "Total list_subtitles calls per provider",
        ),
        &["provider", "result"], // "success", "timeout", "error"
    )
    .unwrap()
});

/// `download_subtitle` calls per provider by result.
pub static PROVIDER_DOWNLOAD_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subcore_provider_download_requests_total",
            "Total download_subtitle calls per provider",
        ),
        &["provider", "result"], // "success", "timeout", "error", "invalid"
    )
    .unwrap()
});

/// Provider call latency.
pub static PROVIDER_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subcore_provider_call_duration_seconds",
            "Duration of provider list/download calls",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]),
        &["provider", "operation"],
    )
    .unwrap()
});

/// Providers discarded for the remainder of a pool's lifetime.
pub static PROVIDER_DISCARDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subcore_provider_discards_total", "Total provider discards"),
        &["provider", "reason"], // "initialize_failed", "timeout", "error"
    )
    .unwrap()
});

/// Candidates returned per `list_subtitles` call, pre-dedup.
pub static CANDIDATES_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subcore_candidates_returned",
            "Number of subtitle candidates returned per list_subtitles call",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["provider"],
    )
    .unwrap()
});

// =============================================================================
// Pipeline metrics
// =============================================================================

/// `download_best_subtitles` outcomes per video.
pub static DOWNLOADS_PER_VIDEO: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subcore_downloads_per_video",
            "Number of subtitles downloaded per video",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0]),
        &[],
    )
    .unwrap()
});

/// Videos rejected by `check_video` by reason.
pub static VIDEOS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subcore_videos_rejected_total",
            "Total videos rejected by the pre-download check",
        ),
        &["reason"], // "languages_present", "too_old", "undefined_present"
    )
    .unwrap()
});

/// Subtitles persisted to disk by result.
pub static SAVES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subcore_saves_total", "Total subtitle save attempts"),
        &["result"], // "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Refiner metrics
// =============================================================================

/// Refiner runs by result.
pub static REFINER_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subcore_refiner_runs_total", "Total refiner invocations"),
        &["refiner", "result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROVIDER_LIST_REQUESTS.clone()),
        Box::new(PROVIDER_DOWNLOAD_REQUESTS.clone()),
        Box::new(PROVIDER_CALL_DURATION.clone()),
        Box::new(PROVIDER_DISCARDS.clone()),
        Box::new(CANDIDATES_RETURNED.clone()),
        Box::new(DOWNLOADS_PER_VIDEO.clone()),
        Box::new(VIDEOS_REJECTED.clone()),
        Box::new(SAVES_TOTAL.clone()),
        Box::new(REFINER_RUNS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_registers_without_panicking() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
