//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Batch runs (outcome, records read)
//! - Card rendering (cards by role, failures, duration)
//! - Roster validation (rejected rows by reason)
//! - Packaging (archives by result)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Batch Metrics
// =============================================================================

/// Batch runs total by result.
pub static BATCH_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("accredit_batch_runs_total", "Total batch runs"),
        &["result"], // "done", "failed"
    )
    .unwrap()
});

/// Roster rows read across all runs.
pub static RECORDS_READ: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("accredit_records_read_total", "Total roster rows read").unwrap()
});

/// Rows rejected before rendering, by reason.
pub static RECORDS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "accredit_records_rejected_total",
            "Total roster rows rejected",
        ),
        &["reason"], // "missing_id", "duplicate_id", "malformed_row"
    )
    .unwrap()
});

// =============================================================================
// Render Metrics
// =============================================================================

/// Cards rendered total by role.
pub static CARDS_RENDERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("accredit_cards_rendered_total", "Total cards rendered"),
        &["role"],
    )
    .unwrap()
});

/// Card render failures by reason.
pub static RENDER_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "accredit_render_failures_total",
            "Total card render failures",
        ),
        &["reason"],
    )
    .unwrap()
});

/// Card render duration in seconds.
pub static RENDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "accredit_render_duration_seconds",
            "Duration of a single card render",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["role"],
    )
    .unwrap()
});

// =============================================================================
// Packaging Metrics
// =============================================================================

/// Archives written total by result.
pub static ARCHIVES_WRITTEN: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("accredit_archives_total", "Total archive attempts"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Documents bundled into archives.
pub static DOCUMENTS_ARCHIVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "accredit_documents_archived_total",
        "Total documents bundled into archives",
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Batch
        Box::new(BATCH_RUNS.clone()),
        Box::new(RECORDS_READ.clone()),
        Box::new(RECORDS_REJECTED.clone()),
        // Render
        Box::new(CARDS_RENDERED.clone()),
        Box::new(RENDER_FAILURES.clone()),
        Box::new(RENDER_DURATION.clone()),
        // Packaging
        Box::new(ARCHIVES_WRITTEN.clone()),
        Box::new(DOCUMENTS_ARCHIVED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        CARDS_RENDERED.with_label_values(&["staff"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"accredit_cards_rendered_total".to_string()));
    }
}
