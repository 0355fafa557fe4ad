//! Prometheus metrics for a CLI invocation.
//!
//! The core library records batch, render and packaging metrics into its
//! own statics; this module registers them and writes a text-format
//! snapshot when the user asks for one with `--metrics-file`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Unix time the snapshot was taken.
pub static SNAPSHOT_TIMESTAMP: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "accredit_snapshot_timestamp_seconds",
        "Unix time when this metrics snapshot was written",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(SNAPSHOT_TIMESTAMP.clone()))
        .unwrap();

    for metric in accredit_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Write a snapshot of all metrics to `path`.
pub fn write_metrics_file(path: &Path) -> Result<()> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    SNAPSHOT_TIMESTAMP.set(now);

    let text = encode_metrics()?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
