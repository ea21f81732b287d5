//! Prometheus metrics.
//!
//! HTTP request metrics come from the `axum-prometheus` layer; upload and lookup
//! counters are recorded through the `metrics` facade and rendered by the same
//! recorder. Counters are no-ops unless the recorder has been installed, which
//! only happens when `enable_metrics` is set.

use axum_prometheus::PrometheusMetricLayer;
use metrics_exporter_prometheus::PrometheusHandle;
use metrics::counter;
use std::sync::OnceLock;

/// The global recorder can only be installed once per process.
static PROMETHEUS: OnceLock<(PrometheusMetricLayer<'static>, PrometheusHandle)> = OnceLock::new();

/// Install the Prometheus recorder (first call only) and return the layer and render handle.
pub fn prometheus() -> (PrometheusMetricLayer<'static>, PrometheusHandle) {
    PROMETHEUS.get_or_init(PrometheusMetricLayer::pair).clone()
}

/// Record a stored upload.
pub fn record_upload(size_bytes: u64) {
    counter!("pdfshare_uploads_total").increment(1);
    counter!("pdfshare_upload_bytes_total").increment(size_bytes);
}

/// Record an identifier that did not resolve to a stored file.
pub fn record_lookup_miss(route: &'static str) {
    counter!("pdfshare_lookup_misses_total", "route" => route).increment(1);
}
