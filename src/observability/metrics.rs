//! Metrics collection and exposition.
//!
//! # Metrics
//! - `uptime_probes_total` (counter): probes by outcome (success/failure)
//! - `uptime_probe_duration_seconds` (histogram): probe latency
//! - `uptime_active_schedules` (gauge): live schedule entries
//! - `uptime_reconcile_passes_total` (counter): passes by result (ok/error)
//! - `uptime_notifications_total` (counter): alerts by result (sent/failed)
//! - `uptime_record_failures_total` (counter): outcomes lost on write
//! - `uptime_skipped_firings_total` (counter): ticks dropped by overlap = skip
//!
//! Without an installed exporter every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(success: bool, response_time_ms: Option<u64>) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("uptime_probes_total", "outcome" => outcome).increment(1);
    if let Some(ms) = response_time_ms {
        metrics::histogram!("uptime_probe_duration_seconds").record(ms as f64 / 1000.0);
    }
}

pub fn set_active_schedules(count: usize) {
    metrics::gauge!("uptime_active_schedules").set(count as f64);
}

pub fn record_reconcile_pass(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("uptime_reconcile_passes_total", "result" => result).increment(1);
}

pub fn record_notification(sent: bool) {
    let result = if sent { "sent" } else { "failed" };
    metrics::counter!("uptime_notifications_total", "result" => result).increment(1);
}

pub fn record_write_failure() {
    metrics::counter!("uptime_record_failures_total").increment(1);
}

pub fn record_skipped_firing() {
    metrics::counter!("uptime_skipped_firings_total").increment(1);
}
