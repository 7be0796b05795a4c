//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wave_feed_messages` (gauge): messages currently in the feed
//! - `wave_events_total` (counter): live `NewWave` events appended
//! - `wave_submissions_total` (counter): submissions by outcome
//! - `wave_rpc_errors_total` (counter): failed provider requests by method
//!
//! Recording without an installed exporter is a no-op.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install metrics exporter: {}", e))?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_feed_size(len: usize) {
    gauge!("wave_feed_messages").set(len as f64);
}

pub fn record_live_event() {
    counter!("wave_events_total").increment(1);
}

pub fn record_submission(outcome: &'static str) {
    counter!("wave_submissions_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_error(method: &str) {
    counter!("wave_rpc_errors_total", "method" => method.to_string()).increment(1);
}
