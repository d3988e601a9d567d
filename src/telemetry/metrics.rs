//! Prometheus metrics
//!
//! Counters and gauges for sweep progress and alert flow, exported over
//! HTTP when enabled in config.

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus HTTP exporter on the given port
pub(super) fn init_exporter(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}

/// Count a completed sweep
pub fn incr_sweep() {
    ::metrics::counter!("liqradar_sweeps_total").increment(1);
}

/// Count a symbol quoted within a sweep
pub fn incr_symbol_scanned() {
    ::metrics::counter!("liqradar_symbols_scanned_total").increment(1);
}

/// Count a dispatched alert by kind
pub fn incr_alert(kind: &'static str) {
    ::metrics::counter!("liqradar_alerts_total", "kind" => kind).increment(1);
}

/// Count a symbol skipped on a quote error
pub fn incr_quote_error() {
    ::metrics::counter!("liqradar_quote_errors_total").increment(1);
}

/// Record how many symbols are currently tracked
pub fn set_tracked_symbols(count: usize) {
    ::metrics::gauge!("liqradar_tracked_symbols").set(count as f64);
}
