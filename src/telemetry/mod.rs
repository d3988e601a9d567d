//! Telemetry module
//!
//! Structured logging and Prometheus metrics

mod logging;
mod metrics;

pub use logging::init_logging;
pub use metrics::{
    incr_alert, incr_quote_error, incr_sweep, incr_symbol_scanned, set_tracked_symbols,
};

use crate::config::TelemetryConfig;

/// Guard that pins telemetry for the process lifetime
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level)?;

    if config.metrics_enabled {
        metrics::init_exporter(config.metrics_port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
