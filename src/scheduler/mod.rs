//! Scan scheduler module
//!
//! Drives the repeating sweep over the eligible universe: pacing between
//! symbols, the sweep interval between rounds, fallback and backoff on
//! universe failure, and cooperative shutdown.

mod engine;

pub use engine::SignalEngine;

use crate::config::SchedulerConfig;
use crate::telemetry;
use crate::universe::UniverseSource;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Outcome of one sweep
#[derive(Debug, Default, Clone)]
pub struct SweepStats {
    /// Symbols quoted this sweep
    pub scanned: usize,
    /// Alerts dispatched this sweep
    pub alerts: usize,
    /// Symbols skipped on provider errors
    pub errors: usize,
    /// Sweep was cut short by the stop signal
    pub stopped: bool,
}

/// Periodic sweep driver
///
/// The loop never terminates on its own; only the stop signal ends it, and
/// an in-flight symbol always finishes first.
pub struct Scheduler {
    engine: SignalEngine,
    universe: Arc<dyn UniverseSource>,
    config: SchedulerConfig,
    fallback_symbols: Vec<String>,
    cached_universe: Vec<String>,
    stop: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(
        engine: SignalEngine,
        universe: Arc<dyn UniverseSource>,
        config: SchedulerConfig,
        fallback_symbols: Vec<String>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            engine,
            universe,
            config,
            fallback_symbols,
            cached_universe: Vec::new(),
            stop,
        }
    }

    /// Run sweeps until the stop signal fires
    pub async fn run(mut self) -> anyhow::Result<()> {
        tracing::info!(
            sweep_interval_secs = self.config.sweep_interval_secs,
            symbol_pacing_ms = self.config.symbol_pacing_ms,
            "Scan scheduler started"
        );

        loop {
            if *self.stop.borrow() {
                break;
            }

            let symbols = match self.resolve_universe().await {
                Ok(symbols) => symbols,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backoff_secs = self.config.backoff_secs,
                        "Universe unavailable, backing off"
                    );
                    if self.sleep_or_stop(Duration::from_secs(self.config.backoff_secs)).await {
                        break;
                    }
                    continue;
                }
            };

            let stats = self.sweep(&symbols).await;
            telemetry::incr_sweep();
            telemetry::set_tracked_symbols(self.engine.tracked_count());
            tracing::info!(
                scanned = stats.scanned,
                alerts = stats.alerts,
                errors = stats.errors,
                tracked = self.engine.tracked_count(),
                "Sweep complete"
            );

            if stats.stopped
                || self
                    .sleep_or_stop(Duration::from_secs(self.config.sweep_interval_secs))
                    .await
            {
                break;
            }
        }

        tracing::info!("Scan scheduler stopped");
        Ok(())
    }

    /// Run exactly one sweep (used by the `scan` subcommand)
    pub async fn sweep_once(&mut self) -> anyhow::Result<SweepStats> {
        let symbols = self.resolve_universe().await?;
        Ok(self.sweep(&symbols).await)
    }

    /// Fetch the universe, falling back to the last good list and then the
    /// static list when the provider fails
    async fn resolve_universe(&mut self) -> anyhow::Result<Vec<String>> {
        match self.universe.list_symbols().await {
            Ok(symbols) if !symbols.is_empty() => {
                let symbols = dedupe(symbols);
                self.cached_universe = symbols.clone();
                Ok(symbols)
            }
            Ok(_) => self.fallback("universe fetch returned no symbols"),
            Err(e) => self.fallback(&format!("universe fetch failed: {e}")),
        }
    }

    fn fallback(&self, why: &str) -> anyhow::Result<Vec<String>> {
        if !self.cached_universe.is_empty() {
            tracing::warn!(why, "Falling back to cached universe");
            return Ok(self.cached_universe.clone());
        }
        if !self.fallback_symbols.is_empty() {
            tracing::warn!(why, "Falling back to static symbol list");
            return Ok(dedupe(self.fallback_symbols.clone()));
        }
        anyhow::bail!("{why} and no fallback list is configured")
    }

    /// Sweep the given symbols, each quoted at most once
    async fn sweep(&mut self, symbols: &[String]) -> SweepStats {
        let mut stats = SweepStats::default();
        let pacing = Duration::from_millis(self.config.symbol_pacing_ms);

        for symbol in symbols {
            // an in-flight symbol finishes; the next one does not start
            if *self.stop.borrow() {
                stats.stopped = true;
                break;
            }

            match self.engine.process_symbol(symbol).await {
                Ok(Some(alert)) => {
                    stats.alerts += 1;
                    tracing::debug!(symbol, kind = %alert.kind, "Alert dispatched");
                }
                Ok(None) => {}
                Err(e) => {
                    stats.errors += 1;
                    telemetry::incr_quote_error();
                    tracing::debug!(symbol, error = %e, "Quote failed, skipping this sweep");
                }
            }
            stats.scanned += 1;
            telemetry::incr_symbol_scanned();

            tokio::time::sleep(pacing).await;
        }

        stats
    }

    /// Sleep for `duration`, returning true if the stop signal fired first
    async fn sleep_or_stop(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            changed = self.stop.changed() => match changed {
                Ok(()) => *self.stop.borrow(),
                // sender dropped: treat as a stop request
                Err(_) => true,
            },
        }
    }
}

fn dedupe(symbols: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserves_order() {
        let symbols = vec![
            "SNDL".to_string(),
            "GSAT".to_string(),
            "SNDL".to_string(),
            "SIRI".to_string(),
        ];
        assert_eq!(dedupe(symbols), vec!["SNDL", "GSAT", "SIRI"]);
    }

    #[test]
    fn test_sweep_stats_default() {
        let stats = SweepStats::default();
        assert_eq!(stats.scanned, 0);
        assert_eq!(stats.alerts, 0);
        assert_eq!(stats.errors, 0);
        assert!(!stats.stopped);
    }
}
