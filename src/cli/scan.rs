//! Scan command implementation

use crate::config::Config;
use clap::Args;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct ScanArgs {}

impl ScanArgs {
    /// Run a single sweep over the universe and report totals
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let (_stop_tx, stop_rx) = watch::channel(false);
        let mut scheduler = super::build_scheduler(config, stop_rx)?;

        let stats = scheduler.sweep_once().await?;

        tracing::info!(
            scanned = stats.scanned,
            alerts = stats.alerts,
            errors = stats.errors,
            "Scan complete"
        );

        Ok(())
    }
}
