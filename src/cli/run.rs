//! Run command implementation

use crate::config::Config;
use clap::Args;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    /// Monitor continuously until interrupted
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let scheduler = super::build_scheduler(config, stop_rx)?;

        let mut handle = tokio::spawn(scheduler.run());

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, finishing current symbol");
                let _ = stop_tx.send(true);
                handle.await??;
            }
            result = &mut handle => {
                result??;
            }
        }

        Ok(())
    }
}
