//! CLI interface for liquidity-radar
//!
//! Provides subcommands for:
//! - `run`: Continuous market monitoring
//! - `scan`: Run a single sweep and exit
//! - `config`: Show resolved configuration

mod run;
mod scan;

pub use run::RunArgs;
pub use scan::ScanArgs;

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::enrich::MarketDataEnricher;
use crate::notify::{ChannelRouter, TelegramNotifier};
use crate::quotes::{QuoteSource, TwelveDataClient};
use crate::scheduler::{Scheduler, SignalEngine};
use crate::signal::{CooldownGate, EligibilityFilter, SignalMachine};
use crate::universe::{FinnhubClient, UniverseSource};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "liquidity-radar")]
#[command(about = "Liquidity surge monitoring bot for low-priced US equities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Continuous market monitoring
    Run(RunArgs),
    /// Run a single sweep and exit
    Scan(ScanArgs),
    /// Show resolved configuration
    Config,
}

/// Wire the full pipeline from configuration
///
/// Shared by `run` and `scan`; API keys and the bot token come from the
/// environment variables the config names.
pub(crate) fn build_scheduler(
    config: &Config,
    stop: watch::Receiver<bool>,
) -> anyhow::Result<Scheduler> {
    let timeout = Duration::from_secs(config.scheduler.request_timeout_secs);

    let quotes = Arc::new(TwelveDataClient::from_config(&config.quotes, timeout)?);
    let fundamentals = Arc::new(FinnhubClient::from_config(&config.universe, timeout)?);
    let enricher = Arc::new(MarketDataEnricher::new(quotes.clone(), fundamentals.clone()));
    let notifier = Arc::new(TelegramNotifier::from_config(&config.notify, timeout)?);

    let engine = SignalEngine::new(
        EligibilityFilter::new(config.filter.clone()),
        SignalMachine::new(config.signal.clone(), config.filter.volume_floor),
        CooldownGate::new(&config.cooldown),
        quotes as Arc<dyn QuoteSource>,
        enricher,
        notifier,
        ChannelRouter::from_config(&config.notify),
        AuditLogger::new(config.audit.csv_path.clone()),
    );

    Ok(Scheduler::new(
        engine,
        fundamentals as Arc<dyn UniverseSource>,
        config.scheduler.clone(),
        config.universe.fallback_symbols.clone(),
        stop,
    ))
}
