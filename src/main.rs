use clap::Parser;
use liquidity_radar::cli::{Cli, Commands};
use liquidity_radar::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).map_err(|e| {
        anyhow::anyhow!(
            "Could not load config from {}: {} (see config.toml.example)",
            cli.config,
            e
        )
    })?;

    // Initialize telemetry
    let _guard = liquidity_radar::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting continuous monitoring");
            args.execute(&config).await?;
        }
        Commands::Scan(args) => {
            tracing::info!("Starting single sweep");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Quotes: {}", config.quotes.base_url);
            println!(
                "  Universe: {} {} (max {})",
                config.universe.base_url, config.universe.exchange, config.universe.max_symbols
            );
            println!(
                "  Filter: price <= {}, volume >= {}, denylist {} symbols",
                config.filter.price_ceiling,
                config.filter.volume_floor,
                config.filter.denylist.len()
            );
            println!(
                "  Thresholds: entry x{}, enhance x{}, warn {}, final {}",
                config.signal.entry_volume_multiple,
                config.signal.enhancement_multiple,
                config.signal.exit_warning_threshold,
                config.signal.exit_final_threshold
            );
            println!("  Cooldown: {} min", config.cooldown.window_minutes);
            println!(
                "  Sweep: every {}s, pacing {}ms",
                config.scheduler.sweep_interval_secs, config.scheduler.symbol_pacing_ms
            );
            println!(
                "  Channels: {} / {}",
                config.notify.primary_channel, config.notify.secondary_channel
            );
            println!("  Audit: {}", config.audit.csv_path.display());
        }
    }

    Ok(())
}
