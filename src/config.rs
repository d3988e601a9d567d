//! Configuration types for liquidity-radar

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub quotes: QuotesConfig,
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    pub notify: NotifyConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Quote provider configuration
///
/// The API key itself is never stored in the file; only the name of the
/// environment variable that holds it.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotesConfig {
    /// Base URL for the TwelveData API
    #[serde(default = "default_twelvedata_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_twelvedata_key_env")]
    pub api_key_env: String,
}

fn default_twelvedata_url() -> String {
    "https://api.twelvedata.com".to_string()
}
fn default_twelvedata_key_env() -> String {
    "TWELVEDATA_API_KEY".to_string()
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            base_url: default_twelvedata_url(),
            api_key_env: default_twelvedata_key_env(),
        }
    }
}

/// Universe provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UniverseConfig {
    /// Base URL for the Finnhub API
    #[serde(default = "default_finnhub_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_finnhub_key_env")]
    pub api_key_env: String,

    /// Exchange code passed to the symbol listing endpoint
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// Cap on universe size per sweep (provider quota protection)
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,

    /// Static list used when the universe fetch fails and no prior
    /// successful fetch is cached
    #[serde(default)]
    pub fallback_symbols: Vec<String>,
}

fn default_finnhub_url() -> String {
    "https://finnhub.io/api/v1".to_string()
}
fn default_finnhub_key_env() -> String {
    "FINNHUB_API_KEY".to_string()
}
fn default_exchange() -> String {
    "US".to_string()
}
fn default_max_symbols() -> usize {
    500
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            base_url: default_finnhub_url(),
            api_key_env: default_finnhub_key_env(),
            exchange: default_exchange(),
            max_symbols: default_max_symbols(),
            fallback_symbols: vec![],
        }
    }
}

/// Eligibility filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Maximum price for a symbol to be considered (default 10.0)
    #[serde(default = "default_price_ceiling")]
    pub price_ceiling: Decimal,

    /// Minimum volume for a symbol to be considered (default 50,000)
    #[serde(default = "default_volume_floor")]
    pub volume_floor: Decimal,

    /// Symbols excluded from tracking regardless of price/volume
    #[serde(default)]
    pub denylist: HashSet<String>,
}

fn default_price_ceiling() -> Decimal {
    Decimal::new(10, 0) // 10.0
}
fn default_volume_floor() -> Decimal {
    Decimal::new(50_000, 0)
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            price_ceiling: default_price_ceiling(),
            volume_floor: default_volume_floor(),
            denylist: HashSet::new(),
        }
    }
}

/// Signal state machine thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// Volume multiple versus the previously seen volume required for entry
    #[serde(default = "default_entry_volume_multiple")]
    pub entry_volume_multiple: Decimal,

    /// Volume multiple versus the cycle peak required for enhancement
    #[serde(default = "default_enhancement_multiple")]
    pub enhancement_multiple: Decimal,

    /// Peak-volume ratio at or below which an exit warning fires
    #[serde(default = "default_exit_warning_threshold")]
    pub exit_warning_threshold: Decimal,

    /// Peak-volume ratio at or below which the final exit fires
    #[serde(default = "default_exit_final_threshold")]
    pub exit_final_threshold: Decimal,

    /// Capacity of the per-symbol price/volume history buffers
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Require price to confirm above entry before enhancement alerts
    #[serde(default)]
    pub price_confirmation: bool,

    /// Confirmation margin over the entry price (0.02 = +2%)
    #[serde(default = "default_price_confirmation_pct")]
    pub price_confirmation_pct: Decimal,
}

fn default_entry_volume_multiple() -> Decimal {
    Decimal::new(2, 0) // 2.0
}
fn default_enhancement_multiple() -> Decimal {
    Decimal::new(125, 2) // 1.25
}
fn default_exit_warning_threshold() -> Decimal {
    Decimal::new(85, 2) // 0.85
}
fn default_exit_final_threshold() -> Decimal {
    Decimal::new(75, 2) // 0.75
}
fn default_history_capacity() -> usize {
    10
}
fn default_price_confirmation_pct() -> Decimal {
    Decimal::new(2, 2) // 0.02 = 2%
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            entry_volume_multiple: default_entry_volume_multiple(),
            enhancement_multiple: default_enhancement_multiple(),
            exit_warning_threshold: default_exit_warning_threshold(),
            exit_final_threshold: default_exit_final_threshold(),
            history_capacity: default_history_capacity(),
            price_confirmation: false,
            price_confirmation_pct: default_price_confirmation_pct(),
        }
    }
}

/// Cooldown gate configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CooldownConfig {
    /// Minimum minutes between alerts of the same kind per symbol
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u64,

    /// Volume swing at or above which the cooldown is bypassed
    #[serde(default = "default_jump_factor")]
    pub jump_factor: Decimal,

    /// Volume swing at or below which the cooldown is bypassed
    #[serde(default = "default_drop_factor")]
    pub drop_factor: Decimal,
}

fn default_window_minutes() -> u64 {
    30
}
fn default_jump_factor() -> Decimal {
    Decimal::new(2, 0) // 2.0
}
fn default_drop_factor() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
            jump_factor: default_jump_factor(),
            drop_factor: default_drop_factor(),
        }
    }
}

/// Scan scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between full sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Milliseconds between per-symbol quote calls (100-1000)
    #[serde(default = "default_symbol_pacing_ms")]
    pub symbol_pacing_ms: u64,

    /// Seconds to wait before retrying after a sweep-level failure
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Bounded timeout for any single provider request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    60
}
fn default_symbol_pacing_ms() -> u64 {
    250
}
fn default_backoff_secs() -> u64 {
    30
}
fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            symbol_pacing_ms: default_symbol_pacing_ms(),
            backoff_secs: default_backoff_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Notification dispatcher configuration
///
/// Channel identifiers live in the config file; the bot token comes from
/// the environment variable named here.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Environment variable holding the Telegram bot token
    #[serde(default = "default_telegram_token_env")]
    pub bot_token_env: String,

    /// Channel for entry and enhancement alerts
    pub primary_channel: String,

    /// Channel for exit-warning and exit-final alerts
    pub secondary_channel: String,

    /// Per-kind routing overrides, e.g. `enhancement = "secondary"`
    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_telegram_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

/// Per-kind routing overrides
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RoutingConfig {
    #[serde(default)]
    pub entry: Option<ChannelRole>,
    #[serde(default)]
    pub enhancement: Option<ChannelRole>,
    #[serde(default)]
    pub exit_warning: Option<ChannelRole>,
    #[serde(default)]
    pub exit_final: Option<ChannelRole>,
}

/// Logical channel a kind of alert is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    Primary,
    Secondary,
}

/// Audit trail configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Path of the append-only CSV file
    #[serde(default = "default_audit_path")]
    pub csv_path: PathBuf,
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("liquidity_alerts.csv")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            csv_path: default_audit_path(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Expose Prometheus metrics over HTTP
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_metrics_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
            log_level: default_log_level(),
            metrics_enabled: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
