//! Quote source module
//!
//! Provides current price/volume/percent-change snapshots per symbol

mod twelvedata;

pub use twelvedata::{Candle, TwelveDataClient};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One price/volume sample for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Trading symbol (e.g., "SNDL")
    pub symbol: String,
    /// Last traded price
    pub price: Decimal,
    /// Session volume
    pub volume: Decimal,
    /// Percent change versus previous close
    pub percent_change: Decimal,
}

/// Failure taxonomy for quote fetches
///
/// Every variant is transient from the sweep's point of view: the symbol is
/// skipped for this iteration and retried on the next one.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("symbol not found: {0}")]
    NotFound(String),
    #[error("malformed quote payload: {0}")]
    Malformed(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Trait for quote source implementations
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for a symbol
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError>;
}
