//! Alert enrichment module
//!
//! Best-effort fundamental/technical context attached to outgoing alerts.
//! Enrichment never blocks or fails a transition decision; every field is
//! optional and absent when the provider has nothing.

mod market_data;

pub use market_data::{fair_value, rsi, support_resistance, MarketDataEnricher};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional context computed for one symbol
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enrichment {
    /// Estimated fair value per share
    pub fair_value: Option<Decimal>,
    /// 14-period relative strength index
    pub rsi: Option<Decimal>,
    /// Recent support level
    pub support: Option<Decimal>,
    /// Recent resistance level
    pub resistance: Option<Decimal>,
}

impl Enrichment {
    /// True when no field could be computed
    pub fn is_empty(&self) -> bool {
        self.fair_value.is_none()
            && self.rsi.is_none()
            && self.support.is_none()
            && self.resistance.is_none()
    }
}

/// Trait for enrichment implementations
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Compute enrichment for a symbol at the given price, best-effort
    async fn enrich(&self, symbol: &str, price: Decimal) -> Enrichment;
}
