//! Symbol universe module
//!
//! Lists the symbols each sweep iterates over

mod finnhub;

pub use finnhub::{FinancialMetrics, FinnhubClient};

use async_trait::async_trait;

/// Trait for universe source implementations
#[async_trait]
pub trait UniverseSource: Send + Sync {
    /// List the symbols eligible for scanning, deduplicated, provider order
    async fn list_symbols(&self) -> anyhow::Result<Vec<String>>;
}
