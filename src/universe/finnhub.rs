//! Finnhub API client
//!
//! Supplies the scan universe (`/stock/symbol`) and the fundamental metrics
//! used by fair-value enrichment (`/stock/metric`).

use super::UniverseSource;
use crate::config::UniverseConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Client for the Finnhub API
pub struct FinnhubClient {
    base_url: String,
    api_key: String,
    exchange: String,
    max_symbols: usize,
    client: Client,
}

impl FinnhubClient {
    /// Create a new client; the API key is resolved from the environment
    pub fn from_config(config: &UniverseConfig, timeout: Duration) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!("missing API key environment variable {}", config.api_key_env)
        })?;
        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            config.exchange.clone(),
            config.max_symbols,
            timeout,
        ))
    }

    /// Create a new client with explicit credentials
    pub fn new(
        base_url: String,
        api_key: String,
        exchange: String,
        max_symbols: usize,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            exchange,
            max_symbols,
            client,
        }
    }

    /// Fetch fundamental metrics for a symbol, best-effort
    pub async fn stock_metrics(&self, symbol: &str) -> anyhow::Result<FinancialMetrics> {
        let url = format!("{}/stock/metric", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("metric", "all"),
                ("token", &self.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Finnhub metric error: {}", response.status());
        }

        let body: FhMetricResponse = response.json().await?;
        let m = body.metric.unwrap_or_default();

        Ok(FinancialMetrics {
            cash_per_share: m.total_cash_per_share_ttm.and_then(Decimal::from_f64_retain),
            debt_to_capital: m
                .total_debt_to_total_capital_ttm
                .and_then(Decimal::from_f64_retain),
            pe_ratio: m.pe_basic_excl_extra_ttm.and_then(Decimal::from_f64_retain),
            shares_outstanding: m.shares_outstanding.and_then(Decimal::from_f64_retain),
        })
    }
}

#[async_trait]
impl UniverseSource for FinnhubClient {
    async fn list_symbols(&self) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/stock/symbol", self.base_url);

        tracing::debug!(url = %url, exchange = %self.exchange, "Fetching symbol universe");

        let response = self
            .client
            .get(&url)
            .query(&[("exchange", self.exchange.as_str()), ("token", &self.api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Finnhub symbol error: {} - {}", status, body);
        }

        let listings: Vec<FhSymbol> = response.json().await?;

        let mut seen = std::collections::HashSet::new();
        let symbols: Vec<String> = listings
            .into_iter()
            .filter(is_plain_common_stock)
            .map(|l| l.symbol)
            .filter(|s| seen.insert(s.clone()))
            .take(self.max_symbols)
            .collect();

        tracing::info!(count = symbols.len(), "Fetched symbol universe");

        Ok(symbols)
    }
}

/// Keep short, plain common-stock tickers; dotted share classes and long
/// structured product symbols are skipped
fn is_plain_common_stock(listing: &FhSymbol) -> bool {
    listing.symbol_type.as_deref() == Some("Common Stock")
        && !listing.symbol.contains('.')
        && listing.symbol.len() <= 5
}

/// Fundamental metrics used for fair-value estimation
///
/// Every field is optional; Finnhub omits what it does not cover.
#[derive(Debug, Clone, Default)]
pub struct FinancialMetrics {
    pub cash_per_share: Option<Decimal>,
    pub debt_to_capital: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub shares_outstanding: Option<Decimal>,
}

/// Raw symbol listing
#[derive(Debug, Deserialize)]
struct FhSymbol {
    symbol: String,
    #[serde(rename = "type")]
    symbol_type: Option<String>,
}

/// Raw metric response
#[derive(Debug, Deserialize)]
struct FhMetricResponse {
    metric: Option<FhMetrics>,
}

#[derive(Debug, Deserialize, Default)]
struct FhMetrics {
    #[serde(rename = "totalCashPerShareTTM")]
    total_cash_per_share_ttm: Option<f64>,
    #[serde(rename = "totalDebtToTotalCapitalTTM")]
    total_debt_to_total_capital_ttm: Option<f64>,
    #[serde(rename = "peBasicExclExtraTTM")]
    pe_basic_excl_extra_ttm: Option<f64>,
    #[serde(rename = "sharesOutstanding")]
    shares_outstanding: Option<f64>,
}
