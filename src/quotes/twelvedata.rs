//! TwelveData API client
//!
//! Fetches current quotes via `/quote` and daily candles via `/time_series`.
//! TwelveData reports numeric fields as JSON strings and signals errors in
//! the body of a 200 response, so both paths are handled explicitly.

use super::{Quote, QuoteError, QuoteSource};
use crate::config::QuotesConfig;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

/// A single daily candle from the time series endpoint
#[derive(Debug, Clone)]
pub struct Candle {
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

/// Client for the TwelveData API
pub struct TwelveDataClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl TwelveDataClient {
    /// Create a new client; the API key is resolved from the environment
    pub fn from_config(config: &QuotesConfig, timeout: Duration) -> anyhow::Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!("missing API key environment variable {}", config.api_key_env)
        })?;
        Ok(Self::new(config.base_url.clone(), api_key, timeout))
    }

    /// Create a new client with explicit credentials
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Fetch recent daily candles, most recent first
    ///
    /// Used for enrichment only; callers treat any error as "no data".
    pub async fn daily_series(
        &self,
        symbol: &str,
        outputsize: usize,
    ) -> Result<Vec<Candle>, QuoteError> {
        let url = format!("{}/time_series", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", "1day"),
                ("outputsize", &outputsize.to_string()),
                ("apikey", &self.api_key),
            ])
            .send()
            .await
            .map_err(map_transport)?;

        if response.status().as_u16() == 429 {
            return Err(QuoteError::RateLimited);
        }

        let body: TdSeriesResponse = response.json().await.map_err(map_transport)?;
        check_body_error(symbol, body.status.as_deref(), body.code, body.message)?;

        let values = body
            .values
            .ok_or_else(|| QuoteError::Malformed(format!("{symbol}: missing values")))?;

        values
            .into_iter()
            .map(|v| {
                Ok(Candle {
                    high: parse_field(symbol, "high", Some(v.high.as_str()))?,
                    low: parse_field(symbol, "low", Some(v.low.as_str()))?,
                    close: parse_field(symbol, "close", Some(v.close.as_str()))?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl QuoteSource for TwelveDataClient {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let url = format!("{}/quote", self.base_url);

        tracing::trace!(symbol, "Fetching quote");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("apikey", &self.api_key)])
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(QuoteError::RateLimited);
        }
        if status.as_u16() == 404 {
            return Err(QuoteError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(QuoteError::Malformed(format!(
                "{symbol}: HTTP {status}"
            )));
        }

        let raw: TdQuoteResponse = response.json().await.map_err(map_transport)?;
        check_body_error(symbol, raw.status.as_deref(), raw.code, raw.message)?;

        // `/quote` reports the last trade as `close`; some plan tiers also
        // include a `price` field. Accept either.
        let price_str = raw.price.as_deref().or(raw.close.as_deref());
        let price = parse_field(symbol, "price", price_str)?;
        let volume = parse_field(symbol, "volume", raw.volume.as_deref())?;
        let percent_change = raw
            .percent_change
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok())
            .unwrap_or(Decimal::ZERO);

        Ok(Quote {
            symbol: symbol.to_string(),
            price,
            volume,
            percent_change,
        })
    }
}

fn map_transport(e: reqwest::Error) -> QuoteError {
    if e.is_timeout() {
        QuoteError::Timeout
    } else {
        QuoteError::Transport(e)
    }
}

/// TwelveData wraps errors in a 200 body with `status = "error"`
fn check_body_error(
    symbol: &str,
    status: Option<&str>,
    code: Option<i64>,
    message: Option<String>,
) -> Result<(), QuoteError> {
    if status != Some("error") {
        return Ok(());
    }
    match code {
        Some(404) => Err(QuoteError::NotFound(symbol.to_string())),
        Some(429) => Err(QuoteError::RateLimited),
        _ => Err(QuoteError::Malformed(format!(
            "{symbol}: {}",
            message.unwrap_or_else(|| "unknown provider error".to_string())
        ))),
    }
}

fn parse_field(symbol: &str, name: &str, value: Option<&str>) -> Result<Decimal, QuoteError> {
    let raw = value
        .ok_or_else(|| QuoteError::Malformed(format!("{symbol}: missing {name}")))?;
    Decimal::from_str(raw)
        .map_err(|_| QuoteError::Malformed(format!("{symbol}: non-numeric {name} {raw:?}")))
}

/// Raw quote response
#[derive(Debug, serde::Deserialize)]
struct TdQuoteResponse {
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
    price: Option<String>,
    close: Option<String>,
    volume: Option<String>,
    percent_change: Option<String>,
}

/// Raw time series response
#[derive(Debug, serde::Deserialize)]
struct TdSeriesResponse {
    status: Option<String>,
    code: Option<i64>,
    message: Option<String>,
    values: Option<Vec<TdCandle>>,
}

#[derive(Debug, serde::Deserialize)]
struct TdCandle {
    high: String,
    low: String,
    close: String,
}
