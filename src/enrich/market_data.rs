//! Market-data backed enrichment
//!
//! RSI and support/resistance come from TwelveData daily candles; fair value
//! comes from Finnhub fundamentals. All of it is pass-through arithmetic
//! over provider responses and degrades field by field.

use super::{Enricher, Enrichment};
use crate::quotes::TwelveDataClient;
use crate::universe::{FinancialMetrics, FinnhubClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Daily candles fetched per symbol; covers both the RSI lookback and the
/// support/resistance window
const SERIES_OUTPUTSIZE: usize = 20;
/// RSI lookback period
const RSI_PERIOD: usize = 14;
/// Minimum candles for a support/resistance estimate
const SR_MIN_BARS: usize = 10;

/// Enricher backed by the TwelveData and Finnhub clients
pub struct MarketDataEnricher {
    quotes: Arc<TwelveDataClient>,
    fundamentals: Arc<FinnhubClient>,
}

impl MarketDataEnricher {
    pub fn new(quotes: Arc<TwelveDataClient>, fundamentals: Arc<FinnhubClient>) -> Self {
        Self {
            quotes,
            fundamentals,
        }
    }
}

#[async_trait]
impl Enricher for MarketDataEnricher {
    async fn enrich(&self, symbol: &str, price: Decimal) -> Enrichment {
        let mut enrichment = Enrichment::default();

        match self.quotes.daily_series(symbol, SERIES_OUTPUTSIZE).await {
            Ok(candles) => {
                // candles arrive most recent first; RSI wants chronological
                let closes: Vec<Decimal> = candles.iter().rev().map(|c| c.close).collect();
                enrichment.rsi = rsi(&closes, RSI_PERIOD);

                let highs: Vec<Decimal> = candles.iter().map(|c| c.high).collect();
                let lows: Vec<Decimal> = candles.iter().map(|c| c.low).collect();
                if let Some((support, resistance)) = support_resistance(&highs, &lows) {
                    enrichment.support = Some(support);
                    enrichment.resistance = Some(resistance);
                }
            }
            Err(e) => {
                tracing::debug!(symbol, error = %e, "Daily series unavailable for enrichment");
            }
        }

        match self.fundamentals.stock_metrics(symbol).await {
            Ok(metrics) => {
                enrichment.fair_value = fair_value(&metrics, price);
            }
            Err(e) => {
                tracing::debug!(symbol, error = %e, "Fundamentals unavailable for enrichment");
            }
        }

        enrichment
    }
}

/// Relative strength index over chronological closes
///
/// Classic Wilder formulation over the first `period` deltas; returns None
/// with fewer than `period + 1` closes.
pub fn rsi(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut gains = Decimal::ZERO;
    let mut losses = Decimal::ZERO;
    for window in closes.windows(2).take(period) {
        let delta = window[1] - window[0];
        if delta > Decimal::ZERO {
            gains += delta;
        } else {
            losses -= delta;
        }
    }

    let divisor = Decimal::from(period as u64);
    let avg_gain = gains / divisor;
    let avg_loss = losses / divisor;

    if avg_loss.is_zero() {
        return Some(dec!(100));
    }

    let rs = avg_gain / avg_loss;
    Some((dec!(100) - dec!(100) / (Decimal::ONE + rs)).round_dp(2))
}

/// Support and resistance as the extremes of the recent daily range
pub fn support_resistance(highs: &[Decimal], lows: &[Decimal]) -> Option<(Decimal, Decimal)> {
    if highs.len() < SR_MIN_BARS || lows.len() < SR_MIN_BARS {
        return None;
    }
    let resistance = highs.iter().copied().max()?;
    let support = lows.iter().copied().min()?;
    Some((support.round_dp(2), resistance.round_dp(2)))
}

/// Fair value estimate from fundamentals
///
/// Prefers a cash-backed book estimate (cash per share less the debt-weighted
/// price, floored at 0.10); falls back to re-pricing earnings at a P/E of 15
/// when the reported P/E is plausible.
pub fn fair_value(metrics: &FinancialMetrics, price: Decimal) -> Option<Decimal> {
    if let (Some(cash), Some(shares)) = (metrics.cash_per_share, metrics.shares_outstanding) {
        if cash > Decimal::ZERO && shares > Decimal::ZERO {
            let debt_ratio = metrics.debt_to_capital.unwrap_or(Decimal::ZERO);
            let estimate = cash - price * debt_ratio;
            return Some(estimate.max(dec!(0.1)).round_dp(2));
        }
    }

    if let Some(pe) = metrics.pe_ratio {
        if pe > Decimal::ZERO && pe < dec!(50) {
            let earnings_per_share = price / pe;
            return Some((earnings_per_share * dec!(15)).round_dp(2));
        }
    }

    None
}
