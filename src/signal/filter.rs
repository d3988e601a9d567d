//! Eligibility filtering
//!
//! Pure predicate that gates which symbols may enter the state machine.
//! Already-tracked symbols bypass it so a cycle can always close.

use crate::config::FilterConfig;
use crate::quotes::Quote;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of applying the eligibility filter to an observation
#[derive(Debug, Clone)]
pub enum FilterResult {
    /// Observation may enter the state machine
    Pass,
    /// Observation rejected
    Reject(RejectReason),
}

/// Reason an observation was rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RejectReason {
    /// Price above the configured ceiling
    PriceAboveCeiling(Decimal),
    /// Volume below the configured floor
    VolumeBelowFloor(Decimal),
    /// Symbol is on the configured denylist
    Denylisted,
}

/// Eligibility filter
///
/// Stateless: holds configuration only, remembers nothing between calls.
pub struct EligibilityFilter {
    config: FilterConfig,
}

impl EligibilityFilter {
    /// Create a new filter with the given configuration
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Apply the filter to an observation
    pub fn check(&self, quote: &Quote) -> FilterResult {
        if self.config.denylist.contains(&quote.symbol) {
            return FilterResult::Reject(RejectReason::Denylisted);
        }

        if quote.price > self.config.price_ceiling {
            return FilterResult::Reject(RejectReason::PriceAboveCeiling(quote.price));
        }

        if quote.volume < self.config.volume_floor {
            return FilterResult::Reject(RejectReason::VolumeBelowFloor(quote.volume));
        }

        FilterResult::Pass
    }

    /// Convenience boolean form of [`check`](Self::check)
    pub fn is_eligible(&self, quote: &Quote) -> bool {
        matches!(self.check(quote), FilterResult::Pass)
    }
}
