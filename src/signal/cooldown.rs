//! Cooldown gate
//!
//! Per (symbol, alert-kind) rate limiter guarding alert emission. The gate
//! throttles notification frequency only; it never influences state
//! transitions.

use super::AlertKind;
use crate::config::CooldownConfig;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Rate limiter keyed by (symbol, alert kind)
pub struct CooldownGate {
    window: Duration,
    jump_factor: Decimal,
    drop_factor: Decimal,
    last_sent: HashMap<(String, AlertKind), DateTime<Utc>>,
}

impl CooldownGate {
    /// Create a gate from configuration
    pub fn new(config: &CooldownConfig) -> Self {
        Self {
            window: Duration::minutes(config.window_minutes as i64),
            jump_factor: config.jump_factor,
            drop_factor: config.drop_factor,
            last_sent: HashMap::new(),
        }
    }

    /// Decide whether an alert may be dispatched now
    ///
    /// `swing` is the volume ratio versus the symbol's previous observation.
    /// A swing at or beyond the jump/drop factor bypasses the window; every
    /// allow, bypass included, refreshes the timestamp.
    pub fn allow(
        &mut self,
        symbol: &str,
        kind: AlertKind,
        now: DateTime<Utc>,
        swing: Option<Decimal>,
    ) -> bool {
        let key = (symbol.to_string(), kind);

        if let Some(last) = self.last_sent.get(&key) {
            if now - *last < self.window && !self.swing_overrides(swing) {
                return false;
            }
        }

        self.last_sent.insert(key, now);
        true
    }

    fn swing_overrides(&self, swing: Option<Decimal>) -> bool {
        match swing {
            Some(ratio) => ratio >= self.jump_factor || ratio <= self.drop_factor,
            None => false,
        }
    }

    /// Number of (symbol, kind) pairs with a recorded send
    pub fn len(&self) -> usize {
        self.last_sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_empty()
    }
}
