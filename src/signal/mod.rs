//! Liquidity signal module
//!
//! The per-symbol state machine that turns a stream of quotes into staged
//! alerts, plus the collaborators it owns: the eligibility filter, the
//! symbol state store and the cooldown gate.

mod cooldown;
mod filter;
mod machine;
mod store;

pub use cooldown::CooldownGate;
pub use filter::{EligibilityFilter, FilterResult, RejectReason};
pub use machine::SignalMachine;
pub use store::{Phase, SymbolState, SymbolStore};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stage of an alert within a tracking cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Volume surge admitted the symbol into tracking
    Entry,
    /// Volume pushed past the enhancement multiple of the cycle peak
    Enhancement,
    /// Volume fell to the warning band below the cycle peak
    ExitWarning,
    /// Volume collapsed below the final threshold; tracking ends
    ExitFinal,
}

impl AlertKind {
    /// Stable label used in the audit trail and metric dimensions
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Entry => "entry",
            AlertKind::Enhancement => "enhancement",
            AlertKind::ExitWarning => "exit_warning",
            AlertKind::ExitFinal => "exit_final",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A staged alert decided by the state machine
///
/// A decided alert counts as delivered for state-machine purposes even if
/// dispatch later fails; nothing downstream feeds back into the machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier
    pub id: Uuid,
    /// Alert stage
    pub kind: AlertKind,
    /// Symbol the alert is about
    pub symbol: String,
    /// Price at decision time
    pub price: Decimal,
    /// Volume at decision time
    pub volume: Decimal,
    /// Percent change at decision time
    pub percent_change: Decimal,
    /// Cycle peak volume after this observation was applied
    pub peak_volume: Decimal,
    /// Entry price of the cycle this alert belongs to
    pub entry_price: Option<Decimal>,
    /// Decision timestamp
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_kind_labels() {
        assert_eq!(AlertKind::Entry.as_str(), "entry");
        assert_eq!(AlertKind::Enhancement.as_str(), "enhancement");
        assert_eq!(AlertKind::ExitWarning.as_str(), "exit_warning");
        assert_eq!(AlertKind::ExitFinal.as_str(), "exit_final");
    }

    #[test]
    fn test_alert_kind_display_matches_label() {
        assert_eq!(AlertKind::ExitFinal.to_string(), "exit_final");
    }

    #[test]
    fn test_alert_kind_serde_snake_case() {
        let json = serde_json::to_string(&AlertKind::ExitWarning).unwrap();
        assert_eq!(json, r#""exit_warning""#);
    }
}
