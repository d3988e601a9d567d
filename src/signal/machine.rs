//! Signal state machine
//!
//! Consumes one fresh observation plus the current tracking state and
//! produces at most one alert decision and the next state. Exit conditions
//! are evaluated before enhancement so a collapsing symbol is never
//! simultaneously reported as strengthening.
//!
//! All intra-cycle ratios are computed against the cycle's peak volume; only
//! the entry decision compares against the symbol's previously seen volume.

use super::store::{Phase, SymbolState, SymbolStore};
use super::{Alert, AlertKind};
use crate::config::SignalConfig;
use crate::quotes::Quote;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The per-symbol liquidity signal state machine
///
/// Owns the symbol state store; no other component mutates it.
pub struct SignalMachine {
    config: SignalConfig,
    volume_floor: Decimal,
    store: SymbolStore,
}

impl SignalMachine {
    /// Create a machine with the given thresholds
    ///
    /// `volume_floor` is the eligibility floor; entry requires twice it.
    pub fn new(config: SignalConfig, volume_floor: Decimal) -> Self {
        Self {
            config,
            volume_floor,
            store: SymbolStore::new(),
        }
    }

    /// Feed one observation through the machine
    ///
    /// `eligible` is the eligibility filter's verdict for this observation;
    /// it gates entry only. Tracked symbols keep being evaluated so a cycle
    /// can always reach its final exit.
    pub fn observe(&mut self, quote: &Quote, eligible: bool, now: DateTime<Utc>) -> Option<Alert> {
        // Defensive: bad provider data never mutates state.
        if quote.price <= Decimal::ZERO || quote.volume < Decimal::ZERO {
            tracing::debug!(
                symbol = %quote.symbol,
                price = %quote.price,
                volume = %quote.volume,
                "Skipping observation with invalid fields"
            );
            return None;
        }

        let decision = if self.store.contains(&quote.symbol) {
            self.observe_tracked(quote, now)
        } else if eligible {
            self.try_enter(quote, now)
        } else {
            None
        };

        if matches!(decision.as_ref().map(|a| a.kind), Some(AlertKind::ExitFinal)) {
            // The cycle is over; the symbol re-enters from scratch, so its
            // seen-volume memory goes too.
            return decision;
        }

        self.store.record_seen(&quote.symbol, quote.volume);
        decision
    }

    /// Entry evaluation for an untracked, eligible symbol
    fn try_enter(&mut self, quote: &Quote, now: DateTime<Utc>) -> Option<Alert> {
        if quote.volume < self.volume_floor * Decimal::TWO {
            return None;
        }

        // Relative-history bar: volume must have multiplied versus the last
        // sighting. A symbol never seen before clears the bar outright.
        if let Some(prev) = self.store.last_seen(&quote.symbol) {
            if prev > Decimal::ZERO
                && quote.volume / prev < self.config.entry_volume_multiple
            {
                return None;
            }
        }

        let state = SymbolState::enter(
            &quote.symbol,
            quote.price,
            quote.volume,
            now,
            self.config.history_capacity,
        );
        let alert = alert_from_state(AlertKind::Entry, quote, &state, now);
        self.store.put(state);

        tracing::info!(symbol = %quote.symbol, volume = %quote.volume, "Liquidity entry");
        Some(alert)
    }

    /// Transition evaluation for a tracked symbol, exit conditions first
    fn observe_tracked(&mut self, quote: &Quote, now: DateTime<Utc>) -> Option<Alert> {
        let price_confirmation = self.config.price_confirmation;
        let confirmation_pct = self.config.price_confirmation_pct;
        let enhancement_multiple = self.config.enhancement_multiple;
        let exit_warning = self.config.exit_warning_threshold;
        let exit_final = self.config.exit_final_threshold;

        let state = self.store.get_mut(&quote.symbol)?;
        state.push_history(quote.price, quote.volume);

        if state.peak_volume <= Decimal::ZERO {
            // Insufficient data for any ratio; self-heal the peak and wait
            // for the next observation.
            state.peak_volume = state.entry_volume.max(quote.volume);
            tracing::debug!(symbol = %quote.symbol, "Peak volume unset, self-healing");
            return None;
        }

        let ratio = quote.volume / state.peak_volume;

        if ratio <= exit_final {
            let state = self
                .store
                .delete(&quote.symbol)
                .expect("tracked state disappeared");
            tracing::info!(symbol = %quote.symbol, %ratio, "Liquidity final exit");
            return Some(alert_from_state(AlertKind::ExitFinal, quote, &state, now));
        }

        if ratio <= exit_warning {
            if state.warned {
                return None;
            }
            state.warned = true;
            state.phase = Phase::ExitWarned;
            let alert = alert_from_state(AlertKind::ExitWarning, quote, state, now);
            tracing::info!(symbol = %quote.symbol, %ratio, "Liquidity exit warning");
            return Some(alert);
        }

        let confirmed = !price_confirmation
            || quote.price >= state.entry_price * (Decimal::ONE + confirmation_pct);
        if state.phase == Phase::Entered
            && !state.enhanced
            && quote.volume >= state.peak_volume * enhancement_multiple
            && confirmed
        {
            state.phase = Phase::Enhanced;
            state.enhanced = true;
            state.peak_volume = quote.volume;
            let alert = alert_from_state(AlertKind::Enhancement, quote, state, now);
            tracing::info!(symbol = %quote.symbol, volume = %quote.volume, "Liquidity enhancement");
            return Some(alert);
        }

        if quote.volume > state.peak_volume {
            state.peak_volume = quote.volume;
        }

        None
    }

    /// Read access to the state store
    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    /// Volume last seen for a symbol, used for the cooldown override swing
    pub fn last_seen(&self, symbol: &str) -> Option<Decimal> {
        self.store.last_seen(symbol)
    }

    /// Number of symbols currently tracked
    pub fn tracked_count(&self) -> usize {
        self.store.len()
    }
}

fn alert_from_state(
    kind: AlertKind,
    quote: &Quote,
    state: &SymbolState,
    now: DateTime<Utc>,
) -> Alert {
    Alert {
        id: Uuid::new_v4(),
        kind,
        symbol: quote.symbol.clone(),
        price: quote.price,
        volume: quote.volume,
        percent_change: quote.percent_change,
        peak_volume: state.peak_volume,
        entry_price: Some(state.entry_price),
        timestamp: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn machine() -> SignalMachine {
        SignalMachine::new(SignalConfig::default(), dec!(50000))
    }

    fn quote(symbol: &str, price: Decimal, volume: Decimal) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            volume,
            percent_change: dec!(1.0),
        }
    }

    fn obs(machine: &mut SignalMachine, volume: Decimal) -> Option<Alert> {
        let q = quote("X", dec!(3.00), volume);
        machine.observe(&q, true, Utc::now())
    }

    #[test]
    fn test_scenario_a_ineligible_then_first_sighting_entry() {
        let mut m = machine();

        // Obs1: below floor, ineligible, no state created
        let a1 = m.observe(&quote("X", dec!(3.00), dec!(40000)), false, Utc::now());
        assert!(a1.is_none());
        assert!(!m.store().contains("X"));

        // Obs2: first sighting at 120,000 -> ENTERED
        let a2 = obs(&mut m, dec!(120000)).expect("entry alert");
        assert_eq!(a2.kind, AlertKind::Entry);
        assert_eq!(a2.peak_volume, dec!(120000));
        let state = m.store().get("X").unwrap();
        assert_eq!(state.phase, Phase::Entered);
        assert_eq!(state.peak_volume, dec!(120000));
        assert_eq!(state.entry_volume, dec!(120000));
    }

    #[test]
    fn test_scenario_b_enhancement_fires_once() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");

        // 150,001 >= 120,000 * 1.25
        let a = obs(&mut m, dec!(150001)).expect("enhancement alert");
        assert_eq!(a.kind, AlertKind::Enhancement);
        assert_eq!(m.store().get("X").unwrap().peak_volume, dec!(150001));
        assert_eq!(m.store().get("X").unwrap().phase, Phase::Enhanced);

        // 190,000 >= 150,001 * 1.25 but enhancement already fired this cycle
        let a2 = obs(&mut m, dec!(190000));
        assert!(a2.is_none());
        // peak still tracks the new high silently
        assert_eq!(m.store().get("X").unwrap().peak_volume, dec!(190000));
    }

    #[test]
    fn test_scenario_c_warning_at_exact_boundary() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");
        obs(&mut m, dec!(150000)).expect("enhancement");

        // ratio exactly 0.85 (inclusive boundary)
        let a = obs(&mut m, dec!(127500)).expect("warning alert");
        assert_eq!(a.kind, AlertKind::ExitWarning);
        let state = m.store().get("X").unwrap();
        assert_eq!(state.phase, Phase::ExitWarned);
        assert!(state.warned);

        // same band again: already warned this cycle, no duplicate
        assert!(obs(&mut m, dec!(127000)).is_none());
    }

    #[test]
    fn test_scenario_d_final_exit_deletes_and_reentry_is_fresh() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");
        obs(&mut m, dec!(150000)).expect("enhancement");
        obs(&mut m, dec!(127500)).expect("warning");

        // ratio exactly 0.75 (inclusive boundary) -> final exit
        let a = obs(&mut m, dec!(112500)).expect("final exit alert");
        assert_eq!(a.kind, AlertKind::ExitFinal);
        assert!(!m.store().contains("X"));

        // a later surge is a brand-new entry cycle
        let a2 = obs(&mut m, dec!(200000)).expect("fresh entry");
        assert_eq!(a2.kind, AlertKind::Entry);
        assert_eq!(m.store().get("X").unwrap().entry_volume, dec!(200000));
    }

    #[test]
    fn test_entry_requires_double_floor() {
        let mut m = machine();
        // eligible (>= 50,000) but below 2x floor
        assert!(obs(&mut m, dec!(99999)).is_none());
        assert!(!m.store().contains("X"));

        assert!(obs(&mut m, dec!(200000)).is_some());
    }

    #[test]
    fn test_entry_requires_volume_multiple_when_previously_seen() {
        let mut m = machine();

        // seen once below the entry bar
        assert!(obs(&mut m, dec!(99000)).is_none());

        // 150,000 / 99,000 < 2.0: still no entry despite clearing 2x floor
        assert!(obs(&mut m, dec!(150000)).is_none());

        // 300,000 / 150,000 >= 2.0: entry
        let a = obs(&mut m, dec!(300000)).expect("entry");
        assert_eq!(a.kind, AlertKind::Entry);
    }

    #[test]
    fn test_idempotent_observation_is_noop() {
        let mut m = machine();
        let q = quote("X", dec!(3.00), dec!(120000));
        let now = Utc::now();

        let first = m.observe(&q, true, now);
        assert_eq!(first.unwrap().kind, AlertKind::Entry);

        // identical observation immediately after: no second entry, no exit
        let second = m.observe(&q, true, now);
        assert!(second.is_none());
        assert_eq!(m.store().get("X").unwrap().phase, Phase::Entered);
    }

    #[test]
    fn test_exit_takes_precedence_over_strengthening() {
        let mut m = machine();
        obs(&mut m, dec!(1000000)).expect("entry");

        // stale peak: volume has doubled versus the last recorded tick, yet
        // sits far below the cycle peak; the exit path must win
        m.store.record_seen("X", dec!(100000));
        let a = obs(&mut m, dec!(200000)).expect("exit");
        assert_eq!(a.kind, AlertKind::ExitFinal);
        assert!(!m.store().contains("X"));
    }

    #[test]
    fn test_direct_entered_to_final_exit() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");

        // no intermediate warning required when volume craters sharply
        let a = obs(&mut m, dec!(30000)).expect("final exit");
        assert_eq!(a.kind, AlertKind::ExitFinal);
        assert!(!m.store().contains("X"));
    }

    #[test]
    fn test_warning_then_recovery_then_final_exit() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");

        let warn = obs(&mut m, dec!(100000)).expect("warning"); // ratio 0.833
        assert_eq!(warn.kind, AlertKind::ExitWarning);

        // recovery above the warning band: silent peak update only
        assert!(obs(&mut m, dec!(130000)).is_none());
        assert_eq!(m.store().get("X").unwrap().peak_volume, dec!(130000));

        let exit = obs(&mut m, dec!(97500)).expect("final exit"); // 0.75 of 130k
        assert_eq!(exit.kind, AlertKind::ExitFinal);
    }

    #[test]
    fn test_enhancement_not_available_after_warning() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");
        obs(&mut m, dec!(100000)).expect("warning");

        // surge past the enhancement multiple of the (unchanged) peak: phase
        // is ExitWarned, not Entered, so only the peak moves
        assert!(obs(&mut m, dec!(160000)).is_none());
        let state = m.store().get("X").unwrap();
        assert_eq!(state.phase, Phase::ExitWarned);
        assert_eq!(state.peak_volume, dec!(160000));
    }

    #[test]
    fn test_peak_never_below_entry_volume() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");
        obs(&mut m, dec!(110000)); // in-band, no transition
        obs(&mut m, dec!(115000));

        let state = m.store().get("X").unwrap();
        assert!(state.peak_volume >= state.entry_volume);
        assert_eq!(state.peak_volume, dec!(120000));
    }

    #[test]
    fn test_tracked_symbol_exits_even_when_ineligible() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");

        // price ran above the ceiling so the filter now rejects it, but the
        // open cycle still closes
        let q = quote("X", dec!(12.00), dec!(50000));
        let a = m.observe(&q, false, Utc::now()).expect("final exit");
        assert_eq!(a.kind, AlertKind::ExitFinal);
    }

    #[test]
    fn test_untracked_ineligible_observation_ignored() {
        let mut m = machine();
        let q = quote("X", dec!(12.00), dec!(500000));
        assert!(m.observe(&q, false, Utc::now()).is_none());
        assert!(!m.store().contains("X"));
    }

    #[test]
    fn test_invalid_observation_skipped_without_mutation() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");

        let bad_price = quote("X", dec!(0), dec!(30000));
        assert!(m.observe(&bad_price, true, Utc::now()).is_none());

        let bad_volume = quote("X", dec!(3.00), dec!(-1));
        assert!(m.observe(&bad_volume, true, Utc::now()).is_none());

        // state untouched by either
        let state = m.store().get("X").unwrap();
        assert_eq!(state.peak_volume, dec!(120000));
        assert_eq!(state.phase, Phase::Entered);
    }

    #[test]
    fn test_zero_peak_self_heals_without_ratio_transitions() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");

        // force the guard path
        m.store.get_mut("X").unwrap().peak_volume = Decimal::ZERO;

        let a = obs(&mut m, dec!(30000));
        assert!(a.is_none(), "no ratio transition with unset peak");
        let state = m.store().get("X").unwrap();
        assert_eq!(state.peak_volume, dec!(120000)); // healed from entry volume
        assert!(m.store().contains("X"));
    }

    #[test]
    fn test_price_confirmation_gates_enhancement() {
        let config = SignalConfig {
            price_confirmation: true,
            ..SignalConfig::default()
        };
        let mut m = SignalMachine::new(config, dec!(50000));
        let now = Utc::now();

        m.observe(&quote("X", dec!(3.00), dec!(120000)), true, now)
            .expect("entry");

        // volume clears the enhancement bar but price has not confirmed
        let flat = quote("X", dec!(3.02), dec!(160000));
        assert!(m.observe(&flat, true, now).is_none());
        // unconfirmed surge still advances the peak
        assert_eq!(m.store().get("X").unwrap().peak_volume, dec!(160000));

        // price >= entry * 1.02 and volume clears the bar against the peak
        let confirmed = quote("X", dec!(3.06), dec!(200000));
        let a = m.observe(&confirmed, true, now).expect("enhancement");
        assert_eq!(a.kind, AlertKind::Enhancement);
    }

    #[test]
    fn test_history_follows_observations() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");
        obs(&mut m, dec!(125000));
        obs(&mut m, dec!(118000));

        let state = m.store().get("X").unwrap();
        assert_eq!(state.volume_history.len(), 3);
        assert_eq!(state.volume_history.back(), Some(&dec!(118000)));
    }

    #[test]
    fn test_alert_carries_entry_snapshot() {
        let mut m = machine();
        obs(&mut m, dec!(120000)).expect("entry");
        let a = obs(&mut m, dec!(30000)).expect("final exit");
        assert_eq!(a.entry_price, Some(dec!(3.00)));
        assert_eq!(a.peak_volume, dec!(120000));
    }

    #[test]
    fn test_symbols_are_independent_cycles() {
        let mut m = machine();
        let now = Utc::now();

        m.observe(&quote("X", dec!(3.00), dec!(120000)), true, now)
            .expect("entry X");
        m.observe(&quote("Y", dec!(2.00), dec!(500000)), true, now)
            .expect("entry Y");

        // X collapses, Y unaffected
        let a = m.observe(&quote("X", dec!(3.00), dec!(30000)), true, now);
        assert_eq!(a.unwrap().kind, AlertKind::ExitFinal);
        assert!(m.store().contains("Y"));
        assert_eq!(m.tracked_count(), 1);
    }
}
