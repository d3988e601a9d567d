//! Symbol state store
//!
//! One entry per symbol currently under the machine's attention, plus a
//! last-seen volume table that backs the entry bar and cooldown override.
//! The store is owned exclusively by the state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Phase of a tracked symbol
///
/// UNTRACKED is represented by absence from the store; a state never exists
/// in an untracked phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Cycle opened; entry alert emitted
    Entered,
    /// Enhancement fired this cycle
    Enhanced,
    /// Exit warning fired this cycle; symbol may still recover
    ExitWarned,
}

/// Tracking state for one symbol, created at entry and deleted at final exit
#[derive(Debug, Clone)]
pub struct SymbolState {
    pub symbol: String,
    pub phase: Phase,
    /// Highest volume observed this cycle; never below `entry_volume`
    pub peak_volume: Decimal,
    pub entry_price: Decimal,
    pub entry_volume: Decimal,
    pub entry_time: DateTime<Utc>,
    /// Recent prices, oldest first, bounded by the configured capacity
    pub price_history: VecDeque<Decimal>,
    /// Recent volumes, oldest first, bounded by the configured capacity
    pub volume_history: VecDeque<Decimal>,
    /// Exit warning already fired this cycle
    pub warned: bool,
    /// Enhancement already fired this cycle
    pub enhanced: bool,
    capacity: usize,
}

impl SymbolState {
    /// Open a new cycle from the entry observation
    pub fn enter(
        symbol: &str,
        price: Decimal,
        volume: Decimal,
        entry_time: DateTime<Utc>,
        capacity: usize,
    ) -> Self {
        let mut state = Self {
            symbol: symbol.to_string(),
            phase: Phase::Entered,
            peak_volume: volume,
            entry_price: price,
            entry_volume: volume,
            entry_time,
            price_history: VecDeque::with_capacity(capacity),
            volume_history: VecDeque::with_capacity(capacity),
            warned: false,
            enhanced: false,
            capacity,
        };
        state.push_history(price, volume);
        state
    }

    /// Append an observation to the bounded history buffers
    pub fn push_history(&mut self, price: Decimal, volume: Decimal) {
        if self.capacity == 0 {
            return;
        }
        if self.price_history.len() == self.capacity {
            self.price_history.pop_front();
        }
        if self.volume_history.len() == self.capacity {
            self.volume_history.pop_front();
        }
        self.price_history.push_back(price);
        self.volume_history.push_back(volume);
    }
}

/// In-memory table of tracked symbols
#[derive(Debug, Default)]
pub struct SymbolStore {
    tracked: HashMap<String, SymbolState>,
    last_seen: HashMap<String, Decimal>,
}

impl SymbolStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolState> {
        self.tracked.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut SymbolState> {
        self.tracked.get_mut(symbol)
    }

    /// Insert a freshly entered state; at most one live entry per symbol
    pub fn put(&mut self, state: SymbolState) {
        self.tracked.insert(state.symbol.clone(), state);
    }

    /// Delete the state, ending the cycle; the symbol may re-enter later
    pub fn delete(&mut self, symbol: &str) -> Option<SymbolState> {
        self.tracked.remove(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.tracked.contains_key(symbol)
    }

    /// Number of symbols currently tracked
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Visit every tracked state
    pub fn for_each(&self, mut f: impl FnMut(&SymbolState)) {
        for state in self.tracked.values() {
            f(state);
        }
    }

    /// Record the most recent volume observed for a symbol, tracked or not
    pub fn record_seen(&mut self, symbol: &str, volume: Decimal) {
        self.last_seen.insert(symbol.to_string(), volume);
    }

    /// Most recent volume observed for a symbol, if any
    pub fn last_seen(&self, symbol: &str) -> Option<Decimal> {
        self.last_seen.get(symbol).copied()
    }
}
