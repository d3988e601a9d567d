//! Per-symbol processing pipeline
//!
//! Quote fetch, eligibility, state machine, cooldown gate, enrichment,
//! dispatch, audit. Dispatch and audit failures are logged and never roll
//! back the transition that already happened.

use crate::audit::{AuditLogger, AuditRecord};
use crate::enrich::Enricher;
use crate::notify::{render_alert, ChannelRouter, Notifier};
use crate::quotes::{QuoteError, QuoteSource};
use crate::signal::{
    Alert, CooldownGate, EligibilityFilter, FilterResult, SignalMachine,
};
use crate::telemetry;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Glue between the quote source and the alert sinks, owning the mutable
/// core (machine and cooldown gate) so per-symbol access stays serialized
pub struct SignalEngine {
    filter: EligibilityFilter,
    machine: SignalMachine,
    cooldown: CooldownGate,
    quotes: Arc<dyn QuoteSource>,
    enricher: Arc<dyn Enricher>,
    notifier: Arc<dyn Notifier>,
    router: ChannelRouter,
    audit: AuditLogger,
}

impl SignalEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filter: EligibilityFilter,
        machine: SignalMachine,
        cooldown: CooldownGate,
        quotes: Arc<dyn QuoteSource>,
        enricher: Arc<dyn Enricher>,
        notifier: Arc<dyn Notifier>,
        router: ChannelRouter,
        audit: AuditLogger,
    ) -> Self {
        Self {
            filter,
            machine,
            cooldown,
            quotes,
            enricher,
            notifier,
            router,
            audit,
        }
    }

    /// Process one symbol within a sweep
    ///
    /// Returns the dispatched alert, if the observation produced one that
    /// cleared the cooldown gate. Quote errors bubble up so the scheduler
    /// can count and skip.
    pub async fn process_symbol(&mut self, symbol: &str) -> Result<Option<Alert>, QuoteError> {
        let quote = self.quotes.get_quote(symbol).await?;

        let eligible = match self.filter.check(&quote) {
            FilterResult::Pass => true,
            FilterResult::Reject(reason) => {
                tracing::trace!(symbol, ?reason, "Observation ineligible for entry");
                false
            }
        };

        // Snapshot the previous volume before the machine overwrites it;
        // the cooldown override compares against it.
        let prior_volume = self.machine.last_seen(symbol);

        let now = Utc::now();
        let Some(alert) = self.machine.observe(&quote, eligible, now) else {
            return Ok(None);
        };

        let swing = prior_volume.and_then(|prev| {
            (prev > Decimal::ZERO).then(|| quote.volume / prev)
        });

        if !self.cooldown.allow(&alert.symbol, alert.kind, now, swing) {
            tracing::debug!(
                symbol,
                kind = %alert.kind,
                "Alert suppressed by cooldown window"
            );
            return Ok(None);
        }

        let enrichment = self.enricher.enrich(symbol, quote.price).await;
        let text = render_alert(&alert, &enrichment);
        let channel = self.router.channel_for(alert.kind);

        // Failures past this point are logged, never retried mid-sweep, and
        // never undo the transition.
        if let Err(e) = self.notifier.send(channel, &text).await {
            tracing::error!(symbol, channel, error = %e, "Alert dispatch failed");
        } else {
            telemetry::incr_alert(alert.kind.as_str());
        }

        let record = AuditRecord::from_alert(&alert, &enrichment);
        if let Err(e) = self.audit.record(record).await {
            tracing::error!(symbol, error = %e, "Audit append failed");
        }

        Ok(Some(alert))
    }

    /// Number of symbols currently tracked by the machine
    pub fn tracked_count(&self) -> usize {
        self.machine.tracked_count()
    }
}
