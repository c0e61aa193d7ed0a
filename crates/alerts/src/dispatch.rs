//! Dispatch policy: which events get sent, and recording the sends.

use crate::ledger::{LedgerEntry, LedgerError, SendLedger};
use crate::notifier::Notify;
use chrono::Utc;
use listing_core::ListingEvent;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Policy knobs for a dispatch pass.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Sends allowed per event code before it is suppressed for good.
    pub repeat_cap: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { repeat_cap: 3 }
    }
}

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Events included in this run's message and recorded in the ledger.
    pub sent: usize,
    /// Events skipped because their code reached the repeat cap.
    pub suppressed: usize,
    /// Whether the webhook accepted the message. Stays false when nothing
    /// was sent or the call failed.
    pub delivered: bool,
}

/// Runs the cap-check, batches one message, delivers it, records the sends.
pub struct Dispatcher<L, N> {
    ledger: L,
    notifier: N,
    config: DispatchConfig,
}

impl<L: SendLedger, N: Notify> Dispatcher<L, N> {
    pub fn new(ledger: L, notifier: N, config: DispatchConfig) -> Self {
        Self {
            ledger,
            notifier,
            config,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Process the run's watched events.
    ///
    /// Each event's send count is checked against the repeat cap, counting
    /// events queued earlier in this same pass, so a code repeated within
    /// one calendar day cannot blow past the cap. Everything under the cap
    /// goes out as a single batched message; the ledger records the sends
    /// whether or not delivery succeeded, so a flaky webhook cannot turn
    /// into unbounded repeats.
    pub async fn run(&mut self, events: &[ListingEvent]) -> Result<DispatchOutcome, LedgerError> {
        let mut outcome = DispatchOutcome::default();
        let mut message = String::new();
        let mut queued: Vec<LedgerEntry> = Vec::new();
        let mut queued_counts: HashMap<&str, usize> = HashMap::new();

        for event in events {
            let code = event.event_code.as_str();
            let in_run = queued_counts.get(code).copied().unwrap_or(0);
            let total_sent = self.ledger.count_sent(code) + in_run;
            if total_sent >= self.config.repeat_cap as usize {
                debug!(event = code, times = total_sent, "skipping event: repeat cap reached");
                outcome.suppressed += 1;
                continue;
            }

            message.push_str(&event.native_name);
            message.push('\n');
            message.push_str(&event.description);
            message.push_str("\n\n");

            queued.push(LedgerEntry::from_event(event, Utc::now().timestamp()));
            *queued_counts.entry(code).or_insert(0) += 1;
            outcome.sent += 1;
            debug!(event = code, "queued for notification");
        }

        if !message.is_empty() {
            match self.notifier.notify(&message).await {
                Ok(()) => {
                    outcome.delivered = true;
                    info!(events = outcome.sent, "notification sent");
                }
                Err(e) => {
                    error!(error = %e, "Failed to deliver notification");
                }
            }
            // Recorded even when delivery failed: repeats are capped by
            // queueing, not by webhook acks.
            self.ledger.append(&queued)?;
        }

        Ok(outcome)
    }
}
