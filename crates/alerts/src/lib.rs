//! Webhook alert pipeline for watched listing events.
//!
//! This crate provides:
//! - CSV-based send history with an in-memory twin for tests
//! - repeat-capped dispatch over a run's watched events
//! - best-effort webhook delivery

pub mod dispatch;
pub mod ledger;
pub mod notifier;

pub use dispatch::{DispatchConfig, DispatchOutcome, Dispatcher};
pub use ledger::{CsvLedger, LedgerEntry, LedgerError, MemoryLedger, SendLedger};
pub use notifier::{Notify, NotifierConfig, NotifyError, WebhookNotifier};
