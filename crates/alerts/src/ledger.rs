//! Durable send history.
//!
//! Every notified event leaves one row behind; the per-code row count is
//! what the dispatch policy caps on. Rows are only ever appended.

use listing_core::ListingEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A present-but-unreadable store is fatal. Treating it as empty would
    /// restart every event's count and re-send without bound.
    #[error("ledger at {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("ledger write failed: {0}")]
    Write(#[source] csv::Error),
}

/// One send attempt, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Upstream event identifier; the dedup key.
    pub event_code: String,
    pub native_name: String,
    pub description: String,
    /// Remaining upstream fields, re-encoded as one JSON object so the row
    /// shape stays fixed.
    pub extra: String,
    /// When the send was queued (Unix seconds, UTC).
    pub sent_at: i64,
}

impl LedgerEntry {
    /// Snapshot an event at send time.
    pub fn from_event(event: &ListingEvent, sent_at: i64) -> Self {
        let extra = serde_json::to_string(&event.extra).unwrap_or_default();
        Self {
            event_code: event.event_code.clone(),
            native_name: event.native_name.clone(),
            description: event.description.clone(),
            extra,
            sent_at,
        }
    }
}

/// Append-only history of sent events.
///
/// Single-writer by design: the watcher runs as one periodic process, so
/// appends need no cross-process locking.
pub trait SendLedger {
    /// How many rows are recorded for `event_code`.
    fn count_sent(&self, event_code: &str) -> usize;

    /// Append rows for this run's sends.
    fn append(&mut self, entries: &[LedgerEntry]) -> Result<(), LedgerError>;
}

/// CSV-backed ledger: a header row on first creation, data rows appended
/// thereafter.
///
/// The whole file is read once at open to warm the per-code counts; appends
/// keep them current, so `count_sent` never re-reads the file.
#[derive(Debug)]
pub struct CsvLedger {
    path: PathBuf,
    counts: HashMap<String, usize>,
}

impl CsvLedger {
    /// Open the ledger at `path`, creating parent directories as needed.
    /// A missing file is an empty ledger; an unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut counts = HashMap::new();
        if path.exists() {
            let mut reader = csv::Reader::from_path(&path).map_err(|source| {
                LedgerError::Malformed {
                    path: path.clone(),
                    source,
                }
            })?;
            for row in reader.deserialize::<LedgerEntry>() {
                let entry = row.map_err(|source| LedgerError::Malformed {
                    path: path.clone(),
                    source,
                })?;
                *counts.entry(entry.event_code).or_insert(0) += 1;
            }
        }

        Ok(Self { path, counts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows recorded across all codes.
    pub fn total_rows(&self) -> usize {
        self.counts.values().sum()
    }
}

impl SendLedger for CsvLedger {
    fn count_sent(&self, event_code: &str) -> usize {
        self.counts.get(event_code).copied().unwrap_or(0)
    }

    fn append(&mut self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        if entries.is_empty() {
            return Ok(());
        }

        // A zero-length file gets the header too, not just a brand-new one.
        let fresh = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(fresh)
            .from_writer(file);
        for entry in entries {
            writer.serialize(entry).map_err(LedgerError::Write)?;
        }
        writer.flush()?;

        for entry in entries {
            *self.counts.entry(entry.event_code.clone()).or_insert(0) += 1;
        }
        Ok(())
    }
}

/// In-memory ledger for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows appended so far, in order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

impl SendLedger for MemoryLedger {
    fn count_sent(&self, event_code: &str) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.event_code == event_code)
            .count()
    }

    fn append(&mut self, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
        self.entries.extend_from_slice(entries);
        Ok(())
    }
}
