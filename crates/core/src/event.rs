//! Listing announcement records as published by the upstream calendar.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Delimiter between the action part of an event code and the site that
/// announced it (e.g. `"newcoin-listing-on-binance"`).
pub const SITE_MARKER: &str = "on-";

/// One listing announcement.
///
/// Upstream records carry a varying set of fields depending on the event
/// kind; everything beyond the three we act on is kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEvent {
    /// Upstream identifier, unique per announcement. Doubles as the dedup
    /// key for the send history.
    #[serde(rename = "eventcode")]
    pub event_code: String,

    /// Display name of the listed token.
    #[serde(rename = "nativename")]
    pub native_name: String,

    /// Announcement text.
    #[serde(default)]
    pub description: String,

    /// Remaining upstream fields, untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ListingEvent {
    /// The site that announced this event: everything after the last
    /// `"on-"` in the event code. Codes without the marker yield the whole
    /// code, which normally matches no watch-list entry.
    pub fn site(&self) -> &str {
        match self.event_code.rsplit_once(SITE_MARKER) {
            Some((_, site)) => site,
            None => &self.event_code,
        }
    }
}

/// Calendar-day grouping of announcements, as the upstream pages them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Announcements under this day.
    #[serde(rename = "eventlist", default)]
    pub events: Vec<ListingEvent>,

    /// Remaining upstream fields (date labels and the like).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
