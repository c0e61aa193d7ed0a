//! Scan-date selection for calendar queries.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a scan-date override.
#[derive(Debug, Error)]
#[error("invalid scan date {value:?}: expected YYYY-MM-DD")]
pub struct DateParseError {
    value: String,
    #[source]
    source: chrono::ParseError,
}

/// Which UTC day a run scans.
///
/// The calendar keys its pages off UTC-midnight timestamps, so `Today`
/// resolves against the UTC clock, not local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckDate {
    /// The current UTC day, resolved when the timestamp is taken.
    #[default]
    Today,
    /// A fixed day, useful for re-running a past scan.
    Fixed(NaiveDate),
}

impl CheckDate {
    /// Parse an override. The empty string means today.
    pub fn parse(value: &str) -> Result<Self, DateParseError> {
        if value.is_empty() {
            return Ok(CheckDate::Today);
        }
        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| DateParseError {
            value: value.to_string(),
            source,
        })?;
        Ok(CheckDate::Fixed(date))
    }

    /// UTC-midnight Unix timestamp for the scanned day, the form the
    /// upstream calendar keys its pages on.
    pub fn midnight_timestamp(&self) -> i64 {
        let date = match self {
            CheckDate::Today => Utc::now().date_naive(),
            CheckDate::Fixed(date) => *date,
        };
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).timestamp()
    }
}

impl FromStr for CheckDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckDate::parse(s)
    }
}

impl fmt::Display for CheckDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckDate::Today => write!(f, "today"),
            CheckDate::Fixed(date) => write!(f, "{date}"),
        }
    }
}
