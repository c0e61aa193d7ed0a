//! Exchange-listing calendar fetching.
//!
//! This crate talks to the upstream calendar REST API:
//!
//! - `client` - HTTP client with the request shape the upstream expects
//! - `source` - the `EventSource` seam and the page-walking driver
//! - `error` - fetch failures, always tagged with the failing page

pub mod client;
pub mod error;
pub mod source;

pub use client::{CalendarClient, CalendarConfig};
pub use error::CalendarError;
pub use source::{fetch_all_pages, CalendarPage, EventSource};
