//! Error types for calendar fetches.

use thiserror::Error;

/// Errors that can occur while fetching the listing calendar.
///
/// Every variant names the page it happened on; a failed page aborts the
/// whole day so callers never act on a partial fetch.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar request for page {page} failed: {source}")]
    Request {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("calendar page {page} returned HTTP {status}")]
    Status {
        page: u32,
        status: reqwest::StatusCode,
    },

    /// HTTP 200 but the envelope reported an application-level failure.
    #[error("calendar page {page} rejected by upstream (code {code}): {msg}")]
    Api { page: u32, code: i64, msg: String },

    #[error("calendar page {page} could not be parsed: {source}")]
    Parse {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

impl CalendarError {
    /// The page the failure happened on.
    pub fn page(&self) -> u32 {
        match self {
            CalendarError::Request { page, .. }
            | CalendarError::Status { page, .. }
            | CalendarError::Api { page, .. }
            | CalendarError::Parse { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_accessor() {
        let err = CalendarError::Api {
            page: 3,
            code: 10001,
            msg: "rate limited".to_string(),
        };
        assert_eq!(err.page(), 3);
    }

    #[test]
    fn test_api_error_message() {
        let err = CalendarError::Api {
            page: 1,
            code: 500,
            msg: "internal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "calendar page 1 rejected by upstream (code 500): internal"
        );
    }
}
