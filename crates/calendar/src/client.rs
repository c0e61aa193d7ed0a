//! HTTP client for the upstream listing calendar.

use crate::{fetch_all_pages, CalendarError, CalendarPage, EventSource};
use async_trait::async_trait;
use listing_core::{CheckDate, DayBucket};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Application-level success sentinel in the calendar envelope. The
/// upstream reports failures inside an HTTP 200 body.
const API_SUCCESS: i64 = 200;

/// The upstream rejects non-browser clients, so requests present a desktop
/// browser identity.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

const SITE_URL: &str = "https://www.coincarp.com";

/// Configuration for the calendar client.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Calendar endpoint.
    pub base_url: String,
    /// Language tag passed through to the upstream.
    pub lang: String,
    /// Events per page; the upstream caps this at 100.
    pub page_size: u32,
    /// Pause between page requests.
    pub page_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sapi.coincarp.com/api/v1/news/calendar/index".to_string(),
            lang: "zh-CN".to_string(),
            page_size: 100,
            page_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Response envelope wrapping every calendar payload.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<CalendarPage>,
}

/// Client for the paginated exchange-listing calendar.
pub struct CalendarClient {
    client: reqwest::Client,
    config: CalendarConfig,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}

impl CalendarClient {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.timeout)
                .default_headers(browser_headers())
                .build()
                .expect("Failed to create HTTP client"),
            config,
        }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Fetch the full calendar for `date`, walking every page.
    pub async fn fetch_day(&self, date: CheckDate) -> Result<Vec<DayBucket>, CalendarError> {
        fetch_all_pages(self, date.midnight_timestamp(), self.config.page_delay).await
    }
}

#[async_trait]
impl EventSource for CalendarClient {
    async fn fetch_page(&self, timestamp: i64, page: u32) -> Result<CalendarPage, CalendarError> {
        let timestamp_param = timestamp.to_string();
        let page_param = page.to_string();
        let pagesize_param = self.config.page_size.to_string();

        debug!(page, timestamp, "requesting calendar page");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("tagcode", "exchange"),
                ("timestamp", timestamp_param.as_str()),
                ("page", page_param.as_str()),
                ("pagesize", pagesize_param.as_str()),
                ("lang", self.config.lang.as_str()),
                ("type", ""),
            ])
            .send()
            .await
            .map_err(|source| CalendarError::Request { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status { page, status });
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|source| CalendarError::Parse { page, source })?;

        if envelope.code != API_SUCCESS {
            return Err(CalendarError::Api {
                page,
                code: envelope.code,
                msg: envelope.msg,
            });
        }

        envelope.data.ok_or_else(|| CalendarError::Api {
            page,
            code: API_SUCCESS,
            msg: "success response carried no data".to_string(),
        })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(REFERER, HeaderValue::from_static("https://www.coincarp.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static(SITE_URL));
    headers.insert("Sec-Ch-Ua-Platform", HeaderValue::from_static("\"Windows\""));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = CalendarConfig::default();
        assert_eq!(config.page_size, 100);
        assert_eq!(config.page_delay, Duration::from_millis(500));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn test_envelope_success() {
        let raw = r#"{
            "code": 200,
            "msg": "success",
            "data": {
                "total_pages": 1,
                "page": 1,
                "list": [{"eventlist": [{"eventcode": "x-on-okx", "nativename": "X"}]}]
            }
        }"#;

        let envelope: ApiEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.code, 200);
        let data = envelope.data.unwrap();
        assert_eq!(data.buckets.len(), 1);
    }

    #[test]
    fn test_envelope_failure_has_no_data() {
        let raw = r#"{"code": 10001, "msg": "too many requests"}"#;
        let envelope: ApiEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.code, 10001);
        assert_eq!(envelope.msg, "too many requests");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_browser_headers_present() {
        let headers = browser_headers();
        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(REFERER));
        assert!(headers.contains_key(ORIGIN));
        assert!(headers.contains_key("Sec-Ch-Ua-Platform"));
    }
}
