//! Paginated event source abstraction.

use crate::CalendarError;
use async_trait::async_trait;
use listing_core::DayBucket;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// One page of calendar results, as reported by the upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarPage {
    /// Pages available for the queried day.
    pub total_pages: u32,
    /// 1-based index of this page.
    pub page: u32,
    /// Day-buckets on this page.
    #[serde(rename = "list", default)]
    pub buckets: Vec<DayBucket>,
}

/// A paginated source of listing announcements for one UTC day.
///
/// The HTTP client implements this against the live calendar; tests drive
/// the pagination logic with scripted pages instead.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch a single 1-based page for the day starting at `timestamp`
    /// (UTC-midnight Unix seconds).
    async fn fetch_page(&self, timestamp: i64, page: u32) -> Result<CalendarPage, CalendarError>;
}

/// Fetch every page for the day, in page order.
///
/// Page 1 tells us how many pages exist; the remainder is walked
/// sequentially with `page_delay` between requests so the upstream is not
/// hammered. Any failing page fails the whole day.
pub async fn fetch_all_pages<S: EventSource + ?Sized>(
    source: &S,
    timestamp: i64,
    page_delay: Duration,
) -> Result<Vec<DayBucket>, CalendarError> {
    let first = source.fetch_page(timestamp, 1).await?;
    let total_pages = first.total_pages;
    let mut buckets = first.buckets;

    for page in first.page + 1..=total_pages {
        tokio::time::sleep(page_delay).await;
        let next = source.fetch_page(timestamp, page).await?;
        buckets.extend(next.buckets);
    }

    debug!(total_pages, buckets = buckets.len(), "calendar day fetched");
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_core::ListingEvent;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Test double that serves pre-built pages and records the order they
    /// were requested in.
    struct ScriptedSource {
        pages: Vec<CalendarPage>,
        fail_on: Option<u32>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<CalendarPage>) -> Self {
            Self {
                pages,
                fail_on: None,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(pages: Vec<CalendarPage>, fail_on: u32) -> Self {
            Self {
                fail_on: Some(fail_on),
                ..Self::new(pages)
            }
        }
    }

    #[async_trait]
    impl EventSource for ScriptedSource {
        async fn fetch_page(
            &self,
            _timestamp: i64,
            page: u32,
        ) -> Result<CalendarPage, CalendarError> {
            self.requested.lock().unwrap().push(page);
            if self.fail_on == Some(page) {
                return Err(CalendarError::Api {
                    page,
                    code: 500,
                    msg: "scripted failure".to_string(),
                });
            }
            Ok(self.pages[(page - 1) as usize].clone())
        }
    }

    fn bucket(tag: &str) -> DayBucket {
        DayBucket {
            events: vec![ListingEvent {
                event_code: format!("{tag}-on-test"),
                native_name: tag.to_string(),
                description: String::new(),
                extra: BTreeMap::new(),
            }],
            extra: BTreeMap::new(),
        }
    }

    fn page(index: u32, total: u32, buckets: usize) -> CalendarPage {
        CalendarPage {
            total_pages: total,
            page: index,
            buckets: (0..buckets).map(|i| bucket(&format!("p{index}e{i}"))).collect(),
        }
    }

    #[tokio::test]
    async fn test_single_page_day() {
        let source = ScriptedSource::new(vec![page(1, 1, 4)]);
        let buckets = fetch_all_pages(&source, 0, Duration::ZERO).await.unwrap();

        assert_eq!(buckets.len(), 4);
        assert_eq!(*source.requested.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_multi_page_day_concatenates_in_order() {
        let source = ScriptedSource::new(vec![page(1, 3, 100), page(2, 3, 100), page(3, 3, 37)]);
        let buckets = fetch_all_pages(&source, 0, Duration::ZERO).await.unwrap();

        assert_eq!(buckets.len(), 237);
        assert_eq!(buckets[0].events[0].event_code, "p1e0-on-test");
        assert_eq!(buckets[100].events[0].event_code, "p2e0-on-test");
        assert_eq!(buckets[236].events[0].event_code, "p3e36-on-test");
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_zero_total_pages_yields_empty_day() {
        let source = ScriptedSource::new(vec![page(1, 0, 0)]);
        let buckets = fetch_all_pages(&source, 0, Duration::ZERO).await.unwrap();

        assert!(buckets.is_empty());
        assert_eq!(*source.requested.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_failing_page_aborts_the_day() {
        let source = ScriptedSource::failing_on(vec![page(1, 3, 2), page(2, 3, 2), page(3, 3, 2)], 2);
        let err = fetch_all_pages(&source, 0, Duration::ZERO).await.unwrap_err();

        assert_eq!(err.page(), 2);
        // Page 3 is never requested once page 2 fails.
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_page_parses_upstream_shape() {
        let raw = r#"{
            "total_pages": 2,
            "page": 1,
            "list": [
                {"eventlist": [{"eventcode": "a-on-binance", "nativename": "A"}]}
            ]
        }"#;

        let parsed: CalendarPage = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.total_pages, 2);
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.buckets.len(), 1);
    }
}
