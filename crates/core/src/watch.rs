//! Watch-list of exchange sites and event filtering.

use crate::{DayBucket, ListingEvent};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Exchange sites whose announcements are worth alerting on.
///
/// Matching is exact and case-sensitive against the site segment of the
/// event code. An empty watch-list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchList {
    sites: HashSet<CompactString>,
}

impl WatchList {
    pub fn new<I, S>(sites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sites: sites
                .into_iter()
                .map(|site| CompactString::new(site.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, site: &str) -> bool {
        self.sites.contains(site)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Flatten day-buckets into the announcements whose site is watched.
    ///
    /// Bucket order and the order of events inside each bucket are
    /// preserved, so the output follows the upstream calendar ordering.
    pub fn filter_events(&self, buckets: &[DayBucket]) -> Vec<ListingEvent> {
        buckets
            .iter()
            .flat_map(|bucket| bucket.events.iter())
            .filter(|event| self.contains(event.site()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn event(code: &str) -> ListingEvent {
        ListingEvent {
            event_code: code.to_string(),
            native_name: format!("name-{code}"),
            description: String::new(),
            extra: BTreeMap::new(),
        }
    }

    fn bucket(codes: &[&str]) -> DayBucket {
        DayBucket {
            events: codes.iter().map(|code| event(code)).collect(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_contains_is_exact() {
        let watch = WatchList::new(["binance", "okx"]);
        assert!(watch.contains("binance"));
        assert!(!watch.contains("Binance"));
        assert!(!watch.contains("binance-us"));
    }

    #[test]
    fn test_filter_keeps_only_watched_sites() {
        let watch = WatchList::new(["binance"]);
        let buckets = vec![bucket(&["a-on-binance", "b-on-okx", "c-on-binance"])];

        let events = watch.filter_events(&buckets);
        let codes: Vec<&str> = events.iter().map(|e| e.event_code.as_str()).collect();
        assert_eq!(codes, vec!["a-on-binance", "c-on-binance"]);
    }

    #[test]
    fn test_filter_preserves_bucket_then_event_order() {
        let watch = WatchList::new(["binance", "okx"]);
        let buckets = vec![
            bucket(&["a-on-binance", "b-on-okx"]),
            bucket(&["c-on-okx", "d-on-bybit", "e-on-binance"]),
        ];

        let events = watch.filter_events(&buckets);
        let codes: Vec<&str> = events.iter().map(|e| e.event_code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["a-on-binance", "b-on-okx", "c-on-okx", "e-on-binance"]
        );
    }

    #[test]
    fn test_empty_watch_list_matches_nothing() {
        let watch = WatchList::default();
        let buckets = vec![bucket(&["a-on-binance"])];
        assert!(watch.filter_events(&buckets).is_empty());
    }

    #[test]
    fn test_filter_ignores_codes_without_site_marker() {
        let watch = WatchList::new(["binance"]);
        let buckets = vec![bucket(&["mainnet-launch", "a-on-binance"])];

        let events = watch.filter_events(&buckets);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_code, "a-on-binance");
    }
}
