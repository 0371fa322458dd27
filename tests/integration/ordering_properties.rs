//! Property tests for store ordering and truncation

use chrono::Utc;
use proptest::prelude::*;
use tabvault::{ClosedTab, ClosureHistoryStore, ClosureKind};

fn url_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 1..40)
        .prop_map(|hosts| hosts.into_iter().map(|h| format!("https://{h}.test")).collect())
}

proptest! {
    /// Committing closures C1..Cn yields query(n) == Cn..C1.
    #[test]
    fn query_returns_most_recent_first(urls in url_strategy()) {
        let mut store = ClosureHistoryStore::new();
        for url in &urls {
            store.insert(ClosureKind::Tab(ClosedTab::new("t", url)), Utc::now());
        }

        let entries = store.query(urls.len());
        prop_assert_eq!(entries.len(), urls.len());
        for (entry, url) in entries.iter().zip(urls.iter().rev()) {
            match &entry.kind {
                ClosureKind::Tab(tab) => prop_assert_eq!(&tab.url, url),
                _ => prop_assert!(false, "expected tab record"),
            }
        }
    }

    /// query(k) for k < n returns exactly the k most recent records with
    /// no duplicates.
    #[test]
    fn query_truncates_without_duplicates(urls in url_strategy(), k in 0usize..40) {
        let mut store = ClosureHistoryStore::new();
        for url in &urls {
            store.insert(ClosureKind::Tab(ClosedTab::new("t", url)), Utc::now());
        }

        let entries = store.query(k);
        prop_assert_eq!(entries.len(), k.min(urls.len()));

        let mut ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        ids.dedup();
        prop_assert_eq!(ids.len(), entries.len());

        // The truncated view is a prefix of the full view.
        let full = store.query(urls.len());
        for (truncated, full_entry) in entries.iter().zip(full.iter()) {
            prop_assert_eq!(truncated.id, full_entry.id);
        }
    }
}
