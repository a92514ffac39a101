//! Integration tests against a simulated partitioned backend
//!
//! Tests the full end-to-end flow: feed config → routing cache → feed
//! iterator → checkpoint → resume after a partition split

use async_trait::async_trait;
use feedrange::driver::{FeedPage, FeedRequest, FeedStatus, FeedTransport};
use feedrange::routing::InMemoryRoutingSource;
use feedrange::{
    CheckpointStore, Error, FeedConfig, FeedContinuation, FeedIterator, PartitionKeyRange,
    PartitionKeyRangeCache, Result, StartFrom,
};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

// ============================================================================
// Simulated Backend
// ============================================================================

/// Documents keyed by effective key and ordered by a global sequence number.
///
/// Token semantics: the last sequence number seen in the addressed range.
/// A read addressing a range no single partition owns reports a split.
struct PartitionedStore {
    partitions: Mutex<Vec<PartitionKeyRange>>,
    documents: Mutex<Vec<(String, u64)>>,
    finite: bool,
}

impl PartitionedStore {
    fn new(partitions: Vec<PartitionKeyRange>, finite: bool) -> Arc<Self> {
        Arc::new(Self {
            partitions: Mutex::new(partitions),
            documents: Mutex::new(Vec::new()),
            finite,
        })
    }

    fn insert(&self, key: &str) {
        let mut documents = self.documents.lock().unwrap();
        let lsn = documents.len() as u64 + 1;
        documents.push((key.to_string(), lsn));
    }

    fn set_partitions(&self, partitions: Vec<PartitionKeyRange>) {
        *self.partitions.lock().unwrap() = partitions;
    }
}

#[async_trait]
impl FeedTransport for PartitionedStore {
    async fn read(&self, request: FeedRequest) -> Result<FeedPage> {
        let owned = self.partitions.lock().unwrap().iter().any(|p| {
            p.min_inclusive <= request.range.min && request.range.max <= p.max_exclusive
        });
        if !owned {
            return Ok(FeedPage::gone(true));
        }

        let after: u64 = match &request.continuation {
            Some(token) => token
                .parse()
                .map_err(|_| Error::transport(format!("bad token {token}"), false))?,
            None => 0,
        };

        let mut matching: Vec<(String, u64)> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, lsn)| *lsn > after && request.range.contains(key))
            .cloned()
            .collect();
        matching.sort_by_key(|(_, lsn)| *lsn);

        let limit = request.max_item_count.unwrap_or(u32::MAX) as usize;
        let remaining = matching.len();
        let page: Vec<_> = matching.into_iter().take(limit).collect();

        let Some((_, last)) = page.last().cloned() else {
            return Ok(if self.finite {
                FeedPage::success(None, Vec::new())
            } else {
                FeedPage::not_modified(after.to_string())
            });
        };

        let items = page
            .iter()
            .map(|(key, lsn)| json!({"key": key, "lsn": lsn}))
            .collect();
        let continuation = if self.finite && remaining <= limit {
            None
        } else {
            Some(last.to_string())
        };
        Ok(FeedPage::success(continuation, items))
    }
}

fn partitions(bounds: &[(&str, &str, &str)]) -> Vec<PartitionKeyRange> {
    bounds
        .iter()
        .map(|(id, min, max)| PartitionKeyRange::new(*id, *min, *max))
        .collect()
}

fn keys(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| item["key"].as_str().unwrap().to_string())
        .collect()
}

async fn drain(feed: FeedIterator) -> (Vec<Value>, Vec<FeedStatus>, String) {
    let mut items = Vec::new();
    let mut statuses = Vec::new();
    let mut continuation = String::new();

    let mut stream = Box::pin(feed.into_stream());
    while let Some(iteration) = stream.next().await {
        let iteration = iteration.unwrap();
        items.extend(iteration.items);
        statuses.push(iteration.status);
        continuation = iteration.continuation;
    }
    (items, statuses, continuation)
}

// ============================================================================
// Change Feed
// ============================================================================

#[tokio::test]
async fn test_change_feed_checkpoint_and_resume_across_split() {
    let initial = partitions(&[("0", "", "80"), ("1", "80", "FF")]);
    let source = InMemoryRoutingSource::with_container("orders", initial.clone());
    let store = PartitionedStore::new(initial, false);
    store.insert("10");
    store.insert("90");
    store.insert("20");

    let config = FeedConfig::from_yaml_str(
        r#"
container_id: orders
mode: change_feed
max_item_count: 10
"#,
    )
    .unwrap();

    // First run reads everything and checkpoints
    let cache = Arc::new(PartitionKeyRangeCache::new(source.clone()));
    let feed = FeedIterator::from_config(&config, store.clone(), cache).await.unwrap();
    let (items, statuses, continuation) = drain(feed).await;

    assert_eq!(keys(&items), vec!["10", "20", "90"]);
    assert_eq!(statuses.last(), Some(&FeedStatus::NotModified));

    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoints.json");
    let checkpoints = CheckpointStore::new(&path);
    checkpoints
        .save_continuation("orders-feed", &FeedContinuation::parse(&continuation).unwrap())
        .await
        .unwrap();

    // The first partition splits while nobody is reading
    let after_split = partitions(&[("2", "", "40"), ("3", "40", "80"), ("1", "80", "FF")]);
    source.set_ranges("orders", after_split.clone()).await;
    store.set_partitions(after_split);
    store.insert("30");
    store.insert("50");

    // Second run resumes from the checkpoint with a cold cache
    let checkpoints = CheckpointStore::open(&path).await.unwrap();
    let restored = checkpoints
        .restore("orders-feed", "orders")
        .await
        .unwrap()
        .unwrap();
    let config = config.with_start_from(StartFrom::Continuation {
        continuation: restored.to_json().unwrap(),
    });

    let cache = Arc::new(PartitionKeyRangeCache::new(source.clone()));
    let feed = FeedIterator::from_config(&config, store.clone(), cache)
        .await
        .unwrap();
    let (items, _, continuation) = drain(feed).await;

    assert_eq!(keys(&items), vec!["30", "50"]);

    let resumed = FeedContinuation::parse(&continuation).unwrap();
    let frontier = resumed.as_composite().unwrap();
    assert_eq!(frontier.len(), 3);
    assert!(frontier.done_ranges().is_empty());
}

#[tokio::test]
async fn test_change_feed_start_from_token_skips_history() {
    let layout = partitions(&[("0", "", "80"), ("1", "80", "FF")]);
    let source = InMemoryRoutingSource::with_container("orders", layout.clone());
    let store = PartitionedStore::new(layout, false);
    store.insert("10");
    store.insert("90");
    store.insert("20");

    let config = FeedConfig::new("orders").with_start_from(StartFrom::Token {
        token: "2".to_string(),
    });
    let cache = Arc::new(PartitionKeyRangeCache::new(source));
    let feed = FeedIterator::from_config(&config, store, cache).await.unwrap();

    let (items, _, _) = drain(feed).await;
    assert_eq!(keys(&items), vec!["20"]);
}

#[tokio::test]
async fn test_checkpoint_rejects_other_container() {
    let dir = tempdir().unwrap();
    let checkpoints = CheckpointStore::new(dir.path().join("checkpoints.json"));

    let continuation: FeedContinuation =
        feedrange::PartitionKeyRangeContinuation::new("orders", "0", None).into();
    checkpoints
        .save_continuation("feed", &continuation)
        .await
        .unwrap();

    let err = checkpoints.restore("feed", "users").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

// ============================================================================
// Read Feed
// ============================================================================

#[tokio::test]
async fn test_read_feed_drains_in_pages() {
    let layout = partitions(&[("0", "", "80"), ("1", "80", "FF")]);
    let source = InMemoryRoutingSource::with_container("orders", layout.clone());
    let store = PartitionedStore::new(layout, true);
    store.insert("10");
    store.insert("90");
    store.insert("20");

    let config = FeedConfig::from_json_str(
        r#"{"container_id":"orders","mode":"read_feed","max_item_count":1}"#,
    )
    .unwrap();
    let cache = Arc::new(PartitionKeyRangeCache::new(source));
    let feed = FeedIterator::from_config(&config, store, cache).await.unwrap();

    let (items, statuses, continuation) = drain(feed).await;
    assert_eq!(keys(&items), vec!["10", "90", "20"]);
    assert_eq!(statuses.len(), 3);

    let finished = FeedContinuation::parse(&continuation).unwrap();
    assert!(finished.is_done());
}

#[tokio::test]
async fn test_read_feed_over_sub_range_with_split() {
    let layout = partitions(&[("0", "", "80"), ("1", "80", "FF")]);
    let source = InMemoryRoutingSource::with_container("orders", layout.clone());
    let store = PartitionedStore::new(layout, true);
    for key in ["05", "30", "50", "70", "A0"] {
        store.insert(key);
    }

    let config = FeedConfig::new("orders")
        .with_mode(feedrange::FeedMode::ReadFeed)
        .with_range(feedrange::Range::half_open("20".to_string(), "60".to_string()));
    let cache = Arc::new(PartitionKeyRangeCache::new(source.clone()));
    let feed = FeedIterator::from_config(&config, store.clone(), cache)
        .await
        .unwrap();

    // Split lands between iterator creation and the first read
    let after_split = partitions(&[("2", "", "40"), ("3", "40", "80"), ("1", "80", "FF")]);
    source.set_ranges("orders", after_split.clone()).await;
    store.set_partitions(after_split);

    let (items, _, continuation) = drain(feed).await;
    assert_eq!(keys(&items), vec!["30", "50"]);

    let finished = FeedContinuation::parse(&continuation).unwrap();
    let frontier = finished.as_composite().unwrap();
    let bounds: Vec<_> = frontier
        .tokens()
        .map(|t| (t.range.min.clone(), t.range.max.clone()))
        .collect();
    assert_eq!(
        bounds,
        vec![
            ("20".to_string(), "40".to_string()),
            ("40".to_string(), "60".to_string())
        ]
    );
    assert!(frontier.is_done());
}
