//! Fixed-window behaviour of the in-memory counter store

use std::sync::Arc;
use std::time::Duration;

use freezer_counter_adapter_memory::MemoryCounterAdapter;
use freezer_types::clock::MockClock;
use freezer_types::counter_adapter::CounterAdapter;
use freezer_types::types::Timestamp;

const WINDOW: Duration = Duration::from_secs(5);

fn create_test_store() -> (MemoryCounterAdapter, MockClock) {
	let clock = MockClock::new(Timestamp(1_700_000_000));
	(MemoryCounterAdapter::new(Arc::new(clock.clone())), clock)
}

#[tokio::test]
async fn test_first_hit_creates_window() {
	let (store, _clock) = create_test_store();
	let hit = store.incr_with_expiry("rate_limit:s3:1.2.3.4", WINDOW).await.expect("Failed to increment");
	assert_eq!(hit.count, 1);
	assert_eq!(hit.window_remaining, WINDOW);
}

#[tokio::test]
async fn test_counts_within_window() {
	let (store, clock) = create_test_store();
	for expected in 1..=21 {
		let hit = store.incr_with_expiry("k", WINDOW).await.expect("Failed to increment");
		assert_eq!(hit.count, expected);
	}

	clock.advance(2);
	let hit = store.incr_with_expiry("k", WINDOW).await.expect("Failed to increment");
	assert_eq!(hit.count, 22);
	assert_eq!(hit.window_remaining, Duration::from_secs(3));
}

#[tokio::test]
async fn test_window_expires() {
	let (store, clock) = create_test_store();
	store.incr_with_expiry("k", WINDOW).await.expect("Failed to increment");
	store.incr_with_expiry("k", WINDOW).await.expect("Failed to increment");

	clock.advance(4);
	let hit = store.incr_with_expiry("k", WINDOW).await.expect("Failed to increment");
	assert_eq!(hit.count, 3);

	clock.advance(1);
	let hit = store.incr_with_expiry("k", WINDOW).await.expect("Failed to increment");
	assert_eq!(hit.count, 1);
	assert_eq!(hit.window_remaining, WINDOW);
}

#[tokio::test]
async fn test_keys_are_independent() {
	let (store, _clock) = create_test_store();
	store.incr_with_expiry("a", WINDOW).await.expect("Failed to increment");
	store.incr_with_expiry("a", WINDOW).await.expect("Failed to increment");
	let hit = store.incr_with_expiry("b", WINDOW).await.expect("Failed to increment");
	assert_eq!(hit.count, 1);
}

#[tokio::test]
async fn test_concurrent_increments_are_counted_once_each() {
	let (store, _clock) = create_test_store();
	let store = Arc::new(store);

	let mut handles = Vec::new();
	for _ in 0..50 {
		let store = store.clone();
		handles.push(tokio::spawn(async move {
			store.incr_with_expiry("shared", Duration::from_secs(60)).await.map(|h| h.count)
		}));
	}

	let mut counts = Vec::new();
	for handle in handles {
		counts.push(handle.await.expect("Task panicked").expect("Failed to increment"));
	}
	counts.sort_unstable();
	assert_eq!(counts, (1..=50).collect::<Vec<u64>>());
}
