//! In-memory counter store
//!
//! Keeps fixed-window counters in a bounded LRU map behind a mutex. Counts are
//! local to the process, so this store is only correct for a single server
//! instance. When the map is full the least recently hit window is dropped,
//! which at worst forgets a client's count early.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;

use freezer_types::clock::Clock;
use freezer_types::counter_adapter::{CounterAdapter, CounterHit, StoreUnavailable};
use freezer_types::types::Timestamp;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(100_000) {
	Some(v) => v,
	None => unreachable!(),
};

#[derive(Debug, Clone, Copy)]
struct Window {
	count: u64,
	expires_at: Timestamp,
}

#[derive(Debug)]
pub struct MemoryCounterAdapter {
	windows: Mutex<LruCache<Box<str>, Window>>,
	clock: Arc<dyn Clock>,
}

impl MemoryCounterAdapter {
	pub fn new(clock: Arc<dyn Clock>) -> Self {
		Self::with_capacity(DEFAULT_CAPACITY, clock)
	}

	pub fn with_capacity(capacity: NonZeroUsize, clock: Arc<dyn Clock>) -> Self {
		Self { windows: Mutex::new(LruCache::new(capacity)), clock }
	}

	/// Number of tracked windows, expired ones included
	pub fn len(&self) -> usize {
		self.windows.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.windows.lock().is_empty()
	}
}

#[async_trait]
impl CounterAdapter for MemoryCounterAdapter {
	async fn incr_with_expiry(
		&self,
		key: &str,
		window: Duration,
	) -> Result<CounterHit, StoreUnavailable> {
		let now = self.clock.now();
		let window_secs = i64::try_from(window.as_secs().max(1))
			.map_err(|_| StoreUnavailable::new("window too large"))?;

		let mut windows = self.windows.lock();
		let entry = match windows.get_mut(key) {
			Some(w) if now < w.expires_at => {
				w.count += 1;
				*w
			}
			_ => {
				let w = Window { count: 1, expires_at: now.add_seconds(window_secs) };
				windows.put(key.into(), w);
				w
			}
		};

		Ok(CounterHit {
			count: entry.count,
			window_remaining: Duration::from_secs(now.seconds_until(entry.expires_at)),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use freezer_types::clock::MockClock;

	#[tokio::test]
	async fn test_capacity_evicts_oldest() {
		let clock = Arc::new(MockClock::new(Timestamp(1_000)));
		let capacity = NonZeroUsize::new(2).unwrap_or(NonZeroUsize::MIN);
		let store = MemoryCounterAdapter::with_capacity(capacity, clock);
		let window = Duration::from_secs(60);

		for key in ["a", "b", "a", "c"] {
			store.incr_with_expiry(key, window).await.expect("Failed to increment");
		}
		assert_eq!(store.len(), 2);

		// "b" was evicted and starts over
		let hit = store.incr_with_expiry("b", window).await.expect("Failed to increment");
		assert_eq!(hit.count, 1);
	}
}

// vim: ts=4
