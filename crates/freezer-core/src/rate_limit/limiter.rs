//! Fixed-window limiter
//!
//! Each key gets one counter per window. The first hit creates the counter
//! with a TTL of one window, every further hit increments it and the request is
//! allowed while the post-increment count stays within the limit. A client may
//! burst up to twice the limit across a window boundary.

use std::sync::Arc;
use std::time::Duration;

use freezer_types::counter_adapter::{CounterAdapter, CounterHit, StoreUnavailable};

use super::config::WindowLimit;
use super::extractors::ClientIdentity;
use crate::prelude::*;

/// Outcome of a single limiter check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateDecision {
	Allowed,
	/// Over the limit. `retry_after` is in whole seconds, at least 1.
	Denied { retry_after: u64 },
}

impl RateDecision {
	pub fn is_allowed(&self) -> bool {
		matches!(self, RateDecision::Allowed)
	}
}

/// Limiter over an arbitrary counter key
#[derive(Debug, Clone)]
pub struct FixedWindowLimiter {
	store: Arc<dyn CounterAdapter>,
	store_timeout: Duration,
}

impl FixedWindowLimiter {
	pub fn new(store: Arc<dyn CounterAdapter>, store_timeout: Duration) -> Self {
		Self { store, store_timeout }
	}

	async fn hit(&self, key: &str, window: Duration) -> Result<CounterHit, StoreUnavailable> {
		match tokio::time::timeout(self.store_timeout, self.store.incr_with_expiry(key, window))
			.await
		{
			Ok(res) => res,
			Err(_) => Err(StoreUnavailable::new(format!(
				"no answer within {}ms",
				self.store_timeout.as_millis()
			))),
		}
	}

	/// Counts one hit on `key` and decides
	pub async fn check(&self, key: &str, limit: WindowLimit) -> RateDecision {
		match self.hit(key, limit.window()).await {
			Ok(hit) if hit.count <= u64::from(limit.limit()) => RateDecision::Allowed,
			Ok(hit) => {
				let retry_after = ceil_secs(hit.window_remaining);
				debug!(key = %key, count = hit.count, retry_after, "rate limit exceeded");
				RateDecision::Denied { retry_after }
			}
			// Fail open: an unreachable store must not lock users out
			Err(err) => {
				warn!(key = %key, error = %err, "rate limit store unavailable, allowing request");
				RateDecision::Allowed
			}
		}
	}
}

fn ceil_secs(d: Duration) -> u64 {
	let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
	secs.max(1)
}

/// Per-client limiter, keyed by namespace and client identity
#[derive(Debug, Clone)]
pub struct ClientRateLimiter {
	inner: FixedWindowLimiter,
}

impl ClientRateLimiter {
	pub fn new(inner: FixedWindowLimiter) -> Self {
		Self { inner }
	}

	pub fn key(namespace: &str, identity: &ClientIdentity) -> String {
		format!("rate_limit:{}:{}", namespace, identity)
	}

	pub async fn check(
		&self,
		namespace: &str,
		identity: &ClientIdentity,
		limit: WindowLimit,
	) -> RateDecision {
		self.inner.check(&Self::key(namespace, identity), limit).await
	}

	pub async fn allow(
		&self,
		namespace: &str,
		identity: &ClientIdentity,
		limit: u32,
		window_secs: u64,
	) -> bool {
		self.check(namespace, identity, WindowLimit::new(limit, window_secs)).await.is_allowed()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use async_trait::async_trait;
	use freezer_counter_adapter_memory::MemoryCounterAdapter;
	use freezer_types::clock::MockClock;
	use std::net::{IpAddr, Ipv4Addr};

	/// Store that always errors
	#[derive(Debug)]
	pub(crate) struct FailingStore;

	#[async_trait]
	impl CounterAdapter for FailingStore {
		async fn incr_with_expiry(
			&self,
			_key: &str,
			_window: Duration,
		) -> Result<CounterHit, StoreUnavailable> {
			Err(StoreUnavailable::new("connection refused"))
		}
	}

	/// Store that never answers
	#[derive(Debug)]
	pub(crate) struct HangingStore;

	#[async_trait]
	impl CounterAdapter for HangingStore {
		async fn incr_with_expiry(
			&self,
			_key: &str,
			_window: Duration,
		) -> Result<CounterHit, StoreUnavailable> {
			std::future::pending().await
		}
	}

	pub(crate) fn client(last: u8) -> ClientIdentity {
		ClientIdentity(IpAddr::V4(Ipv4Addr::new(192, 0, 2, last)))
	}

	fn memory_limiter(clock: &MockClock) -> ClientRateLimiter {
		let store = Arc::new(MemoryCounterAdapter::new(Arc::new(clock.clone())));
		ClientRateLimiter::new(FixedWindowLimiter::new(store, Duration::from_millis(500)))
	}

	#[tokio::test]
	async fn test_limit_then_deny() {
		let clock = MockClock::new(Timestamp(1_700_000_000));
		let limiter = memory_limiter(&clock);

		for id in [client(1), client(2)] {
			for _ in 0..20 {
				assert!(limiter.allow("s3", &id, 20, 5).await);
			}
			assert!(!limiter.allow("s3", &id, 20, 5).await);
		}
	}

	#[tokio::test]
	async fn test_denied_reports_remaining_window() {
		let clock = MockClock::new(Timestamp(1_700_000_000));
		let limiter = memory_limiter(&clock);
		let limit = WindowLimit::new(20, 5);

		for _ in 0..20 {
			limiter.check("s3", &client(1), limit).await;
		}
		assert_eq!(
			limiter.check("s3", &client(1), limit).await,
			RateDecision::Denied { retry_after: 5 }
		);

		clock.advance(3);
		assert_eq!(
			limiter.check("s3", &client(1), limit).await,
			RateDecision::Denied { retry_after: 2 }
		);
	}

	#[tokio::test]
	async fn test_window_resets() {
		let clock = MockClock::new(Timestamp(1_700_000_000));
		let limiter = memory_limiter(&clock);

		for _ in 0..3 {
			assert!(limiter.allow("s3url", &client(1), 3, 5).await);
		}
		assert!(!limiter.allow("s3url", &client(1), 3, 5).await);

		clock.advance(5);
		assert!(limiter.allow("s3url", &client(1), 3, 5).await);
	}

	#[tokio::test]
	async fn test_namespaces_are_independent() {
		let clock = MockClock::new(Timestamp(1_700_000_000));
		let limiter = memory_limiter(&clock);

		assert!(limiter.allow("s3", &client(1), 1, 5).await);
		assert!(!limiter.allow("s3", &client(1), 1, 5).await);
		assert!(limiter.allow("s3url", &client(1), 1, 5).await);
	}

	#[tokio::test]
	async fn test_fails_open_on_store_error() {
		let limiter = ClientRateLimiter::new(FixedWindowLimiter::new(
			Arc::new(FailingStore),
			Duration::from_millis(500),
		));
		for _ in 0..50 {
			assert!(limiter.allow("s3", &client(1), 1, 5).await);
		}
	}

	#[tokio::test]
	async fn test_fails_open_on_store_timeout() {
		let limiter = ClientRateLimiter::new(FixedWindowLimiter::new(
			Arc::new(HangingStore),
			Duration::from_millis(20),
		));
		assert!(limiter.allow("s3", &client(1), 1, 5).await);
	}

	#[test]
	fn test_key_format() {
		assert_eq!(ClientRateLimiter::key("s3", &client(9)), "rate_limit:s3:192.0.2.9");
	}

	#[test]
	fn test_ceil_secs() {
		assert_eq!(ceil_secs(Duration::ZERO), 1);
		assert_eq!(ceil_secs(Duration::from_millis(4200)), 5);
		assert_eq!(ceil_secs(Duration::from_secs(5)), 5);
	}
}

// vim: ts=4
