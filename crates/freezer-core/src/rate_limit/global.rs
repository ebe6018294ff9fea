//! Global (per-resource) limiter
//!
//! One counter per resource shared by every client, protecting the storage
//! backend from aggregate load no matter how it is spread across clients.

use super::config::WindowLimit;
use super::limiter::{FixedWindowLimiter, RateDecision};

#[derive(Debug, Clone)]
pub struct GlobalRateLimiter {
	inner: FixedWindowLimiter,
	limit: WindowLimit,
}

impl GlobalRateLimiter {
	pub fn new(inner: FixedWindowLimiter, limit: WindowLimit) -> Self {
		Self { inner, limit }
	}

	pub fn key(resource: &str) -> String {
		format!("global_rate_limit:{}", resource)
	}

	pub fn limit(&self) -> WindowLimit {
		self.limit
	}

	pub async fn check(&self, resource: &str) -> RateDecision {
		self.inner.check(&Self::key(resource), self.limit).await
	}

	pub async fn allow(&self, resource: &str) -> bool {
		self.check(resource).await.is_allowed()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rate_limit::limiter::tests::FailingStore;
	use freezer_counter_adapter_memory::MemoryCounterAdapter;
	use freezer_types::clock::MockClock;
	use freezer_types::types::Timestamp;
	use std::sync::Arc;
	use std::time::Duration;

	fn limiter(clock: &MockClock, limit: u32, window_secs: u64) -> GlobalRateLimiter {
		let store = Arc::new(MemoryCounterAdapter::new(Arc::new(clock.clone())));
		GlobalRateLimiter::new(
			FixedWindowLimiter::new(store, Duration::from_millis(500)),
			WindowLimit::new(limit, window_secs),
		)
	}

	#[tokio::test]
	async fn test_per_resource() {
		let clock = MockClock::new(Timestamp(1_700_000_000));
		let global = limiter(&clock, 2, 60);

		assert!(global.allow("s3").await);
		assert!(global.allow("s3").await);
		assert_eq!(global.check("s3").await, RateDecision::Denied { retry_after: 60 });
		assert!(global.allow("s3url").await);

		clock.advance(60);
		assert!(global.allow("s3").await);
	}

	#[tokio::test]
	async fn test_fails_open() {
		let global = GlobalRateLimiter::new(
			FixedWindowLimiter::new(Arc::new(FailingStore), Duration::from_millis(500)),
			WindowLimit::new(1, 60),
		);
		assert!(global.allow("s3").await);
		assert!(global.allow("s3").await);
	}

	#[test]
	fn test_key_format() {
		assert_eq!(GlobalRateLimiter::key("s3url"), "global_rate_limit:s3url");
	}
}

// vim: ts=4
