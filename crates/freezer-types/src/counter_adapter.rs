//! Adapter for the counter store backing the rate limiters
//!
//! A counter store keeps one integer per key together with an expiry. The only
//! operation the gateway needs is an atomic "increment, creating the key with
//! the given TTL if it does not exist yet". Window bookkeeping (start, reset)
//! is entirely the store's business.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

/// Result of a single increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterHit {
	/// Post-increment count in the current window
	pub count: u64,
	/// Time until the current window expires
	pub window_remaining: Duration,
}

/// The store could not be reached or returned an error.
///
/// Carries a description for logging only; limiters treat every occurrence
/// the same way.
#[derive(Debug, Clone)]
pub struct StoreUnavailable(pub Box<str>);

impl StoreUnavailable {
	pub fn new(reason: impl Into<Box<str>>) -> Self {
		Self(reason.into())
	}
}

impl std::fmt::Display for StoreUnavailable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "counter store unavailable: {}", self.0)
	}
}

impl std::error::Error for StoreUnavailable {}

#[async_trait]
pub trait CounterAdapter: Debug + Send + Sync {
	/// Atomically increments `key`.
	///
	/// If the key does not exist it is created with count 1 and a TTL of
	/// `window`. Concurrent calls for the same key must be serialized by the
	/// store.
	async fn incr_with_expiry(
		&self,
		key: &str,
		window: Duration,
	) -> Result<CounterHit, StoreUnavailable>;
}

// vim: ts=4
