//! Time source abstraction.
//!
//! Window and expiry calculations read time through [`Clock`] so tests can
//! drive it explicitly with [`MockClock`] (feature `test-helpers`).

use std::fmt::Debug;

use crate::types::{self, Timestamp};

/// Wall-clock time source
pub trait Clock: Debug + Send + Sync {
	fn now(&self) -> Timestamp;
}

/// System clock backed by `SystemTime::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
	pub fn new() -> Self {
		Self
	}
}

impl Clock for SystemClock {
	fn now(&self) -> Timestamp {
		types::now()
	}
}

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-helpers"))]
mod mock {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicI64, Ordering};

	use super::Clock;
	use crate::types::Timestamp;

	/// Manually driven clock. Clones share the same time value.
	#[derive(Debug, Clone)]
	pub struct MockClock {
		current: Arc<AtomicI64>,
	}

	impl MockClock {
		pub fn new(start: Timestamp) -> Self {
			Self { current: Arc::new(AtomicI64::new(start.0)) }
		}

		pub fn advance(&self, secs: i64) {
			self.current.fetch_add(secs, Ordering::SeqCst);
		}

		pub fn set(&self, at: Timestamp) {
			self.current.store(at.0, Ordering::SeqCst);
		}
	}

	impl Clock for MockClock {
		fn now(&self) -> Timestamp {
			Timestamp(self.current.load(Ordering::SeqCst))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_system_clock_is_recent() {
		// 2020-01-01
		assert!(SystemClock::new().now() > Timestamp(1_577_836_800));
	}

	#[test]
	fn test_mock_clock() {
		let clock = MockClock::new(Timestamp(100));
		let shared = clock.clone();
		assert_eq!(clock.now(), Timestamp(100));

		shared.advance(10);
		assert_eq!(clock.now(), Timestamp(110));

		clock.set(Timestamp(5));
		assert_eq!(shared.now(), Timestamp(5));
	}
}

// vim: ts=4
