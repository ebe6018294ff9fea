//! Rate limit allowances

use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;

/// "At most `limit` hits per `window`"
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowLimit {
	limit: NonZeroU32,
	window_secs: NonZeroU64,
}

impl WindowLimit {
	/// Zero values are raised to 1; a zero-length window cannot be expired by
	/// any counter store.
	pub fn new(limit: u32, window_secs: u64) -> Self {
		Self {
			limit: NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN),
			window_secs: NonZeroU64::new(window_secs).unwrap_or(NonZeroU64::MIN),
		}
	}

	pub fn limit(&self) -> u32 {
		self.limit.get()
	}

	pub fn window(&self) -> Duration {
		Duration::from_secs(self.window_secs.get())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zero_is_clamped() {
		let limit = WindowLimit::new(0, 0);
		assert_eq!(limit.limit(), 1);
		assert_eq!(limit.window(), Duration::from_secs(1));
	}
}

// vim: ts=4
