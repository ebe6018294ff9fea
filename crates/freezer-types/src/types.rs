//! Common types used throughout Freezer.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// Timestamp //
//***********//
/// Unix time in whole seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn add_seconds(self, secs: i64) -> Timestamp {
		Timestamp(self.0.saturating_add(secs))
	}

	/// Seconds from `self` until `later`, zero if `later` is in the past
	pub fn seconds_until(self, later: Timestamp) -> u64 {
		u64::try_from(later.0.saturating_sub(self.0)).unwrap_or(0)
	}

	/// RFC 3339 rendering for logs and API payloads
	pub fn to_rfc3339(self) -> String {
		chrono::DateTime::from_timestamp(self.0, 0)
			.map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
			.unwrap_or_else(|| self.0.to_string())
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
}

/// Success envelope for API responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
	pub success: bool,
	#[serde(flatten)]
	pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { success: true, data }
	}
}


// vim: ts=4
