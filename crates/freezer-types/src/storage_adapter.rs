//! Adapter for the object storage behind the explorer
//!
//! The gateway never looks inside; handlers call these two operations only
//! after an `Authorized` decision.

use async_trait::async_trait;
use serde::Serialize;
use std::{fmt::Debug, time::Duration};

use crate::prelude::*;

/// One entry of a bucket listing
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
	pub key: Box<str>,
	pub size: u64,
	pub last_modified: Option<Box<str>>,
}

#[async_trait]
pub trait StorageAdapter: Debug + Send + Sync {
	/// Lists every object in the configured bucket
	async fn list_objects(&self) -> ClResult<Vec<ObjectInfo>>;

	/// Issues a time-limited download link for `key`
	async fn signed_url(&self, key: &str, expires_in: Duration) -> ClResult<Box<str>>;
}

// vim: ts=4
