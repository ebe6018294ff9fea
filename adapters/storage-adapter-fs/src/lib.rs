//! Filesystem bucket
//!
//! Serves the files below a base directory as a flat bucket. Object keys are
//! `/`-separated paths relative to the base directory. Download links are
//! signed with HMAC-SHA256 over the key and the expiry timestamp and are
//! verified by the server's file route.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::fs::{create_dir_all, metadata, read_dir};

use freezer_types::clock::Clock;
use freezer_types::prelude::*;
use freezer_types::storage_adapter::{ObjectInfo, StorageAdapter};

type HmacSha256 = Hmac<Sha256>;

/// Route prefix the server mounts the file handler on
pub const FILES_PATH: &str = "/files";

/// Checks that `key` is a plain relative path and converts it
fn key_to_rel_path(key: &str) -> ClResult<PathBuf> {
	if key.is_empty() || key.contains('\\') {
		return Err(Error::ValidationError("invalid object key".into()));
	}
	let path = Path::new(key);
	if !path.components().all(|c| matches!(c, Component::Normal(_))) {
		return Err(Error::ValidationError("invalid object key".into()));
	}
	Ok(path.to_path_buf())
}

/// Percent-encodes a key for use in a URL path, keeping `/` separators
fn encode_key(key: &str) -> String {
	let mut out = String::with_capacity(key.len());
	for b in key.bytes() {
		match b {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
				out.push(char::from(b));
			}
			_ => out.push_str(&format!("%{:02X}", b)),
		}
	}
	out
}

pub struct FsStorage {
	base_dir: Box<Path>,
	public_base_url: Box<str>,
	signing_key: Box<[u8]>,
	clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FsStorage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FsStorage")
			.field("base_dir", &self.base_dir)
			.field("public_base_url", &self.public_base_url)
			.finish_non_exhaustive()
	}
}

impl FsStorage {
	pub async fn new(
		base_dir: Box<Path>,
		public_base_url: &str,
		signing_key: &[u8],
		clock: Arc<dyn Clock>,
	) -> ClResult<Self> {
		if signing_key.is_empty() {
			return Err(Error::ConfigError("storage signing key is empty".into()));
		}
		create_dir_all(&base_dir).await?;
		Ok(Self {
			base_dir,
			public_base_url: public_base_url.trim_end_matches('/').into(),
			signing_key: signing_key.into(),
			clock,
		})
	}

	fn mac(&self, key: &str, expires: i64) -> ClResult<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(&self.signing_key)
			.map_err(|_| Error::Internal("invalid HMAC key".into()))?;
		mac.update(key.as_bytes());
		mac.update(b"\n");
		mac.update(expires.to_string().as_bytes());
		Ok(mac)
	}

	fn sign(&self, key: &str, expires: i64) -> ClResult<String> {
		Ok(URL_SAFE_NO_PAD.encode(self.mac(key, expires)?.finalize().into_bytes()))
	}

	/// Verifies a download link and returns the file it points to
	pub async fn verify_signed(&self, key: &str, expires: i64, signature: &str) -> ClResult<PathBuf> {
		let rel_path = key_to_rel_path(key)?;
		let sig = URL_SAFE_NO_PAD.decode(signature).map_err(|_| Error::PermissionDenied)?;
		self.mac(key, expires)?.verify_slice(&sig).map_err(|_| {
			debug!("signature mismatch for {}", key);
			Error::PermissionDenied
		})?;
		if self.clock.now() >= Timestamp(expires) {
			debug!("expired link for {}", key);
			return Err(Error::PermissionDenied);
		}

		let path = self.base_dir.join(rel_path);
		match metadata(&path).await {
			Ok(m) if m.is_file() => Ok(path),
			_ => Err(Error::NotFound),
		}
	}
}

#[async_trait]
impl StorageAdapter for FsStorage {
	async fn list_objects(&self) -> ClResult<Vec<ObjectInfo>> {
		let mut objects = Vec::new();
		let mut dirs = vec![(self.base_dir.to_path_buf(), String::new())];

		while let Some((dir, prefix)) = dirs.pop() {
			let mut entries = read_dir(&dir).await.map_err(|err| {
				warn!("cannot list {:?}: {}", &dir, err);
				Error::StorageError(err.to_string())
			})?;
			while let Some(entry) = entries.next_entry().await? {
				let Ok(name) = entry.file_name().into_string() else {
					warn!("skipping non UTF-8 name in {:?}", &dir);
					continue;
				};
				let key = format!("{}{}", prefix, name);
				let meta = entry.metadata().await?;
				if meta.is_dir() {
					dirs.push((entry.path(), format!("{}/", key)));
				} else if meta.is_file() {
					let last_modified = meta
						.modified()
						.ok()
						.map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339().into());
					objects.push(ObjectInfo { key: key.into(), size: meta.len(), last_modified });
				}
			}
		}

		objects.sort_by(|a, b| a.key.cmp(&b.key));
		Ok(objects)
	}

	async fn signed_url(&self, key: &str, expires_in: Duration) -> ClResult<Box<str>> {
		key_to_rel_path(key)?;
		let secs = i64::try_from(expires_in.as_secs())
			.map_err(|_| Error::ValidationError("expiry too far".into()))?;
		let expires = self.clock.now().add_seconds(secs).0;
		let signature = self.sign(key, expires)?;

		Ok(format!(
			"{}{}/{}?expires={}&signature={}",
			self.public_base_url,
			FILES_PATH,
			encode_key(key),
			expires,
			signature
		)
		.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_key_validation() {
		assert!(key_to_rel_path("a.txt").is_ok());
		assert!(key_to_rel_path("dir/sub/a.txt").is_ok());
		assert!(key_to_rel_path("").is_err());
		assert!(key_to_rel_path("../etc/passwd").is_err());
		assert!(key_to_rel_path("dir/../../x").is_err());
		assert!(key_to_rel_path("/etc/passwd").is_err());
		assert!(key_to_rel_path("dir\\..\\x").is_err());
	}

	#[test]
	fn test_encode_key() {
		assert_eq!(encode_key("dir/my file.txt"), "dir/my%20file.txt");
		assert_eq!(encode_key("a&b?.bin"), "a%26b%3F.bin");
	}
}

// vim: ts=4
