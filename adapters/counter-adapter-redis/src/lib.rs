//! Redis counter store
//!
//! Counters are plain Redis integers with a TTL. A Lua script increments the
//! key and sets its expiry on the first hit of a window in one atomic step, so
//! any number of server instances can share the same counters.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError, Script};
use tracing::{debug, info};

use freezer_types::counter_adapter::{CounterAdapter, CounterHit, StoreUnavailable};

/// Returns `{count, pttl}`. A key left without expiry (e.g. written by hand)
/// gets one, so a window can never become permanent.
const INCR_WITH_EXPIRY: &str = r"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('PTTL', KEYS[1])
if count == 1 or ttl < 0 then
	redis.call('PEXPIRE', KEYS[1], ARGV[1])
	ttl = tonumber(ARGV[1])
end
return {count, ttl}
";

#[derive(Debug, Clone, Default)]
pub struct RedisCounterConfig {
	/// Prepended to every key, e.g. `"freezer:"`
	pub key_prefix: Box<str>,
}

pub struct RedisCounterAdapter {
	connection: ConnectionManager,
	script: Script,
	config: RedisCounterConfig,
}

impl std::fmt::Debug for RedisCounterAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedisCounterAdapter").field("config", &self.config).finish_non_exhaustive()
	}
}

impl RedisCounterAdapter {
	pub async fn connect(url: &str) -> Result<Self, RedisError> {
		Self::connect_with_config(url, RedisCounterConfig::default()).await
	}

	pub async fn connect_with_config(
		url: &str,
		config: RedisCounterConfig,
	) -> Result<Self, RedisError> {
		let client = Client::open(url)?;
		let connection = ConnectionManager::new(client).await?;
		info!("Connected to Redis counter store");

		Ok(Self { connection, script: Script::new(INCR_WITH_EXPIRY), config })
	}

	fn key(&self, key: &str) -> String {
		format!("{}{}", self.config.key_prefix, key)
	}
}

#[async_trait]
impl CounterAdapter for RedisCounterAdapter {
	async fn incr_with_expiry(
		&self,
		key: &str,
		window: Duration,
	) -> Result<CounterHit, StoreUnavailable> {
		let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1);
		let mut conn = self.connection.clone();

		let (count, ttl_ms): (u64, i64) = self
			.script
			.key(self.key(key))
			.arg(window_ms)
			.invoke_async(&mut conn)
			.await
			.map_err(|err| {
				debug!("redis increment failed: {}", err);
				StoreUnavailable::new(err.to_string())
			})?;

		Ok(CounterHit {
			count,
			window_remaining: Duration::from_millis(u64::try_from(ttl_ms).unwrap_or(0)),
		})
	}
}

// vim: ts=4
