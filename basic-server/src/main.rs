//! Freezer server configured from environment variables
//!
//! Serves `STORAGE_DIR` as the bucket. Rate limit counters go to Redis when
//! `REDIS_URL` is set, otherwise they are kept in memory.

#![forbid(unsafe_code)]

mod config;
mod files;

use std::sync::Arc;

use tracing::{error, info, warn};

use freezer::AppBuilder;
use freezer::clock::{Clock, SystemClock};
use freezer::counter_adapter::CounterAdapter;
use freezer_counter_adapter_memory::MemoryCounterAdapter;
use freezer_counter_adapter_redis::{RedisCounterAdapter, RedisCounterConfig};
use freezer_storage_adapter_fs::FsStorage;
use freezer_types::error::{ClResult, Error};

#[tokio::main]
async fn main() -> ClResult<()> {
	let mut builder = AppBuilder::new();

	let config = config::load_config(|name| std::env::var(name).ok()).map_err(|e| {
		error!("FATAL: {}", e);
		e
	})?;
	let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

	let counter_adapter: Arc<dyn CounterAdapter> = match &config.redis_url {
		Some(url) => {
			let redis_config = RedisCounterConfig { key_prefix: "freezer:".into() };
			let adapter =
				RedisCounterAdapter::connect_with_config(url, redis_config).await.map_err(|e| {
					error!("FATAL: Cannot connect to Redis: {}", e);
					Error::ConfigError(format!("Cannot connect to Redis: {}", e))
				})?;
			Arc::new(adapter)
		}
		None => {
			warn!("REDIS_URL is not set, rate limit counters are local to this process");
			Arc::new(MemoryCounterAdapter::new(clock.clone()))
		}
	};

	let link_key = format!("{}:download-links", config.gateway.signing_secret.expose());
	let storage = Arc::new(
		FsStorage::new(
			config.storage_dir.clone().into(),
			&config.public_base_url,
			link_key.as_bytes(),
			clock.clone(),
		)
		.await?,
	);
	info!("Serving bucket from {:?}", &config.storage_dir);

	builder
		.mode(config.mode)
		.listen(config.listen)
		.dist_dir(config.dist_dir)
		.secure_cookies(config.secure_cookies)
		.clock(clock)
		.counter_adapter(counter_adapter)
		.storage_adapter(storage.clone())
		.merge_router(files::init(storage))
		.config(config.gateway);
	builder.run().await
}

// vim: ts=4
