//! App state type

use std::path::Path;
use std::sync::Arc;

use freezer_types::clock::Clock;
use freezer_types::counter_adapter::CounterAdapter;
use freezer_types::storage_adapter::StorageAdapter;

use crate::config::GatewayConfig;
use crate::gateway::AccessGateway;
use crate::prelude::*;
use crate::rate_limit::{ClientRateLimiter, FixedWindowLimiter, GlobalRateLimiter};
use crate::session::SessionTokenService;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerMode {
	/// Directly exposed, the TCP peer is the client
	Standalone,
	/// Behind a CDN or reverse proxy, only forwarding headers identify the client
	#[default]
	Proxy,
}

#[derive(Debug)]
pub struct AppBuilderOpts {
	pub mode: ServerMode,
	pub listen: Box<str>,
	pub dist_dir: Box<Path>,
	/// Add `Secure` to the session cookie
	pub secure_cookies: bool,
}

#[derive(Debug)]
pub struct AppState {
	pub opts: AppBuilderOpts,
	pub config: Arc<GatewayConfig>,
	pub clock: Arc<dyn Clock>,
	pub tokens: Arc<SessionTokenService>,
	pub rate_limiter: ClientRateLimiter,
	pub gateway: AccessGateway,

	pub storage_adapter: Arc<dyn StorageAdapter>,
}

pub type App = Arc<AppState>;

impl AppState {
	/// Wires the gating components over the given adapters
	pub fn new(
		opts: AppBuilderOpts,
		config: GatewayConfig,
		counter_adapter: Arc<dyn CounterAdapter>,
		storage_adapter: Arc<dyn StorageAdapter>,
		clock: Arc<dyn Clock>,
	) -> ClResult<App> {
		let config = Arc::new(config);
		let tokens = Arc::new(SessionTokenService::new(
			config.signing_secret.expose(),
			config.token_lifetime_secs,
			clock.clone(),
		)?);

		let limiter = FixedWindowLimiter::new(counter_adapter, config.store_timeout);
		let rate_limiter = ClientRateLimiter::new(limiter.clone());
		let global = GlobalRateLimiter::new(limiter, config.global_limit);
		let gateway = AccessGateway::new(
			config.clone(),
			tokens.clone(),
			rate_limiter.clone(),
			global,
			clock.clone(),
			opts.mode,
		);

		Ok(Arc::new(AppState {
			opts,
			config,
			clock,
			tokens,
			rate_limiter,
			gateway,
			storage_adapter,
		}))
	}
}

// vim: ts=4
