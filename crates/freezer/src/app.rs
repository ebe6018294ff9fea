//! App builder - constructs and runs the Freezer application

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;

use crate::prelude::*;
use crate::{routes, webserver};
pub use freezer_core::app::{App, AppBuilderOpts, AppState, ServerMode, VERSION};
use freezer_core::config::GatewayConfig;
use freezer_types::clock::{Clock, SystemClock};
use freezer_types::counter_adapter::CounterAdapter;
use freezer_types::storage_adapter::StorageAdapter;

pub struct Adapters {
	pub counter_adapter: Option<Arc<dyn CounterAdapter>>,
	pub storage_adapter: Option<Arc<dyn StorageAdapter>>,
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	config: Option<GatewayConfig>,
	adapters: Adapters,
	clock: Option<Arc<dyn Clock>>,
	extra_routes: Vec<Router>,
}

impl AppBuilder {
	pub fn new() -> Self {
		tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.init();
		AppBuilder {
			opts: AppBuilderOpts {
				mode: ServerMode::Proxy,
				listen: "127.0.0.1:3000".into(),
				dist_dir: PathBuf::from("./dist").into(),
				secure_cookies: false,
			},
			config: None,
			adapters: Adapters { counter_adapter: None, storage_adapter: None },
			clock: None,
			extra_routes: Vec::new(),
		}
	}

	// Opts
	pub fn mode(&mut self, mode: ServerMode) -> &mut Self {
		self.opts.mode = mode;
		self
	}
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn dist_dir(&mut self, dist_dir: impl Into<Box<std::path::Path>>) -> &mut Self {
		self.opts.dist_dir = dist_dir.into();
		self
	}
	pub fn secure_cookies(&mut self, secure: bool) -> &mut Self {
		self.opts.secure_cookies = secure;
		self
	}
	pub fn config(&mut self, config: GatewayConfig) -> &mut Self {
		self.config = Some(config);
		self
	}
	pub fn clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
		self.clock = Some(clock);
		self
	}

	// Adapters
	pub fn counter_adapter(&mut self, counter_adapter: Arc<dyn CounterAdapter>) -> &mut Self {
		self.adapters.counter_adapter = Some(counter_adapter);
		self
	}
	pub fn storage_adapter(&mut self, storage_adapter: Arc<dyn StorageAdapter>) -> &mut Self {
		self.adapters.storage_adapter = Some(storage_adapter);
		self
	}

	/// Extra routes served next to the API, outside the navigation guard
	pub fn merge_router(&mut self, router: Router) -> &mut Self {
		self.extra_routes.push(router);
		self
	}

	pub async fn run(self) -> ClResult<()> {
		info!(" _____");
		info!("|  ___| __ ___  ___ _______ _ __");
		info!("| |_ | '__/ _ \\/ _ \\_  / _ \\ '__|");
		info!("|  _|| | |  __/  __// /  __/ |");
		info!("|_|  |_|  \\___|\\___/___\\___|_|");
		info!("V{}", VERSION);
		info!("");

		let Some(config) = self.config else {
			error!("FATAL: No gateway configuration");
			return Err(Error::ConfigError("No gateway configuration".to_string()));
		};
		if let Err(e) = config.validate() {
			error!("FATAL: Invalid configuration: {}", e);
			return Err(e);
		}
		let Some(counter_adapter) = self.adapters.counter_adapter else {
			error!("FATAL: No counter adapter configured");
			return Err(Error::Internal("No counter adapter configured".to_string()));
		};
		let Some(storage_adapter) = self.adapters.storage_adapter else {
			error!("FATAL: No storage adapter configured");
			return Err(Error::Internal("No storage adapter configured".to_string()));
		};
		let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

		info!(
			"Rate limits: client {}/{}s, global {}/{}s, login {}/{}s",
			config.client_limit.limit(),
			config.client_limit.window().as_secs(),
			config.global_limit.limit(),
			config.global_limit.window().as_secs(),
			config.login_limit.limit(),
			config.login_limit.window().as_secs(),
		);
		info!("Mode: {:?}", self.opts.mode);

		let app = AppState::new(self.opts, config, counter_adapter, storage_adapter, clock)?;
		let router = routes::init(app.clone(), self.extra_routes);

		webserver::serve(app, router).await
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
