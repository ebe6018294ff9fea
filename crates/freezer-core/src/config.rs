//! Gateway configuration
//!
//! Built once at startup and shared read-only (`Arc<GatewayConfig>`) by every
//! component. Nothing below this module reads the environment.

use std::time::Duration;

use crate::navigation::NavigationPaths;
use crate::prelude::*;
use crate::rate_limit::WindowLimit;

/// Resource name of the bucket listing operation
pub const RESOURCE_LISTING: &str = "s3";
/// Resource name of the signed-URL issuance operation
pub const RESOURCE_SIGNED_URL: &str = "s3url";
/// Namespace used to throttle login attempts per client
pub const NAMESPACE_LOGIN: &str = "login";

/// A string that never shows up in debug output
#[derive(Clone)]
pub struct Secret(Box<str>);

impl Secret {
	pub fn new(value: impl Into<Box<str>>) -> Self {
		Self(value.into())
	}

	pub fn expose(&self) -> &str {
		&self.0
	}

	pub fn is_blank(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl std::fmt::Debug for Secret {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("Secret(***)")
	}
}

/// The single shared login
#[derive(Clone, Debug)]
pub struct Credentials {
	pub username: Box<str>,
	pub password: Secret,
}

impl Credentials {
	pub fn new(username: impl Into<Box<str>>, password: impl Into<Box<str>>) -> Self {
		Self { username: username.into(), password: Secret::new(password) }
	}
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
	/// HMAC key for session tokens
	pub signing_secret: Secret,
	/// Shared login. `None` only in partially configured deployments, where
	/// `validate()` refuses to start the server.
	pub credentials: Option<Credentials>,
	/// Per-client allowance on protected resources
	pub client_limit: WindowLimit,
	/// Per-client allowance on login attempts
	pub login_limit: WindowLimit,
	/// Allowance per resource shared by all clients
	pub global_limit: WindowLimit,
	/// Resource names the gateway accepts
	pub resources: Box<[Box<str>]>,
	/// Session token lifetime in seconds
	pub token_lifetime_secs: i64,
	/// Upper bound for a single counter store round trip
	pub store_timeout: Duration,
	/// Lifetime of issued download links
	pub signed_url_ttl: Duration,
	pub navigation: NavigationPaths,
}

impl GatewayConfig {
	pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 5 * 3600;

	pub fn new(signing_secret: impl Into<Box<str>>) -> Self {
		Self {
			signing_secret: Secret::new(signing_secret),
			credentials: None,
			client_limit: WindowLimit::new(20, 5),
			login_limit: WindowLimit::new(20, 5),
			global_limit: WindowLimit::new(1000, 60),
			resources: vec![RESOURCE_LISTING.into(), RESOURCE_SIGNED_URL.into()].into(),
			token_lifetime_secs: Self::DEFAULT_TOKEN_LIFETIME_SECS,
			store_timeout: Duration::from_millis(500),
			signed_url_ttl: Duration::from_secs(5 * 60),
			navigation: NavigationPaths::default(),
		}
	}

	pub fn with_credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = Some(credentials);
		self
	}

	/// Checks everything that must hold before the server may start
	pub fn validate(&self) -> ClResult<()> {
		if self.signing_secret.is_blank() {
			return Err(Error::ConfigError("signing secret is not set or is empty".into()));
		}
		match &self.credentials {
			Some(c) if !c.username.trim().is_empty() && !c.password.is_blank() => {}
			_ => return Err(Error::ConfigError("login credentials are not configured".into())),
		}
		if self.token_lifetime_secs <= 0 {
			return Err(Error::ConfigError("token lifetime must be positive".into()));
		}
		Ok(())
	}

	pub fn has_resource(&self, resource: &str) -> bool {
		self.resources.iter().any(|r| r.as_ref() == resource)
	}
}


// vim: ts=4
