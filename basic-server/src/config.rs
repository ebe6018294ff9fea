//! Environment configuration
//!
//! Read once at startup. Lookups go through a closure so tests can supply
//! their own variables.

use std::path::PathBuf;
use std::str::FromStr;

use freezer::config::{Credentials, GatewayConfig};
use freezer::rate_limit::WindowLimit;
use freezer::ServerMode;
use freezer_types::error::{ClResult, Error};

#[derive(Debug)]
pub struct Config {
	pub gateway: GatewayConfig,
	pub mode: ServerMode,
	pub listen: Box<str>,
	pub dist_dir: PathBuf,
	pub storage_dir: PathBuf,
	pub public_base_url: Box<str>,
	pub redis_url: Option<Box<str>>,
	pub secure_cookies: bool,
}

fn non_empty(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
	var(name).filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(
	var: &impl Fn(&str) -> Option<String>,
	name: &str,
	default: T,
) -> ClResult<T> {
	match non_empty(var, name) {
		Some(v) => v
			.trim()
			.parse()
			.map_err(|_| Error::ConfigError(format!("{} is not a valid number: {:?}", name, v))),
		None => Ok(default),
	}
}

fn parse_bool(v: &str) -> bool {
	matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub fn load_config(var: impl Fn(&str) -> Option<String>) -> ClResult<Config> {
	let Some(secret) = non_empty(&var, "JWT_SECRET") else {
		return Err(Error::ConfigError("JWT_SECRET environment variable is not set".into()));
	};

	let mut gateway = GatewayConfig::new(secret);
	if let (Some(username), Some(password)) =
		(non_empty(&var, "USER_USERNAME"), non_empty(&var, "USER_PASSWORD"))
	{
		gateway = gateway.with_credentials(Credentials::new(username, password));
	}

	let client_limit = parse_or(&var, "CLIENT_RATE_LIMIT", gateway.client_limit.limit())?;
	let client_window = parse_or(&var, "CLIENT_WINDOW_SEC", gateway.client_limit.window().as_secs())?;
	gateway.client_limit = WindowLimit::new(client_limit, client_window);

	let global_limit = parse_or(&var, "S3_GLOBAL_RATE_LIMIT", gateway.global_limit.limit())?;
	let global_window =
		parse_or(&var, "S3_GLOBAL_WINDOW_SEC", gateway.global_limit.window().as_secs())?;
	gateway.global_limit = WindowLimit::new(global_limit, global_window);

	let mode = match non_empty(&var, "MODE").as_deref().map(str::trim) {
		None | Some("proxy") => ServerMode::Proxy,
		Some("standalone") => ServerMode::Standalone,
		Some(other) => {
			return Err(Error::ConfigError(format!(
				"MODE must be \"proxy\" or \"standalone\", got {:?}",
				other
			)));
		}
	};

	let listen = non_empty(&var, "LISTEN").unwrap_or_else(|| "127.0.0.1:3000".to_string());
	Ok(Config {
		gateway,
		mode,
		public_base_url: non_empty(&var, "PUBLIC_BASE_URL")
			.unwrap_or_else(|| format!("http://{}", listen))
			.into(),
		listen: listen.into(),
		dist_dir: PathBuf::from(non_empty(&var, "DIST_DIR").unwrap_or_else(|| "./dist".to_string())),
		storage_dir: PathBuf::from(
			non_empty(&var, "STORAGE_DIR").unwrap_or_else(|| "./data/bucket".to_string()),
		),
		redis_url: non_empty(&var, "REDIS_URL").map(Into::into),
		secure_cookies: non_empty(&var, "SECURE_COOKIES").is_some_and(|v| parse_bool(&v)),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::time::Duration;

	fn load(vars: &[(&str, &str)]) -> ClResult<Config> {
		let map: HashMap<String, String> =
			vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		load_config(|name| map.get(name).cloned())
	}

	#[test]
	fn test_defaults() {
		let config = load(&[("JWT_SECRET", "s")]).expect("Failed to load config");
		assert_eq!(config.gateway.client_limit, WindowLimit::new(20, 5));
		assert_eq!(config.gateway.global_limit, WindowLimit::new(1000, 60));
		assert_eq!(config.mode, ServerMode::Proxy);
		assert!(config.redis_url.is_none());
		assert!(config.gateway.credentials.is_none());
		assert!(!config.secure_cookies);
		assert_eq!(&*config.public_base_url, "http://127.0.0.1:3000");
	}

	#[test]
	fn test_overrides() {
		let config = load(&[
			("JWT_SECRET", "s"),
			("USER_USERNAME", "admin"),
			("USER_PASSWORD", "pw"),
			("CLIENT_RATE_LIMIT", "7"),
			("CLIENT_WINDOW_SEC", "10"),
			("S3_GLOBAL_RATE_LIMIT", "50"),
			("S3_GLOBAL_WINDOW_SEC", "30"),
			("MODE", "standalone"),
			("REDIS_URL", "redis://cache:6379/"),
			("SECURE_COOKIES", "true"),
			("PUBLIC_BASE_URL", "https://freezer.example.com"),
		])
		.expect("Failed to load config");

		assert_eq!(config.gateway.client_limit.limit(), 7);
		assert_eq!(config.gateway.client_limit.window(), Duration::from_secs(10));
		assert_eq!(config.gateway.global_limit.limit(), 50);
		assert_eq!(config.gateway.global_limit.window(), Duration::from_secs(30));
		assert_eq!(config.mode, ServerMode::Standalone);
		assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379/"));
		assert!(config.secure_cookies);
		assert!(config.gateway.validate().is_ok());
	}

	#[test]
	fn test_missing_or_empty_secret() {
		assert!(matches!(load(&[]), Err(Error::ConfigError(_))));
		assert!(matches!(load(&[("JWT_SECRET", "  ")]), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_invalid_values() {
		assert!(matches!(
			load(&[("JWT_SECRET", "s"), ("S3_GLOBAL_RATE_LIMIT", "lots")]),
			Err(Error::ConfigError(_))
		));
		assert!(matches!(
			load(&[("JWT_SECRET", "s"), ("MODE", "mirror")]),
			Err(Error::ConfigError(_))
		));
	}
}

// vim: ts=4
