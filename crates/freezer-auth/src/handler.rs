use axum::{
	Json,
	extract::{State, rejection::JsonRejection},
	http::{HeaderMap, HeaderValue, StatusCode, header},
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use freezer_core::config::{Credentials, NAMESPACE_LOGIN};
use freezer_core::extract::ClientAddr;
use freezer_core::rate_limit::RateDecision;
use freezer_core::session::SESSION_COOKIE;
use freezer_types::types::ApiResponse;

use crate::prelude::*;

type HmacSha256 = Hmac<Sha256>;

#[derive(Deserialize)]
pub struct LoginReq {
	#[serde(default)]
	username: String,
	#[serde(default)]
	password: String,
}

/// # Login
#[derive(Debug, Serialize)]
pub struct Login {
	message: &'static str,
	token: Box<str>,
}

/// Compares the submitted pair with the configured one in constant time
///
/// Both sides are run through HMAC first so the comparison does not depend on
/// input lengths either.
fn credentials_match(key: &[u8], expected: &Credentials, username: &str, password: &str) -> bool {
	let tag = |user: &str, pass: &str| {
		HmacSha256::new_from_slice(key).ok().map(|mut mac| {
			mac.update(user.as_bytes());
			mac.update(b"\0");
			mac.update(pass.as_bytes());
			mac
		})
	};
	let (Some(submitted), Some(reference)) =
		(tag(username, password), tag(&expected.username, expected.password.expose()))
	else {
		return false;
	};
	submitted.verify_slice(&reference.finalize().into_bytes()).is_ok()
}

fn session_cookie(token: &str, max_age: i64, secure: bool) -> ClResult<HeaderValue> {
	let mut cookie =
		format!("{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}", SESSION_COOKIE, token, max_age);
	if secure {
		cookie.push_str("; Secure");
	}
	HeaderValue::from_str(&cookie).map_err(|_| Error::Internal("invalid cookie value".into()))
}

/// # POST /api/login
pub async fn post_login(
	State(app): State<App>,
	ClientAddr(client): ClientAddr,
	body: Result<Json<LoginReq>, JsonRejection>,
) -> ClResult<(StatusCode, HeaderMap, Json<ApiResponse<Login>>)> {
	let Some(credentials) = app.config.credentials.as_ref() else {
		error!("login attempted but no credentials are configured");
		return Err(Error::ConfigError("missing credentials".into()));
	};

	let client = client.ok_or(Error::IdentityUnresolved)?;

	if let RateDecision::Denied { retry_after } =
		app.rate_limiter.check(NAMESPACE_LOGIN, &client, app.config.login_limit).await
	{
		return Err(Error::RateLimited { retry_after });
	}

	let Json(login) = body?;

	if !credentials_match(
		app.config.signing_secret.expose().as_bytes(),
		credentials,
		&login.username,
		&login.password,
	) {
		info!("login failed from {}", client);
		return Err(Error::InvalidCredentials);
	}

	let token = app.tokens.issue(&login.username)?;
	let mut headers = HeaderMap::new();
	headers.insert(
		header::SET_COOKIE,
		session_cookie(&token, app.tokens.lifetime_secs(), app.opts.secure_cookies)?,
	);
	info!("login succeeded from {}", client);

	Ok((
		StatusCode::OK,
		headers,
		Json(ApiResponse::new(Login { message: "Logged in successfully", token })),
	))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_credentials_match() {
		let expected = Credentials::new("admin", "s3cret");
		assert!(credentials_match(b"key", &expected, "admin", "s3cret"));
		assert!(!credentials_match(b"key", &expected, "admin", "s3cre"));
		assert!(!credentials_match(b"key", &expected, "Admin", "s3cret"));
		assert!(!credentials_match(b"key", &expected, "", ""));
		// The separator keeps "ad"+"mins3cret" from matching "admin"+"s3cret"
		assert!(!credentials_match(b"key", &expected, "ad", "mins3cret"));
	}

	#[test]
	fn test_session_cookie() {
		let cookie = session_cookie("abc", 18_000, false).expect("Failed to build cookie");
		assert_eq!(cookie, "token=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=18000");

		let secure = session_cookie("abc", 18_000, true).expect("Failed to build cookie");
		assert!(secure.to_str().map(|s| s.ends_with("; Secure")).unwrap_or(false));
	}
}

// vim: ts=4
