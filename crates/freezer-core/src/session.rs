//! Session tokens
//!
//! Stateless HS256 JWTs with `sub`, `iat` and `exp` claims. Nothing is stored
//! server-side; a token is valid until it expires. Expiry is checked against
//! the injected [`Clock`], not against the JWT library's own clock.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use freezer_types::clock::Clock;

use crate::prelude::*;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
	sub: Box<str>,
	iat: i64,
	exp: i64,
}

/// Result of token verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCheck {
	Valid(Box<str>),
	Invalid,
}

#[derive(Debug)]
enum InvalidReason {
	Malformed,
	BadSignature,
	Expired,
}

pub struct SessionTokenService {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	lifetime_secs: i64,
	clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionTokenService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SessionTokenService")
			.field("lifetime_secs", &self.lifetime_secs)
			.field("clock", &self.clock)
			.finish_non_exhaustive()
	}
}

impl SessionTokenService {
	pub fn new(secret: &str, lifetime_secs: i64, clock: Arc<dyn Clock>) -> ClResult<Self> {
		if secret.trim().is_empty() {
			return Err(Error::ConfigError("token signing secret is empty".into()));
		}
		if lifetime_secs <= 0 {
			return Err(Error::ConfigError("token lifetime must be positive".into()));
		}

		let mut validation = Validation::new(Algorithm::HS256);
		validation.validate_exp = false;
		validation.leeway = 0;
		validation.set_required_spec_claims(&["exp", "iat", "sub"]);

		Ok(Self {
			encoding_key: EncodingKey::from_secret(secret.as_bytes()),
			decoding_key: DecodingKey::from_secret(secret.as_bytes()),
			validation,
			lifetime_secs,
			clock,
		})
	}

	pub fn lifetime_secs(&self) -> i64 {
		self.lifetime_secs
	}

	pub fn issue(&self, subject: &str) -> ClResult<Box<str>> {
		let now = self.clock.now();
		let claims = SessionClaims {
			sub: subject.into(),
			iat: now.0,
			exp: now.add_seconds(self.lifetime_secs).0,
		};
		let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
		Ok(token.into())
	}

	pub fn verify(&self, token: &str) -> TokenCheck {
		match self.decode(token) {
			Ok(subject) => TokenCheck::Valid(subject),
			Err(reason) => {
				debug!(?reason, "session token rejected");
				TokenCheck::Invalid
			}
		}
	}

	/// Convenience for callers that only need a yes/no, e.g. the navigation guard
	pub fn is_valid(&self, token: Option<&str>) -> bool {
		token.is_some_and(|t| matches!(self.verify(t), TokenCheck::Valid(_)))
	}

	fn decode(&self, token: &str) -> Result<Box<str>, InvalidReason> {
		let data =
			jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
				.map_err(|err| match err.kind() {
					jsonwebtoken::errors::ErrorKind::InvalidSignature => InvalidReason::BadSignature,
					_ => InvalidReason::Malformed,
				})?;
		if self.clock.now().0 >= data.claims.exp {
			return Err(InvalidReason::Expired);
		}
		Ok(data.claims.sub)
	}
}

/// Token from the `token` cookie, or else from `Authorization: Bearer`
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
	token_from_cookie(headers).or_else(|| token_from_bearer(headers))
}

fn token_from_cookie(headers: &HeaderMap) -> Option<&str> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|h| h.to_str().ok())
		.flat_map(|s| s.split(';'))
		.find_map(|pair| match pair.trim().split_once('=') {
			Some((name, value)) if name == SESSION_COOKIE && !value.is_empty() => Some(value),
			_ => None,
		})
}

fn token_from_bearer(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|t| !t.is_empty())
}


// vim: ts=4
