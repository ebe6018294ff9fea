//! Access gateway
//!
//! Runs the per-request checks for the protected API resources, strictly in
//! this order and stopping at the first failure:
//!
//! 1. the resource is one the gateway knows about
//! 2. a valid session token is present
//! 3. the client identity resolves
//! 4. the resource's global limit has room
//! 5. the client's limit for the resource has room
//!
//! Authentication comes first so unauthenticated traffic never consumes quota.
//! Quota consumed by a later rejection is not refunded.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, Method};

use freezer_types::clock::Clock;

use crate::app::ServerMode;
use crate::config::GatewayConfig;
use crate::prelude::*;
use crate::rate_limit::{
	ClientIdentity, ClientRateLimiter, GlobalRateLimiter, RateDecision, extract_client_identity,
};
use crate::session::{SessionTokenService, TokenCheck, token_from_headers};

/// The parts of a request the gateway looks at
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
	pub method: &'a Method,
	pub path: &'a str,
	pub headers: &'a HeaderMap,
	/// TCP peer address, if known
	pub peer: Option<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	Authorized(Box<str>),
	Unauthenticated,
	ClientThrottled { retry_after: u64 },
	GloballyThrottled { retry_after: u64 },
	IdentityUnresolved,
	Misconfigured,
}

impl Decision {
	/// Subject on success, the matching client error otherwise
	pub fn into_result(self) -> ClResult<Box<str>> {
		match self {
			Decision::Authorized(subject) => Ok(subject),
			Decision::Unauthenticated => Err(Error::Unauthenticated),
			Decision::ClientThrottled { retry_after } => Err(Error::RateLimited { retry_after }),
			Decision::GloballyThrottled { retry_after } => {
				Err(Error::ServiceSaturated { retry_after })
			}
			Decision::IdentityUnresolved => Err(Error::IdentityUnresolved),
			Decision::Misconfigured => {
				Err(Error::ConfigError("resource is not configured in the gateway".into()))
			}
		}
	}

	pub fn is_authorized(&self) -> bool {
		matches!(self, Decision::Authorized(_))
	}
}

impl fmt::Display for Decision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Decision::Authorized(_) => f.write_str("authorized"),
			Decision::Unauthenticated => f.write_str("unauthenticated"),
			Decision::ClientThrottled { retry_after } => {
				write!(f, "client_throttled({}s)", retry_after)
			}
			Decision::GloballyThrottled { retry_after } => {
				write!(f, "globally_throttled({}s)", retry_after)
			}
			Decision::IdentityUnresolved => f.write_str("identity_unresolved"),
			Decision::Misconfigured => f.write_str("misconfigured"),
		}
	}
}

#[derive(Debug)]
pub struct AccessGateway {
	config: Arc<GatewayConfig>,
	tokens: Arc<SessionTokenService>,
	client: ClientRateLimiter,
	global: GlobalRateLimiter,
	clock: Arc<dyn Clock>,
	mode: ServerMode,
}

impl AccessGateway {
	pub fn new(
		config: Arc<GatewayConfig>,
		tokens: Arc<SessionTokenService>,
		client: ClientRateLimiter,
		global: GlobalRateLimiter,
		clock: Arc<dyn Clock>,
		mode: ServerMode,
	) -> Self {
		Self { config, tokens, client, global, clock, mode }
	}

	/// Decides one request against `resource` and records an audit event
	pub async fn evaluate(&self, resource: &str, req: &GateRequest<'_>) -> Decision {
		let identity = extract_client_identity(req.headers, req.peer, self.mode);
		let decision = self.decide(resource, req.headers, identity.as_ref()).await;

		info!(
			target: "freezer::audit",
			ts = %self.clock.now(),
			method = %req.method,
			path = %req.path,
			identity = %identity.map_or_else(|| "-".to_string(), |i| i.to_string()),
			resource = %resource,
			decision = %decision,
			"gateway decision"
		);
		decision
	}

	async fn decide(
		&self,
		resource: &str,
		headers: &HeaderMap,
		identity: Option<&ClientIdentity>,
	) -> Decision {
		if !self.config.has_resource(resource) {
			error!("gateway called for unknown resource {:?}", resource);
			return Decision::Misconfigured;
		}

		let subject = match token_from_headers(headers).map(|t| self.tokens.verify(t)) {
			Some(TokenCheck::Valid(subject)) => subject,
			Some(TokenCheck::Invalid) | None => return Decision::Unauthenticated,
		};

		let Some(identity) = identity else {
			return Decision::IdentityUnresolved;
		};

		if let RateDecision::Denied { retry_after } = self.global.check(resource).await {
			return Decision::GloballyThrottled { retry_after };
		}

		if let RateDecision::Denied { retry_after } =
			self.client.check(resource, identity, self.config.client_limit).await
		{
			return Decision::ClientThrottled { retry_after };
		}

		Decision::Authorized(subject)
	}
}


// vim: ts=4
