//! Custom extractors for Freezer-specific data

use std::marker::PhantomData;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

use crate::gateway::GateRequest;
use crate::prelude::*;
use crate::rate_limit::{ClientIdentity, extract_client_identity};

/// A resource protected by the access gateway
pub trait ProtectedResource: Send + Sync + 'static {
	/// Resource name, also the rate limit namespace
	const NAME: &'static str;
}

fn peer_addr(parts: &Parts) -> Option<IpAddr> {
	parts.extensions.get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip())
}

// Authorized //
//************//
/// Runs the access gateway for `R`; rejects with the gateway's error otherwise
#[derive(Debug)]
pub struct Authorized<R> {
	pub subject: Box<str>,
	_resource: PhantomData<fn() -> R>,
}

impl<R: ProtectedResource> FromRequestParts<App> for Authorized<R> {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
		let req = GateRequest {
			method: &parts.method,
			path: parts.uri.path(),
			headers: &parts.headers,
			peer: peer_addr(parts),
		};
		let subject = app.gateway.evaluate(R::NAME, &req).await.into_result()?;
		Ok(Authorized { subject, _resource: PhantomData })
	}
}

// ClientAddr //
//************//
/// Resolved client identity, `None` if it cannot be determined
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub Option<ClientIdentity>);

impl FromRequestParts<App> for ClientAddr {
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, app: &App) -> Result<Self, Self::Rejection> {
		Ok(ClientAddr(extract_client_identity(&parts.headers, peer_addr(parts), app.opts.mode)))
	}
}

// vim: ts=4
