//! Client identity extraction
//!
//! The per-client limiter keys on the client address. Behind the CDN/reverse
//! proxy the address comes from forwarding headers; a header only counts if it
//! parses as an IP address.

use std::fmt;
use std::net::IpAddr;

use axum::http::HeaderMap;

use crate::app::ServerMode;

/// Address of the client a request is attributed to
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ClientIdentity(pub IpAddr);

impl fmt::Display for ClientIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Resolve the client identity of a request
///
/// - Both modes: `cf-connecting-ip`, then the first `x-forwarded-for` entry
/// - Standalone mode: falls back to the TCP peer address
/// - Proxy mode: no usable header means unresolved, the peer is the proxy
pub fn extract_client_identity(
	headers: &HeaderMap,
	peer: Option<IpAddr>,
	mode: ServerMode,
) -> Option<ClientIdentity> {
	let from_headers = extract_from_cf_connecting_ip(headers).or_else(|| extract_from_xff(headers));
	let addr = match mode {
		ServerMode::Standalone => from_headers.or(peer),
		ServerMode::Proxy => from_headers,
	};
	addr.map(ClientIdentity)
}

/// Extract IP from the Cloudflare client address header
fn extract_from_cf_connecting_ip(headers: &HeaderMap) -> Option<IpAddr> {
	headers
		.get("cf-connecting-ip")
		.and_then(|h| h.to_str().ok())
		.and_then(|s| s.trim().parse().ok())
}

/// Extract IP from X-Forwarded-For header
fn extract_from_xff(headers: &HeaderMap) -> Option<IpAddr> {
	headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()).and_then(|s| {
		// "client, proxy1, proxy2": the leftmost entry is the original client
		s.split(',').next().map(|ip| ip.trim()).and_then(|ip| ip.parse().ok())
	})
}


// vim: ts=4
