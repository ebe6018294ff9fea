//! Custom middlewares

use std::net::SocketAddr;

use axum::{
	body::Body,
	extract::{ConnectInfo, State},
	http::Request,
	middleware::Next,
	response::Response,
};

use crate::prelude::*;
use crate::rate_limit::extract_client_identity;

/// Logs one line per request and one per response
pub async fn log_request(State(app): State<App>, req: Request<Body>, next: Next) -> Response {
	let start = std::time::Instant::now();
	let peer = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ci| ci.0.ip());
	let client = extract_client_identity(req.headers(), peer, app.opts.mode)
		.map_or_else(|| "-".to_string(), |c| c.to_string());
	info!("REQ [{}] {} {}", &client, req.method(), req.uri().path());

	let res = next.run(req).await;

	let status = res.status();
	if status.is_client_error() || status.is_server_error() {
		warn!("RES: {} tm:{:?}", &status, start.elapsed().as_millis());
	} else {
		info!("RES: {} tm:{:?}", &status, start.elapsed().as_millis());
	}
	res
}

// vim: ts=4
