use axum::{
	Router,
	http::{HeaderValue, header},
	middleware,
	routing::{get, post},
};
use tower_http::{
	services::{ServeDir, ServeFile},
	set_header::SetResponseHeaderLayer,
};

use crate::prelude::*;
use crate::{auth, explorer};
use freezer_core::middleware::log_request;
use freezer_core::navigation::navigation_guard;

async fn api_not_found() -> Error {
	Error::NotFound
}

fn init_api() -> Router<App> {
	Router::new()
		.route("/login", post(auth::handler::post_login))
		.route("/s3", get(explorer::handler::get_files))
		.route("/s3-url", get(explorer::handler::get_signed_url))
		.fallback(api_not_found)
}

fn init_pages(app: &App) -> Router<App> {
	let dist_dir = &app.opts.dist_dir;
	let pages = ServeDir::new(dist_dir)
		.append_index_html_on_directories(true)
		.fallback(ServeFile::new(dist_dir.join("index.html")));

	Router::new()
		.fallback_service(pages)
		.layer(middleware::from_fn_with_state(app.clone(), navigation_guard))
		.layer(SetResponseHeaderLayer::overriding(
			header::CACHE_CONTROL,
			HeaderValue::from_static("no-store"),
		))
}

/// Builds the full router. `extra` routers sit outside the navigation guard
/// but share the request log.
pub fn init(app: App, extra: impl IntoIterator<Item = Router>) -> Router {
	let router = Router::new()
		.nest("/api", init_api())
		.merge(init_pages(&app))
		.with_state(app.clone());

	extra
		.into_iter()
		.fold(router, Router::merge)
		.layer(middleware::from_fn_with_state(app, log_request))
}

// vim: ts=4
