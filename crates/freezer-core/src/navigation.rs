//! Navigation guard
//!
//! Page routes are split into three classes. Depending on whether the visitor
//! holds a valid session, a page is either served or redirected:
//!
//! | class    | session | action               |
//! |----------|---------|----------------------|
//! | landing  | yes     | redirect to explorer |
//! | landing  | no      | pass                 |
//! | explorer | yes     | pass                 |
//! | explorer | no      | redirect to login    |
//! | login    | yes     | redirect to explorer |
//! | login    | no      | pass                 |
//! | other    | any     | pass                 |

use axum::{
	body::Body,
	extract::State,
	http::Request,
	middleware::Next,
	response::{IntoResponse, Redirect, Response},
};

use crate::prelude::*;
use crate::session::token_from_headers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPaths {
	pub landing: Box<str>,
	pub login: Box<str>,
	pub explorer: Box<str>,
}

impl Default for NavigationPaths {
	fn default() -> Self {
		Self { landing: "/".into(), login: "/login".into(), explorer: "/s3-explorer".into() }
	}
}

impl NavigationPaths {
	pub fn classify(&self, path: &str) -> PathClass {
		let path = match path.trim_end_matches('/') {
			"" => "/",
			trimmed => trimmed,
		};
		if path == &*self.landing {
			PathClass::Landing
		} else if path == &*self.login {
			PathClass::Login
		} else if path == &*self.explorer {
			PathClass::Explorer
		} else {
			PathClass::Other
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
	Landing,
	Login,
	Explorer,
	Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
	Pass,
	RedirectToExplorer,
	RedirectToLogin,
}

pub fn navigate(class: PathClass, session_valid: bool) -> NavAction {
	match (class, session_valid) {
		(PathClass::Landing | PathClass::Login, true) => NavAction::RedirectToExplorer,
		(PathClass::Explorer, false) => NavAction::RedirectToLogin,
		_ => NavAction::Pass,
	}
}

/// Middleware applying [`navigate`] to page requests
pub async fn navigation_guard(State(app): State<App>, req: Request<Body>, next: Next) -> Response {
	let paths = &app.config.navigation;
	let class = paths.classify(req.uri().path());
	if class == PathClass::Other {
		return next.run(req).await;
	}

	let session_valid = app.tokens.is_valid(token_from_headers(req.headers()));
	match navigate(class, session_valid) {
		NavAction::Pass => next.run(req).await,
		NavAction::RedirectToExplorer => {
			debug!("NAV {} -> {}", req.uri().path(), paths.explorer);
			Redirect::temporary(&paths.explorer).into_response()
		}
		NavAction::RedirectToLogin => {
			debug!("NAV {} -> {}", req.uri().path(), paths.login);
			Redirect::temporary(&paths.login).into_response()
		}
	}
}


// vim: ts=4
