//! Error type shared by every Freezer crate.
//!
//! Client-visible failures are always rendered as `{success: false, message}`
//! with a fixed, generic message per variant. Internal details (store errors,
//! I/O errors, storage backend messages) are logged, never returned.

use axum::{
	Json,
	extract::rejection::JsonRejection,
	http::{HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::prelude::*;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	// Client errors
	/// Missing, malformed, expired or forged session token
	Unauthenticated,
	/// Login attempted with credentials that do not match
	InvalidCredentials,
	/// No usable client identity could be derived from the request
	IdentityUnresolved,
	/// Per-client quota exhausted
	RateLimited { retry_after: u64 },
	/// Global quota for a resource exhausted
	ServiceSaturated { retry_after: u64 },
	ValidationError(String),
	NotFound,
	PermissionDenied,

	// Server errors
	/// Missing or invalid configuration. Fatal at startup.
	ConfigError(String),
	StorageError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

/// Failure body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	pub success: bool,
	pub message: String,
}

impl Error {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::Unauthenticated | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
			Error::IdentityUnresolved | Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
			Error::ServiceSaturated { .. } => StatusCode::SERVICE_UNAVAILABLE,
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::ConfigError(_) | Error::StorageError(_) | Error::Internal(_) | Error::Io(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	/// Message safe to show to the client
	pub fn public_message(&self) -> String {
		match self {
			Error::Unauthenticated => "Unauthorized".into(),
			Error::InvalidCredentials => "Invalid credentials".into(),
			Error::IdentityUnresolved => "Unable to determine IP address.".into(),
			Error::RateLimited { .. } => "Too many requests. Please try again later.".into(),
			Error::ServiceSaturated { .. } => {
				"Service is busy. Please try again later.".into()
			}
			Error::ValidationError(msg) => msg.clone(),
			Error::NotFound => "Not found".into(),
			Error::PermissionDenied => "Permission denied".into(),
			Error::ConfigError(_) => "Server misconfiguration".into(),
			Error::StorageError(_) | Error::Internal(_) | Error::Io(_) => "Server Error".into(),
		}
	}

	/// Suggested client backoff in seconds, if any
	pub fn retry_after(&self) -> Option<u64> {
		match self {
			Error::RateLimited { retry_after } | Error::ServiceSaturated { retry_after } => {
				Some(*retry_after)
			}
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<jsonwebtoken::errors::Error> for Error {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		Self::Internal(format!("jwt: {}", err))
	}
}

impl From<JsonRejection> for Error {
	fn from(err: JsonRejection) -> Self {
		debug!("rejected request body: {}", err.body_text());
		Self::ValidationError("Invalid request body".into())
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Internal(format!("json: {}", err))
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::RateLimited { retry_after } => {
				write!(f, "rate limited, retry after {}s", retry_after)
			}
			Error::ServiceSaturated { retry_after } => {
				write!(f, "service saturated, retry after {}s", retry_after)
			}
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::StorageError(msg) => write!(f, "storage error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			_ => write!(f, "{:?}", self),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			warn!("ERROR {}: {}", status, self);
		} else {
			debug!("{}: {}", status, self);
		}

		let body = ErrorBody { success: false, message: self.public_message() };
		let mut response = (status, Json(body)).into_response();

		if let Some(retry_after) = self.retry_after()
			&& let Ok(val) = HeaderValue::from_str(&retry_after.to_string())
		{
			response.headers_mut().insert(header::RETRY_AFTER, val);
		}

		response
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(Error::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(Error::IdentityUnresolved.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			Error::RateLimited { retry_after: 5 }.status_code(),
			StatusCode::TOO_MANY_REQUESTS
		);
		assert_eq!(
			Error::ServiceSaturated { retry_after: 60 }.status_code(),
			StatusCode::SERVICE_UNAVAILABLE
		);
		assert_eq!(
			Error::ConfigError("x".into()).status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn test_internal_text_not_leaked() {
		let err = Error::StorageError("bucket arn:aws:s3:::secret-bucket denied".into());
		assert_eq!(err.public_message(), "Server Error");
	}

	#[test]
	fn test_retry_after_header() {
		let response = Error::RateLimited { retry_after: 5 }.into_response();
		assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
		assert_eq!(
			response.headers().get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
			Some("5")
		);

		let response = Error::Unauthenticated.into_response();
		assert!(response.headers().get(header::RETRY_AFTER).is_none());
	}

	#[test]
	fn test_json_rejection_is_generic() {
		let rejection = JsonRejection::from(axum::extract::rejection::MissingJsonContentType::default());
		let err = Error::from(rejection);
		assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(err.public_message(), "Invalid request body");
	}
}

// vim: ts=4
