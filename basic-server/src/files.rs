//! Download route for links issued by the filesystem bucket

use std::sync::Arc;

use axum::{
	Router,
	body::Body,
	extract::{Path, Query, State},
	http::{HeaderValue, StatusCode, header},
	response::Response,
	routing::get,
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::info;

use freezer_storage_adapter_fs::{FILES_PATH, FsStorage};
use freezer_types::error::{ClResult, Error};

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
	expires: i64,
	signature: String,
}

/// # GET /files/{*key}?expires=...&signature=...
pub async fn get_file(
	State(storage): State<Arc<FsStorage>>,
	Path(key): Path<String>,
	Query(link): Query<LinkQuery>,
) -> ClResult<Response> {
	let path = storage.verify_signed(&key, link.expires, &link.signature).await?;
	let file = tokio::fs::File::open(&path).await.map_err(|_| Error::NotFound)?;
	let len = file.metadata().await?.len();
	info!("serving {}", key);

	let disposition = match key.rsplit('/').next() {
		Some(name) if name.is_ascii() && !name.contains('"') => {
			format!("attachment; filename=\"{}\"", name)
		}
		_ => "attachment".to_string(),
	};

	Response::builder()
		.status(StatusCode::OK)
		.header(header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
		.header(header::CONTENT_LENGTH, len)
		.header(header::CONTENT_DISPOSITION, disposition)
		.body(Body::from_stream(ReaderStream::new(file)))
		.map_err(|e| Error::Internal(format!("response: {}", e)))
}

pub fn init(storage: Arc<FsStorage>) -> Router {
	Router::new().route(&format!("{}/{{*key}}", FILES_PATH), get(get_file)).with_state(storage)
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::Request;
	use freezer_types::clock::MockClock;
	use freezer_types::storage_adapter::StorageAdapter;
	use freezer_types::types::Timestamp;
	use http_body_util::BodyExt;
	use std::time::Duration;
	use tempfile::TempDir;
	use tower::ServiceExt;

	async fn setup() -> (Router, Arc<FsStorage>, MockClock, TempDir) {
		let dir = TempDir::new().expect("Failed to create temp directory");
		tokio::fs::write(dir.path().join("hello.txt"), b"hello world")
			.await
			.expect("Failed to write file");
		let clock = MockClock::new(Timestamp(1_700_000_000));
		let storage = Arc::new(
			FsStorage::new(dir.path().into(), "http://localhost", b"k", Arc::new(clock.clone()))
				.await
				.expect("Failed to create storage"),
		);
		(init(storage.clone()), storage, clock, dir)
	}

	fn path_of(url: &str) -> String {
		url.strip_prefix("http://localhost").expect("Unexpected link prefix").to_string()
	}

	#[tokio::test]
	async fn test_download() {
		let (router, storage, _clock, _dir) = setup().await;
		let url = storage.signed_url("hello.txt", Duration::from_secs(300)).await.expect("Failed to sign");

		let req = Request::get(path_of(&url)).body(Body::empty()).expect("Failed to build request");
		let res = router.oneshot(req).await.expect("Request failed");
		assert_eq!(res.status(), StatusCode::OK);
		assert_eq!(
			res.headers().get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
			Some("attachment; filename=\"hello.txt\"")
		);
		let body = res.into_body().collect().await.expect("Failed to read body").to_bytes();
		assert_eq!(&body[..], b"hello world");
	}

	#[tokio::test]
	async fn test_expired_link() {
		let (router, storage, clock, _dir) = setup().await;
		let url = storage.signed_url("hello.txt", Duration::from_secs(300)).await.expect("Failed to sign");
		clock.advance(300);

		let req = Request::get(path_of(&url)).body(Body::empty()).expect("Failed to build request");
		let res = router.oneshot(req).await.expect("Request failed");
		assert_eq!(res.status(), StatusCode::FORBIDDEN);
	}

	#[tokio::test]
	async fn test_missing_signature() {
		let (router, _storage, _clock, _dir) = setup().await;
		let req = Request::get("/files/hello.txt").body(Body::empty()).expect("Failed to build request");
		let res = router.oneshot(req).await.expect("Request failed");
		assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	}
}

// vim: ts=4
