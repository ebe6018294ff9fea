use axum::{
	Json,
	extract::{Query, State},
	http::StatusCode,
};
use serde::{Deserialize, Serialize};

use freezer_core::extract::Authorized;
use freezer_types::storage_adapter::ObjectInfo;
use freezer_types::types::ApiResponse;

use crate::prelude::*;
use crate::{Listing, SignedUrl};

#[derive(Debug, Serialize)]
pub struct FileList {
	files: Vec<ObjectInfo>,
}

/// # GET /api/s3
pub async fn get_files(
	State(app): State<App>,
	auth: Authorized<Listing>,
) -> ClResult<(StatusCode, Json<ApiResponse<FileList>>)> {
	let files = app.storage_adapter.list_objects().await?;
	debug!("{} listed {} objects", auth.subject, files.len());

	Ok((StatusCode::OK, Json(ApiResponse::new(FileList { files }))))
}

#[derive(Debug, Deserialize)]
pub struct SignedUrlQuery {
	key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignedUrlRes {
	url: Box<str>,
}

/// # GET /api/s3-url?key=...
pub async fn get_signed_url(
	State(app): State<App>,
	auth: Authorized<SignedUrl>,
	Query(query): Query<SignedUrlQuery>,
) -> ClResult<(StatusCode, Json<ApiResponse<SignedUrlRes>>)> {
	let key = query
		.key
		.filter(|k| !k.is_empty())
		.ok_or_else(|| Error::ValidationError("Missing bucket or key".into()))?;

	let url = app.storage_adapter.signed_url(&key, app.config.signed_url_ttl).await?;
	info!("{} requested a link for {}", auth.subject, key);

	Ok((StatusCode::OK, Json(ApiResponse::new(SignedUrlRes { url }))))
}

// vim: ts=4
