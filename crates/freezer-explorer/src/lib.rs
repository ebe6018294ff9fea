//! Explorer API.
//!
//! Both endpoints sit behind the access gateway and only then call into the
//! storage adapter.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;

mod prelude;

use freezer_core::config::{RESOURCE_LISTING, RESOURCE_SIGNED_URL};
use freezer_core::extract::ProtectedResource;

/// Bucket listing
#[derive(Debug)]
pub struct Listing;

impl ProtectedResource for Listing {
	const NAME: &'static str = RESOURCE_LISTING;
}

/// Download link issuance
#[derive(Debug)]
pub struct SignedUrl;

impl ProtectedResource for SignedUrl {
	const NAME: &'static str = RESOURCE_SIGNED_URL;
}

// vim: ts=4
