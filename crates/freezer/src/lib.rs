//! Freezer is a small browser-based explorer for an object storage bucket.
//!
//! # Features
//!
//! - Single shared login, stateless HS256 session tokens in an HTTP-only cookie
//! - Bucket listing and short-lived download links
//! - Two-tier fixed-window rate limiting (per client and global) over a shared
//!   counter store, failing open when the store is unavailable
//! - Navigation guard redirecting page requests based on the session

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

// Re-export shared types and adapter traits from freezer-types
pub use freezer_types::clock;
pub use freezer_types::counter_adapter;
pub use freezer_types::error;
pub use freezer_types::storage_adapter;
pub use freezer_types::types;

// Feature crate re-exports
pub use freezer_auth as auth;
pub use freezer_core::config;
pub use freezer_core::rate_limit;
pub use freezer_explorer as explorer;

// Local modules
pub mod app;
pub mod prelude;
pub mod routes;
pub mod webserver;

pub use crate::app::{App, AppBuilder, ServerMode};

// vim: ts=4
