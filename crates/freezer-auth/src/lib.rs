//! Login for Freezer.
//!
//! A single shared username/password pair protects the explorer. A successful
//! login returns a session token both in the body and as an HTTP-only cookie.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;

mod prelude;

// vim: ts=4
