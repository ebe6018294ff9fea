//! Shared types, adapter traits, and core utilities for Freezer.
//!
//! This crate holds what both the server crates and the adapter crates need:
//! the error type, the clock abstraction and the two adapter traits (counter
//! store and object storage).

#![forbid(unsafe_code)]

pub mod clock;
pub mod counter_adapter;
pub mod error;
pub mod prelude;
pub mod storage_adapter;
pub mod types;

// vim: ts=4
