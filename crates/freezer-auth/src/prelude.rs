pub use freezer_core::prelude::*;

// vim: ts=4
