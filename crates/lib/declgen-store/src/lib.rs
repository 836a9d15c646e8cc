//! Declaration records and schema helpers for declgen.
//!
//! This crate defines the canonical data model shared by the enum listing
//! parser, the documentation page scanner, and the declaration formatter.

pub mod models;
pub mod schema;

pub use models::*;
