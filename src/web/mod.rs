//! HTTP API for SchemaLens.
//!
//! Exposes discovery, the built-in sample schema, connection profile CRUD
//! and the export directory.

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod sample;
#[cfg(feature = "server")]
mod server;

#[cfg(feature = "server")]
pub use handlers::ApiError;
#[cfg(feature = "server")]
pub use sample::sample_schema;
#[cfg(feature = "server")]
pub use server::*;
