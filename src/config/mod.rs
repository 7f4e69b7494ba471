//! Configuration module for SchemaLens.
//!
//! Handles connection descriptors, environment variables, and settings.

pub mod connection;
mod settings;

pub use connection::{
    check_document_uri, database_from_url, normalize_relational_url, redact, ConnectionError, DbKind,
    RelationalTarget,
};
pub use settings::{
    expand_env_vars, DefaultConnections, DiscoverySettings, ExportSettings, ServerSettings,
    Settings, SettingsError, StoreSettings, DEFAULT_SAMPLE_CAP,
};
