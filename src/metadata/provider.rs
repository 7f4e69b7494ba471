//! Catalog capability traits.
//!
//! Both traits are object safe so the orchestrator can hold boxed handles
//! produced by a connector, whether live drivers or in-memory catalogs.

use async_trait::async_trait;

use super::types::{ColumnInfo, ForeignKeyInfo, PrimaryKeyInfo};
use super::Document;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by catalog implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The connection string could not be parsed by the driver.
    #[error("invalid connection string: {0}")]
    InvalidUri(String),

    /// The server was unreachable or rejected the credentials.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Neither the request nor the server named a database.
    #[error("no database selected")]
    MissingDatabase,

    /// A catalog or sampling query failed.
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

/// Read access to a relational catalog.
#[async_trait]
pub trait RelationalCatalog: Send + Sync {
    /// Name of the database being introspected.
    fn database(&self) -> &str;

    /// All base tables, in catalog order.
    async fn list_tables(&self) -> CatalogResult<Vec<String>>;

    /// Foreign key constraints declared on `table`.
    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>>;

    /// Primary key constraint of `table` (empty if none).
    async fn get_primary_key(&self, table: &str) -> CatalogResult<PrimaryKeyInfo>;

    /// Columns of `table` in ordinal order.
    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnInfo>>;

    /// Release the underlying connection.
    async fn close(&self) {}
}

/// Read access to a document store database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the database being sampled.
    fn database(&self) -> &str;

    /// All collection names.
    async fn list_collections(&self) -> CatalogResult<Vec<String>>;

    /// Up to `limit` documents of `collection`, in storage order.
    async fn sample_documents(&self, collection: &str, limit: usize)
        -> CatalogResult<Vec<Document>>;

    /// Release the underlying connection.
    async fn close(&self) {}
}
