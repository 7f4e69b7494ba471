//! Discovery error taxonomy.

use thiserror::Error;

use crate::config::{ConnectionError, DbKind};
use crate::export::ExportError;
use crate::graph::AssemblyError;
use crate::metadata::CatalogError;
use crate::store::StoreError;

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors surfaced by a discovery request.
///
/// Every failure is single-attempt and final: no variant is retried and no
/// partial graph accompanies any of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// The connection string could not be parsed.
    #[error("malformed connection string: {0}")]
    ConnectionFormat(String),

    /// The server was unreachable or rejected the credentials.
    #[error("could not connect: {0}")]
    Connection(String),

    /// No database name was given or could be resolved.
    #[error("a database name is required for {0} discovery")]
    MissingDatabaseName(DbKind),

    /// No connection string was given and no default is configured.
    #[error("no connection string given and no default configured for {0}")]
    MissingConnectionString(DbKind),

    /// Catalog introspection or document sampling failed.
    #[error("catalog read failed{}: {message}", object_suffix(.object))]
    CatalogRead {
        /// Table or collection being read, if any.
        object: Option<String>,
        message: String,
    },

    /// A stored profile targets a different database kind.
    #[error("connection profile {profile_id} is a {actual} profile, expected {expected}")]
    KindMismatch {
        profile_id: i64,
        expected: DbKind,
        actual: DbKind,
    },

    /// The catalog yielded the same table or collection twice.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    /// An edge with an empty endpoint reached the assembler.
    #[error("edge #{index} has an empty {endpoint}")]
    InvalidEdge { index: usize, endpoint: &'static str },

    /// The referenced connection profile does not exist.
    #[error("connection profile {0} not found")]
    ProfileNotFound(i64),

    /// The profile store could not be read.
    #[error("profile store error: {0}")]
    ProfileStore(String),

    /// Writing the export file failed.
    #[error("export failed: {0}")]
    Export(String),
}

fn object_suffix(object: &Option<String>) -> String {
    match object {
        Some(name) => format!(" for '{}'", name),
        None => String::new(),
    }
}

impl DiscoveryError {
    /// A catalog read failure on `object`.
    pub fn catalog_read(object: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::CatalogRead {
            object: Some(object.into()),
            message: err.to_string(),
        }
    }

    /// Stable machine-readable classification.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConnectionFormat(_) => "connection_format",
            Self::Connection(_) => "connection",
            Self::MissingDatabaseName(_) => "missing_database_name",
            Self::MissingConnectionString(_) => "missing_connection_string",
            Self::CatalogRead { .. } => "catalog_read",
            Self::KindMismatch { .. } => "kind_mismatch",
            Self::DuplicateNode(_) => "duplicate_node",
            Self::InvalidEdge { .. } => "invalid_edge",
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::ProfileStore(_) => "profile_store",
            Self::Export(_) => "export",
        }
    }

    /// Whether the caller can fix the failure by changing the request.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFormat(_)
                | Self::MissingDatabaseName(_)
                | Self::MissingConnectionString(_)
                | Self::KindMismatch { .. }
                | Self::ProfileNotFound(_)
        )
    }
}

impl From<ConnectionError> for DiscoveryError {
    fn from(err: ConnectionError) -> Self {
        Self::ConnectionFormat(err.to_string())
    }
}

impl From<AssemblyError> for DiscoveryError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::DuplicateNode(id) => Self::DuplicateNode(id),
            AssemblyError::InvalidEdge { index, endpoint } => Self::InvalidEdge { index, endpoint },
        }
    }
}

/// Catalog errors raised while opening a connection. Failures on a named
/// table or collection go through [`DiscoveryError::catalog_read`] instead.
impl From<CatalogError> for DiscoveryError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidUri(msg) => Self::ConnectionFormat(msg),
            CatalogError::ConnectionFailed(msg) => Self::Connection(msg),
            CatalogError::MissingDatabase => Self::MissingDatabaseName(DbKind::Relational),
            CatalogError::QueryFailed(msg) => Self::CatalogRead {
                object: None,
                message: msg,
            },
        }
    }
}

impl From<StoreError> for DiscoveryError {
    fn from(err: StoreError) -> Self {
        Self::ProfileStore(err.to_string())
    }
}

impl From<ExportError> for DiscoveryError {
    fn from(err: ExportError) -> Self {
        Self::Export(err.to_string())
    }
}
