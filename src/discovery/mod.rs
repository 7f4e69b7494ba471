//! Discovery orchestration.
//!
//! ```text
//!   DiscoveryRequest ──► resolve connection ──► Connector ──► catalog handle
//!   (profile > inline > default)                                  │
//!                                                                 ▼
//!   SchemaGraph ◄── GraphAssembler ◄── RawGraph ◄── Relational/DocumentExtractor
//! ```
//!
//! A discovery is one attempt: nothing is retried, and a failure anywhere
//! returns no graph at all.

mod connector;
mod error;
mod service;

pub use connector::{Connector, LiveConnector, MemoryConnector};
pub use error::{DiscoveryError, DiscoveryResult};
pub use service::{DiscoveryResponse, DiscoveryService};

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{
    check_document_uri, redact, DbKind, RelationalTarget, Settings, SettingsError,
    DEFAULT_SAMPLE_CAP,
};
use crate::graph::{GraphAssembler, RawGraph, SchemaGraph};
use crate::inference::{DocumentExtractor, RelationalExtractor};

/// Parameters of one discovery request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscoveryRequest {
    #[serde(default, alias = "mysql_url", alias = "mongo_uri")]
    pub connection_string: Option<String>,
    #[serde(default, alias = "db_name")]
    pub database_name: Option<String>,
    /// Export the graph after discovery.
    #[serde(default = "default_save")]
    pub save: bool,
    #[serde(default, alias = "connection_id")]
    pub connection_profile_id: Option<i64>,
    /// Documents sampled per collection. Ignored for relational discovery.
    #[serde(default)]
    pub sample_cap: Option<usize>,
}

fn default_save() -> bool {
    true
}

impl Default for DiscoveryRequest {
    fn default() -> Self {
        Self {
            connection_string: None,
            database_name: None,
            save: default_save(),
            connection_profile_id: None,
            sample_cap: None,
        }
    }
}

impl DiscoveryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_string(mut self, url: impl Into<String>) -> Self {
        self.connection_string = Some(url.into());
        self
    }

    pub fn database(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    pub fn profile(mut self, id: i64) -> Self {
        self.connection_profile_id = Some(id);
        self
    }

    pub fn sample_cap(mut self, cap: usize) -> Self {
        self.sample_cap = Some(cap);
        self
    }

    pub fn save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    fn requested_database(&self) -> Option<&str> {
        self.database_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Process-wide fallbacks for requests that leave parameters out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryDefaults {
    pub mysql_url: Option<String>,
    pub mongo_uri: Option<String>,
    pub sample_cap: usize,
}

impl Default for DiscoveryDefaults {
    fn default() -> Self {
        Self {
            mysql_url: None,
            mongo_uri: None,
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }
}

impl DiscoveryDefaults {
    /// Defaults from loaded settings, with environment variables expanded.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self {
            mysql_url: settings.defaults.for_kind(DbKind::Relational)?,
            mongo_uri: settings.defaults.for_kind(DbKind::Document)?,
            sample_cap: settings.discovery.sample_cap,
        })
    }

    fn connection_for(&self, kind: DbKind) -> Option<&str> {
        match kind {
            DbKind::Relational => self.mysql_url.as_deref(),
            DbKind::Document => self.mongo_uri.as_deref(),
        }
    }
}

/// The part of a stored profile discovery needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRef {
    pub db_kind: DbKind,
    pub connection_string: String,
}

/// Read access to stored connection profiles.
pub trait ProfileLookup: Send + Sync {
    fn get_profile(&self, id: i64) -> DiscoveryResult<Option<ProfileRef>>;
}

/// Runs discoveries against whichever catalogs the connector opens.
#[derive(Clone)]
pub struct Discovery {
    defaults: DiscoveryDefaults,
    connector: Arc<dyn Connector>,
    profiles: Arc<dyn ProfileLookup>,
}

impl Discovery {
    pub fn new(
        defaults: DiscoveryDefaults,
        connector: Arc<dyn Connector>,
        profiles: Arc<dyn ProfileLookup>,
    ) -> Self {
        Self {
            defaults,
            connector,
            profiles,
        }
    }

    pub fn defaults(&self) -> &DiscoveryDefaults {
        &self.defaults
    }

    /// Pick the connection string for `request`.
    ///
    /// A profile reference wins over an inline string, which wins over the
    /// configured default. A profile of another kind is rejected before
    /// anything connects. Profile id 0 means no profile.
    pub fn resolve_connection(
        &self,
        kind: DbKind,
        request: &DiscoveryRequest,
    ) -> DiscoveryResult<String> {
        if let Some(id) = request.connection_profile_id.filter(|&id| id != 0) {
            let profile = self
                .profiles
                .get_profile(id)?
                .ok_or(DiscoveryError::ProfileNotFound(id))?;
            if profile.db_kind != kind {
                return Err(DiscoveryError::KindMismatch {
                    profile_id: id,
                    expected: kind,
                    actual: profile.db_kind,
                });
            }
            return Ok(profile.connection_string);
        }

        let inline = request
            .connection_string
            .as_deref()
            .filter(|s| !s.trim().is_empty());
        inline
            .or_else(|| self.defaults.connection_for(kind))
            .map(str::to_string)
            .ok_or(DiscoveryError::MissingConnectionString(kind))
    }

    /// Discover the schema behind `request`.
    pub async fn discover(
        &self,
        kind: DbKind,
        request: &DiscoveryRequest,
    ) -> DiscoveryResult<SchemaGraph> {
        let connection = self.resolve_connection(kind, request)?;
        debug!(%kind, connection = %redact(&connection), "starting discovery");

        let raw = match kind {
            DbKind::Relational => self.discover_relational(&connection, request).await?,
            DbKind::Document => self.discover_document(&connection, request).await?,
        };

        let graph = GraphAssembler::new(kind).assemble(raw)?;
        info!(
            %kind,
            database = %graph.database,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "discovery complete"
        );
        Ok(graph)
    }

    async fn discover_relational(
        &self,
        url: &str,
        request: &DiscoveryRequest,
    ) -> DiscoveryResult<RawGraph> {
        let target = RelationalTarget::new(url, request.requested_database().map(str::to_string))?;
        let catalog = self.connector.open_relational(&target).await?;

        let result = RelationalExtractor::new().extract(catalog.as_ref()).await;
        catalog.close().await;
        result
    }

    async fn discover_document(
        &self,
        uri: &str,
        request: &DiscoveryRequest,
    ) -> DiscoveryResult<RawGraph> {
        check_document_uri(uri)?;
        let database = request
            .requested_database()
            .ok_or(DiscoveryError::MissingDatabaseName(DbKind::Document))?;
        let sample_cap = request
            .sample_cap
            .filter(|&cap| cap > 0)
            .unwrap_or(self.defaults.sample_cap);

        let store = self.connector.open_document(uri, database).await?;

        let result = DocumentExtractor::new(sample_cap).extract(store.as_ref()).await;
        store.close().await;
        result
    }
}
