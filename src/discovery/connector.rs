//! Opening catalog handles for a discovery.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{redact, RelationalTarget};
use crate::metadata::{
    CatalogError, CatalogResult, DocumentStore, MemoryCatalog, MemoryDocumentStore,
    MongoDocumentStore, MySqlCatalog, RelationalCatalog,
};

/// Opens one catalog handle per discovery.
///
/// The orchestrator closes every handle it opens, whatever the outcome.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open_relational(
        &self,
        target: &RelationalTarget,
    ) -> CatalogResult<Box<dyn RelationalCatalog>>;

    async fn open_document(&self, uri: &str, database: &str)
        -> CatalogResult<Box<dyn DocumentStore>>;
}

/// Connects to live servers through sqlx and the mongodb driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveConnector;

#[async_trait]
impl Connector for LiveConnector {
    async fn open_relational(
        &self,
        target: &RelationalTarget,
    ) -> CatalogResult<Box<dyn RelationalCatalog>> {
        Ok(Box::new(MySqlCatalog::connect(target).await?))
    }

    async fn open_document(
        &self,
        uri: &str,
        database: &str,
    ) -> CatalogResult<Box<dyn DocumentStore>> {
        Ok(Box::new(MongoDocumentStore::connect(uri, database).await?))
    }
}

/// Hands out clones of in-memory catalogs and records every attempt.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    catalog: Option<MemoryCatalog>,
    store: Option<MemoryDocumentStore>,
    refusal: Option<CatalogError>,
    attempts: Arc<Mutex<Vec<String>>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: MemoryCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_store(mut self, store: MemoryDocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Fail every connection attempt with `err`.
    pub fn refusing(mut self, err: CatalogError) -> Self {
        self.refusal = Some(err);
        self
    }

    /// Redacted connection strings of every attempt so far.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn attempt(&self, url: &str) -> CatalogResult<()> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(redact(url));
        }
        match &self.refusal {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open_relational(
        &self,
        target: &RelationalTarget,
    ) -> CatalogResult<Box<dyn RelationalCatalog>> {
        self.attempt(&target.url)?;
        let catalog = self
            .catalog
            .clone()
            .ok_or_else(|| CatalogError::ConnectionFailed("no relational catalog".into()))?;

        match target.requested_database() {
            Some(db) if db != catalog.database() => Err(CatalogError::ConnectionFailed(format!(
                "unknown database '{}'",
                db
            ))),
            _ => Ok(Box::new(catalog)),
        }
    }

    async fn open_document(
        &self,
        uri: &str,
        database: &str,
    ) -> CatalogResult<Box<dyn DocumentStore>> {
        self.attempt(uri)?;
        let store = self
            .store
            .clone()
            .ok_or_else(|| CatalogError::ConnectionFailed("no document store".into()))?;

        if store.database() != database {
            return Err(CatalogError::ConnectionFailed(format!(
                "unknown database '{}'",
                database
            )));
        }
        Ok(Box::new(store))
    }
}
