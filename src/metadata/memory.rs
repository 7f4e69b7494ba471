//! In-memory catalogs.
//!
//! Fixed table and collection sets with optional failure injection. Clones
//! share their call log and close flag, so a test can hand one clone to the
//! orchestrator and inspect the other afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::provider::{CatalogError, CatalogResult, DocumentStore, RelationalCatalog};
use super::types::{ColumnInfo, ForeignKeyInfo, PrimaryKeyInfo};
use super::Document;

/// Shared bookkeeping for the memory catalogs.
#[derive(Debug, Clone, Default)]
struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl CallLog {
    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

/// One table of a [`MemoryCatalog`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_key: PrimaryKeyInfo,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a column with a declared type.
    pub fn column(mut self, name: &str, data_type: &str) -> Self {
        self.columns.push(ColumnInfo::new(name, data_type));
        self
    }

    /// Set the primary key columns.
    pub fn primary_key<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.primary_key = PrimaryKeyInfo {
            name: Some("PRIMARY".to_string()),
            constrained_columns: columns.into_iter().map(Into::into).collect(),
        };
        self
    }

    /// Add a foreign key constraint.
    pub fn foreign_key<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        columns: I,
        referred_table: &str,
    ) -> Self {
        self.foreign_keys
            .push(ForeignKeyInfo::new(columns, referred_table));
        self
    }
}

/// A relational catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    database: String,
    tables: Vec<MemoryTable>,
    fail_listing: bool,
    failing_table: Option<String>,
    call_log: CallLog,
}

impl MemoryCatalog {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn with_table(mut self, table: MemoryTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Make `list_tables` fail.
    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make every per-table call for `table` fail.
    pub fn fail_on_table(mut self, table: impl Into<String>) -> Self {
        self.failing_table = Some(table.into());
        self
    }

    /// Calls made so far, as `method:argument` strings.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.calls()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.call_log.closed.load(Ordering::SeqCst)
    }

    fn table(&self, method: &str, name: &str) -> CatalogResult<&MemoryTable> {
        self.call_log.record(format!("{}:{}", method, name));
        if self.failing_table.as_deref() == Some(name) {
            return Err(CatalogError::QueryFailed(format!(
                "injected failure reading '{}'",
                name
            )));
        }
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CatalogError::QueryFailed(format!("no such table '{}'", name)))
    }
}

#[async_trait]
impl RelationalCatalog for MemoryCatalog {
    fn database(&self) -> &str {
        &self.database
    }

    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        self.call_log.record("list_tables".to_string());
        if self.fail_listing {
            return Err(CatalogError::QueryFailed("injected listing failure".into()));
        }
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        Ok(self.table("get_foreign_keys", table)?.foreign_keys.clone())
    }

    async fn get_primary_key(&self, table: &str) -> CatalogResult<PrimaryKeyInfo> {
        Ok(self.table("get_primary_key", table)?.primary_key.clone())
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnInfo>> {
        Ok(self.table("get_columns", table)?.columns.clone())
    }

    async fn close(&self) {
        self.call_log.closed.store(true, Ordering::SeqCst);
    }
}

/// A document store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    database: String,
    collections: Vec<(String, Vec<Document>)>,
    fail_listing: bool,
    failing_collection: Option<String>,
    call_log: CallLog,
}

impl MemoryDocumentStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Add a collection whose storage order is the order of `documents`.
    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Document>) -> Self {
        self.collections.push((name.into(), documents));
        self
    }

    /// Make `list_collections` fail.
    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make sampling `collection` fail.
    pub fn fail_on_collection(mut self, collection: impl Into<String>) -> Self {
        self.failing_collection = Some(collection.into());
        self
    }

    /// Calls made so far, as `method:argument` strings.
    pub fn calls(&self) -> Vec<String> {
        self.call_log.calls()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.call_log.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn database(&self) -> &str {
        &self.database
    }

    async fn list_collections(&self) -> CatalogResult<Vec<String>> {
        self.call_log.record("list_collections".to_string());
        if self.fail_listing {
            return Err(CatalogError::QueryFailed("injected listing failure".into()));
        }
        Ok(self.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn sample_documents(
        &self,
        collection: &str,
        limit: usize,
    ) -> CatalogResult<Vec<Document>> {
        self.call_log
            .record(format!("sample_documents:{}", collection));
        if self.failing_collection.as_deref() == Some(collection) {
            return Err(CatalogError::QueryFailed(format!(
                "injected failure sampling '{}'",
                collection
            )));
        }

        let documents = self
            .collections
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, docs)| docs.iter().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(documents)
    }

    async fn close(&self) {
        self.call_log.closed.store(true, Ordering::SeqCst);
    }
}
