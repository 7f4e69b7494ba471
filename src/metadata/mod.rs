//! Catalog access capabilities.
//!
//! The extractors never talk to a driver directly. They consume two traits:
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │      RelationalCatalog       │   │        DocumentStore         │
//! │  - list_tables()             │   │  - list_collections()        │
//! │  - get_foreign_keys(table)   │   │  - sample_documents(c, n)    │
//! │  - get_primary_key(table)    │   │                              │
//! │  - get_columns(table)        │   │                              │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                │                                  │
//!        MySqlCatalog (sqlx)            MongoDocumentStore (mongodb)
//!        MemoryCatalog                  MemoryDocumentStore
//! ```
//!
//! The memory implementations hold fixed catalogs and can be told to fail
//! on a given table or collection.

pub mod memory;
mod mongo_provider;
mod mysql_provider;
mod provider;
mod types;

pub use memory::{MemoryCatalog, MemoryDocumentStore, MemoryTable};
pub use mongo_provider::MongoDocumentStore;
pub use mongodb::bson::{doc, Bson, Document};
pub use mysql_provider::MySqlCatalog;
pub use provider::{CatalogError, CatalogResult, DocumentStore, RelationalCatalog};
pub use types::*;
