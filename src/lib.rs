//! # SchemaLens
//!
//! Discovers the structure of a MySQL or MongoDB database and emits a
//! unified schema graph for visualization.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           HTTP API / CLI (web, bin/schemalens)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [discovery]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Orchestrator: profile > inline > default connection    │
//! │   (store: saved profiles, export: JSON snapshots)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [metadata]
//! ┌─────────────────────────────────────────────────────────┐
//! │   RelationalCatalog (sqlx)  │  DocumentStore (mongodb)   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Declared keys  │  Sampled type unions + naming policy  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [graph assembler]
//! ┌─────────────────────────────────────────────────────────┐
//! │       SchemaGraph (nodes, column descriptors, edges)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod discovery;
pub mod export;
pub mod graph;
pub mod inference;
pub mod metadata;
pub mod store;

#[cfg(feature = "server")]
pub mod web;

pub use config::{DbKind, Settings};
pub use discovery::{
    Discovery, DiscoveryError, DiscoveryRequest, DiscoveryResponse, DiscoveryService,
};
pub use graph::{ColumnDescriptor, Edge, Node, SchemaGraph, TypeTag};
