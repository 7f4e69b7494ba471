//! Document extraction by sampling collections.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::classifier::classify;
use super::naming::{guess_referenced_collection, has_reference_suffix};
use crate::config::DEFAULT_SAMPLE_CAP;
use crate::discovery::{DiscoveryError, DiscoveryResult};
use crate::graph::{ColumnDescriptor, Edge, Node, RawGraph, TypeTag};
use crate::metadata::{Document, DocumentStore};

/// Identifier field of every document.
pub const ID_FIELD: &str = "_id";

/// Builds a raw graph by sampling the first documents of each collection.
///
/// Sampling takes documents in storage order, so what is inferred depends on
/// what was inserted first.
#[derive(Debug, Clone, Copy)]
pub struct DocumentExtractor {
    sample_cap: usize,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAP)
    }
}

impl DocumentExtractor {
    /// Sample at most `sample_cap` documents per collection.
    pub fn new(sample_cap: usize) -> Self {
        Self { sample_cap }
    }

    pub fn sample_cap(&self) -> usize {
        self.sample_cap
    }

    /// Sample every collection of `store`.
    ///
    /// Guessed references produce one edge per field per collection, whether
    /// or not the guessed collection exists. A failure on any collection
    /// aborts the whole extraction.
    pub async fn extract(&self, store: &dyn DocumentStore) -> DiscoveryResult<RawGraph> {
        let collections = store.list_collections().await?;
        debug!(database = store.database(), collections = collections.len(), "listed collections");

        let mut raw = RawGraph {
            database: store.database().to_string(),
            ..Default::default()
        };

        for collection in collections {
            let documents = store
                .sample_documents(&collection, self.sample_cap)
                .await
                .map_err(|e| DiscoveryError::catalog_read(&collection, e))?;
            debug!(collection = %collection, sampled = documents.len(), "sampled collection");

            let fields = observe_fields(&documents);
            let mut columns = Vec::with_capacity(fields.len());

            for (field, tags) in fields {
                if field == ID_FIELD {
                    columns.push(ColumnDescriptor::new(field).primary_key().with_observed_types(tags));
                } else if has_reference_suffix(&field) || tags.contains(&TypeTag::ObjectId) {
                    let target = guess_referenced_collection(&field);
                    raw.edges.push(Edge::new(&collection, &target));
                    columns.push(
                        ColumnDescriptor::new(field)
                            .foreign_key(Some(target))
                            .with_observed_types(tags),
                    );
                } else {
                    columns.push(ColumnDescriptor::new(field).with_observed_types(tags));
                }
            }

            raw.nodes
                .push(Node::new(collection, columns).with_sample_count(documents.len()));
        }

        info!(
            database = %raw.database,
            nodes = raw.nodes.len(),
            edges = raw.edges.len(),
            "document extraction complete"
        );
        Ok(raw)
    }
}

/// Distinct tags seen per top-level field, fields in sorted order.
fn observe_fields(documents: &[Document]) -> BTreeMap<String, BTreeSet<TypeTag>> {
    let mut fields: BTreeMap<String, BTreeSet<TypeTag>> = BTreeMap::new();
    for document in documents {
        for (name, value) in document {
            fields.entry(name.clone()).or_default().insert(classify(value));
        }
    }
    fields
}
