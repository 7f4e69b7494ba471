//! Schema graph assembly and structural validation.

use std::collections::HashSet;

use super::{DbKind, RawGraph, SchemaGraph};

/// Structural violations found while assembling a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("edge #{index} has an empty {endpoint}")]
    InvalidEdge {
        index: usize,
        endpoint: &'static str,
    },
}

/// Stamps the database kind on extractor output and validates it.
///
/// Node ids must be unique and edge endpoints non-empty. Edges are neither
/// deduplicated nor checked against the node set.
#[derive(Debug, Clone, Copy)]
pub struct GraphAssembler {
    kind: DbKind,
}

impl GraphAssembler {
    pub fn new(kind: DbKind) -> Self {
        Self { kind }
    }

    pub fn assemble(&self, raw: RawGraph) -> Result<SchemaGraph, AssemblyError> {
        let mut seen = HashSet::with_capacity(raw.nodes.len());
        for node in &raw.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(AssemblyError::DuplicateNode(node.id.clone()));
            }
        }

        for (index, edge) in raw.edges.iter().enumerate() {
            if edge.source.is_empty() {
                return Err(AssemblyError::InvalidEdge {
                    index,
                    endpoint: "source",
                });
            }
            if edge.target.is_empty() {
                return Err(AssemblyError::InvalidEdge {
                    index,
                    endpoint: "target",
                });
            }
        }

        Ok(SchemaGraph {
            database: raw.database,
            db_kind: self.kind,
            nodes: raw.nodes,
            edges: raw.edges,
        })
    }
}
