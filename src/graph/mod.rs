//! Unified schema graph.
//!
//! Both extractor families produce the same shape: one [`Node`] per table or
//! collection and one [`Edge`] per declared or guessed relationship. Edge
//! targets are not required to name an existing node, since guessed document
//! references may point at collections that do not exist.

mod assembler;
mod descriptor;

pub use assembler::{AssemblyError, GraphAssembler};
pub use descriptor::{ColumnDescriptor, ColumnRole, DescriptorParseError, TypeInfo, TypeTag};

use serde::{Deserialize, Serialize};

pub use crate::config::DbKind;

/// The discovered schema of one database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaGraph {
    pub database: String,
    #[serde(alias = "db_type")]
    pub db_kind: DbKind,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl SchemaGraph {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving `source`, in discovery order.
    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    /// Edges whose target has no node in this graph.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| self.node(&e.target).is_none())
    }
}

/// A table or collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Documents actually sampled. Absent for relational tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
}

impl Node {
    /// Create a node labelled from its id.
    pub fn new(id: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        let id = id.into();
        Self {
            label: humanize_label(&id),
            id,
            columns,
            sample_count: None,
        }
    }

    /// Set the number of sampled documents.
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = Some(count);
        self
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Extractor output before assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGraph {
    pub database: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Human-readable label for a table or collection id.
///
/// Separators become spaces; a letter is upper-cased when it starts a word
/// (follows a non-letter) and lower-cased otherwise.
///
/// `course_schedule` -> `Course Schedule`, `user-profiles` -> `User Profiles`
pub fn humanize_label(id: &str) -> String {
    let mut label = String::with_capacity(id.len());
    let mut prev_is_letter = false;

    for c in id.chars() {
        let c = if c == '_' || c == '-' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_is_letter {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            label.push(c);
            prev_is_letter = false;
        }
    }

    label
}
