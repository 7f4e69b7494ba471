//! Built-in demo schema.

use crate::graph::SchemaGraph;

const SAMPLE_SCHEMA: &str = include_str!("sample_schema.json");

/// A small school management schema for trying the frontend without a
/// database.
pub fn sample_schema() -> Result<SchemaGraph, serde_json::Error> {
    serde_json::from_str(SAMPLE_SCHEMA)
}
