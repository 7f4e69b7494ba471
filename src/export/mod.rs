//! JSON export of discovered schemas.
//!
//! Each export is a pretty-printed [`SchemaGraph`] written to
//! `<dir>/<prefix>_<YYYYMMDD_HHMMSS>.json`, where the prefix names the
//! database kind and database (`mysql_shop`, `mongo_blog`). Files are
//! served back under `/exports/`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::graph::SchemaGraph;

/// URL path under which export files are served.
pub const EXPORT_ROUTE: &str = "/exports";

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Writes schema graphs into an export directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Export `graph` stamped with the current time. Returns the web path.
    pub fn export(&self, graph: &SchemaGraph) -> ExportResult<String> {
        self.export_at(graph, Utc::now())
    }

    /// Export `graph` stamped with `at`. Returns the web path.
    pub fn export_at(&self, graph: &SchemaGraph, at: DateTime<Utc>) -> ExportResult<String> {
        std::fs::create_dir_all(&self.dir)?;

        let file_name = export_file_name(graph, at);
        let path = self.dir.join(&file_name);
        std::fs::write(&path, serde_json::to_string_pretty(graph)?)?;

        info!(path = %path.display(), nodes = graph.nodes.len(), "exported schema");
        Ok(format!("{}/{}", EXPORT_ROUTE, file_name))
    }
}

/// File name for an export of `graph` taken at `at`.
pub fn export_file_name(graph: &SchemaGraph, at: DateTime<Utc>) -> String {
    let prefix = format!("{}_{}", graph.db_kind.export_prefix(), graph.database);
    format!("{}_{}.json", sanitize(&prefix), at.format("%Y%m%d_%H%M%S"))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
