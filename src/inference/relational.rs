//! Relational extraction from declared catalog constraints.

use tracing::{debug, info};

use crate::discovery::{DiscoveryError, DiscoveryResult};
use crate::graph::{ColumnDescriptor, Edge, Node, RawGraph};
use crate::metadata::{ColumnInfo, ForeignKeyInfo, PrimaryKeyInfo, RelationalCatalog};

/// Builds a raw graph from a relational catalog.
///
/// Keys come from declared constraints only; nothing is guessed. Row counts
/// are not computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationalExtractor;

impl RelationalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Walk every table of `catalog`.
    ///
    /// A failure on any table aborts the whole extraction with
    /// [`DiscoveryError::CatalogRead`] naming that table.
    pub async fn extract(&self, catalog: &dyn RelationalCatalog) -> DiscoveryResult<RawGraph> {
        let tables = catalog.list_tables().await?;
        debug!(database = catalog.database(), tables = tables.len(), "listed tables");

        let mut raw = RawGraph {
            database: catalog.database().to_string(),
            ..Default::default()
        };

        for table in tables {
            let foreign_keys = catalog
                .get_foreign_keys(&table)
                .await
                .map_err(|e| DiscoveryError::catalog_read(&table, e))?;
            let primary_key = catalog
                .get_primary_key(&table)
                .await
                .map_err(|e| DiscoveryError::catalog_read(&table, e))?;
            let columns = catalog
                .get_columns(&table)
                .await
                .map_err(|e| DiscoveryError::catalog_read(&table, e))?;

            // One edge per constraint, however many columns it spans.
            raw.edges.extend(
                foreign_keys
                    .iter()
                    .filter(|fk| !fk.referred_table.is_empty())
                    .map(|fk| Edge::new(&table, &fk.referred_table)),
            );

            let columns = columns
                .iter()
                .map(|column| describe_column(column, &primary_key, &foreign_keys))
                .collect();
            raw.nodes.push(Node::new(table, columns));
        }

        info!(
            database = %raw.database,
            nodes = raw.nodes.len(),
            edges = raw.edges.len(),
            "relational extraction complete"
        );
        Ok(raw)
    }
}

/// Annotate a column with its key roles and declared type.
///
/// A column in several constraints refers to the first constraint's table.
fn describe_column(
    column: &ColumnInfo,
    primary_key: &PrimaryKeyInfo,
    foreign_keys: &[ForeignKeyInfo],
) -> ColumnDescriptor {
    let mut descriptor = ColumnDescriptor::new(&column.name);

    if primary_key.contains(&column.name) {
        descriptor = descriptor.primary_key();
    }
    if let Some(fk) = foreign_keys.iter().find(|fk| fk.contains(&column.name)) {
        let target = Some(fk.referred_table.clone()).filter(|t| !t.is_empty());
        descriptor = descriptor.foreign_key(target);
    }

    descriptor.with_declared_type(&column.data_type)
}
