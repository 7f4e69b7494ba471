//! MySQL catalog over `information_schema`.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::debug;

use super::provider::{CatalogError, CatalogResult, RelationalCatalog};
use super::types::{ColumnInfo, ForeignKeyInfo, PrimaryKeyInfo};
use crate::config::{redact, RelationalTarget};

// information_schema reports identifiers as binary strings on some MySQL 8
// builds, so every text column is cast before decoding.

const LIST_TABLES: &str = "\
SELECT CAST(TABLE_NAME AS CHAR)
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
ORDER BY TABLE_NAME";

const FOREIGN_KEYS: &str = "\
SELECT CAST(CONSTRAINT_NAME AS CHAR), CAST(COLUMN_NAME AS CHAR),
       CAST(REFERENCED_TABLE_NAME AS CHAR), CAST(REFERENCED_COLUMN_NAME AS CHAR)
FROM information_schema.KEY_COLUMN_USAGE
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND REFERENCED_TABLE_NAME IS NOT NULL
ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION";

const PRIMARY_KEY: &str = "\
SELECT CAST(COLUMN_NAME AS CHAR)
FROM information_schema.KEY_COLUMN_USAGE
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
ORDER BY ORDINAL_POSITION";

const COLUMNS: &str = "\
SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), CAST(IS_NULLABLE AS CHAR)
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION";

/// Relational catalog backed by a single-connection sqlx pool.
///
/// The pool lives for one discovery and is closed by [`RelationalCatalog::close`].
pub struct MySqlCatalog {
    pool: MySqlPool,
    database: String,
}

impl MySqlCatalog {
    /// Connect to `target` and resolve the database to introspect.
    ///
    /// The database is the explicit name, else the URL path, else the
    /// server's current database.
    pub async fn connect(target: &RelationalTarget) -> CatalogResult<Self> {
        let options = MySqlConnectOptions::from_str(&target.url)
            .map_err(|e| CatalogError::InvalidUri(e.to_string()))?;

        debug!(url = %redact(&target.url), "connecting to mysql");
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;

        let database = match target.requested_database() {
            Some(db) => Some(db),
            None => match sqlx::query_scalar::<_, Option<String>>("SELECT DATABASE()")
                .fetch_one(&pool)
                .await
            {
                Ok(current) => current,
                Err(e) => {
                    pool.close().await;
                    return Err(e.into());
                }
            },
        };

        let Some(database) = database else {
            pool.close().await;
            return Err(CatalogError::MissingDatabase);
        };

        Ok(Self { pool, database })
    }
}

#[async_trait]
impl RelationalCatalog for MySqlCatalog {
    fn database(&self) -> &str {
        &self.database
    }

    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(LIST_TABLES)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await?;
        Ok(tables)
    }

    async fn get_foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        let rows = sqlx::query_as::<_, (String, String, String, Option<String>)>(FOREIGN_KEYS)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_foreign_keys(rows))
    }

    async fn get_primary_key(&self, table: &str) -> CatalogResult<PrimaryKeyInfo> {
        let columns = sqlx::query_scalar::<_, String>(PRIMARY_KEY)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(PrimaryKeyInfo {
            name: (!columns.is_empty()).then(|| "PRIMARY".to_string()),
            constrained_columns: columns,
        })
    }

    async fn get_columns(&self, table: &str) -> CatalogResult<Vec<ColumnInfo>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(COLUMNS)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, nullable)| ColumnInfo {
                name,
                data_type,
                is_nullable: nullable.eq_ignore_ascii_case("YES"),
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Fold `(constraint, column, referenced table, referenced column)` rows,
/// ordered by constraint then position, into one record per constraint.
fn group_foreign_keys(rows: Vec<(String, String, String, Option<String>)>) -> Vec<ForeignKeyInfo> {
    let mut keys: Vec<ForeignKeyInfo> = Vec::new();

    for (constraint, column, referred_table, referred_column) in rows {
        let same_constraint = keys
            .last()
            .is_some_and(|fk| fk.name.as_deref() == Some(constraint.as_str()));

        if !same_constraint {
            keys.push(ForeignKeyInfo {
                name: Some(constraint),
                constrained_columns: Vec::new(),
                referred_table,
                referred_columns: Vec::new(),
            });
        }

        if let Some(fk) = keys.last_mut() {
            fk.constrained_columns.push(column);
            fk.referred_columns.extend(referred_column);
        }
    }

    keys
}
