//! Catalog metadata records.

use serde::{Deserialize, Serialize};

/// A column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, verbatim (e.g. `VARCHAR(255)`).
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub is_nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
        }
    }
}

/// Primary key constraint of a table. Empty when the table has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyInfo {
    /// Constraint name, if the catalog reports one.
    pub name: Option<String>,
    /// Columns in key order.
    pub constrained_columns: Vec<String>,
}

impl PrimaryKeyInfo {
    pub fn contains(&self, column: &str) -> bool {
        self.constrained_columns.iter().any(|c| c == column)
    }
}

/// A declared foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    /// Constraint name.
    pub name: Option<String>,
    /// Referencing columns of the owning table.
    pub constrained_columns: Vec<String>,
    /// Referenced table.
    pub referred_table: String,
    /// Referenced columns, positionally matching `constrained_columns`.
    pub referred_columns: Vec<String>,
}

impl ForeignKeyInfo {
    /// A constraint from `columns` to `referred_table`.
    pub fn new<I, S>(columns: I, referred_table: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            constrained_columns: columns.into_iter().map(Into::into).collect(),
            referred_table: referred_table.into(),
            referred_columns: Vec::new(),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.constrained_columns.iter().any(|c| c == column)
    }
}
