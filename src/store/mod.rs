//! SQLite-backed connection profile store.
//!
//! Profiles are named connection strings saved for reuse across discovery
//! requests. The store lives at `~/.schemalens/profiles.db` unless
//! configured otherwise.
//!
//! ```text
//! connection_profiles
//!   id                 INTEGER PRIMARY KEY AUTOINCREMENT
//!   name               TEXT     display name
//!   db_kind            TEXT     "mysql" | "mongodb"
//!   connection_string  TEXT
//!   created_at         INTEGER  unix seconds
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DbKind;
use crate::discovery::{DiscoveryResult, ProfileLookup, ProfileRef};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Profile {id} has unknown database kind '{kind}'")]
    InvalidKind { id: i64, kind: String },

    #[error("Profile store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A saved connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub id: i64,
    pub name: String,
    pub db_kind: DbKind,
    pub connection_string: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when saving a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub name: String,
    #[serde(alias = "db_type")]
    pub db_kind: DbKind,
    pub connection_string: String,
}

/// Connection profile store.
pub struct ProfileStore {
    conn: Mutex<Connection>,
}

impl ProfileStore {
    /// Open or create the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        debug!(path = %path.display(), "opening profile store");
        let store = Self {
            conn: Mutex::new(Connection::open(path)?),
        };
        store.init()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> StoreResult<()> {
        self.lock()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS connection_profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                db_kind TEXT NOT NULL,
                connection_string TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Save a new profile.
    pub fn create(&self, profile: NewProfile) -> StoreResult<ConnectionProfile> {
        let created_at = Utc::now();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO connection_profiles (name, db_kind, connection_string, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                profile.name,
                profile.db_kind.as_str(),
                profile.connection_string,
                created_at.timestamp()
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(id, kind = %profile.db_kind, "saved connection profile");

        Ok(ConnectionProfile {
            id,
            name: profile.name,
            db_kind: profile.db_kind,
            connection_string: profile.connection_string,
            created_at: from_timestamp(created_at.timestamp()),
        })
    }

    /// All profiles, newest first.
    pub fn list(&self) -> StoreResult<Vec<ConnectionProfile>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, db_kind, connection_string, created_at
             FROM connection_profiles ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], StoredRow::from_row)?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?.into_profile()?);
        }
        Ok(profiles)
    }

    /// Look up a profile by id.
    pub fn get(&self, id: i64) -> StoreResult<Option<ConnectionProfile>> {
        let row = self
            .lock()?
            .query_row(
                "SELECT id, name, db_kind, connection_string, created_at
                 FROM connection_profiles WHERE id = ?",
                params![id],
                StoredRow::from_row,
            )
            .optional()?;

        row.map(StoredRow::into_profile).transpose()
    }

    /// Delete a profile. Returns whether it existed.
    pub fn delete(&self, id: i64) -> StoreResult<bool> {
        let rows = self
            .lock()?
            .execute("DELETE FROM connection_profiles WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }
}

impl ProfileLookup for ProfileStore {
    fn get_profile(&self, id: i64) -> DiscoveryResult<Option<ProfileRef>> {
        Ok(self.get(id)?.map(|p| ProfileRef {
            db_kind: p.db_kind,
            connection_string: p.connection_string,
        }))
    }
}

/// A row as stored, before the kind is parsed.
struct StoredRow {
    id: i64,
    name: String,
    db_kind: String,
    connection_string: String,
    created_at: i64,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            db_kind: row.get(2)?,
            connection_string: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_profile(self) -> StoreResult<ConnectionProfile> {
        let db_kind = self.db_kind.parse().map_err(|_| StoreError::InvalidKind {
            id: self.id,
            kind: self.db_kind.clone(),
        })?;

        Ok(ConnectionProfile {
            id: self.id,
            name: self.name,
            db_kind,
            connection_string: self.connection_string,
            created_at: from_timestamp(self.created_at),
        })
    }
}

fn from_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
