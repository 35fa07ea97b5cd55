//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing committed note state.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Stores must not read or write notes before migrations succeed.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was not opened through `open_db*` or is partially migrated.
    SchemaNotReady {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::SchemaNotReady {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note storage requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::SchemaNotReady { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Verifies that `conn` carries the latest schema version.
///
/// # Errors
/// - `DbError::SchemaNotReady` when migrations have not been applied.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version = migrations::schema_version(conn)?;
    if actual_version != expected_version {
        return Err(DbError::SchemaNotReady {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
