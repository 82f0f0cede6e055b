//! SQLite access for the person store.
//!
//! # Responsibility
//! - Hand out connections that are configured and migrated.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - No person row is touched on a connection whose schema is not current.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{ensure_schema_ready, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer binary.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// Database has not been migrated yet.
    SchemaNotReady { db_version: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "schema v{db_version} is newer than this build supports (v{latest_supported})"
            ),
            Self::SchemaNotReady {
                db_version,
                expected,
            } => write!(f, "schema v{db_version} needs migrating to v{expected}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Sqlite(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
