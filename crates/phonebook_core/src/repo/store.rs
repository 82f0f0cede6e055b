//! Store location parsing and repository construction.
//!
//! # Responsibility
//! - Turn an externally supplied connection string into a ready repository.
//!
//! # Invariants
//! - Construction either returns a migrated, usable store or an error; it
//!   never hands back a half-open store.

use crate::repo::memory_repo::InMemoryPersonRepository;
use crate::repo::person_repo::{PersonRepository, RepoResult, SqlitePersonRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

const MEMORY_SCHEME: &str = "memory:";
const SQLITE_MEMORY: &str = "sqlite::memory:";
const SQLITE_PREFIX: &str = "sqlite://";

/// Repository handle shared across request handlers.
pub type SharedRepository = Arc<dyn PersonRepository>;

/// Where person records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// Process-local records, lost on exit.
    Memory,
    /// SQLite database that lives only as long as the connection.
    SqliteMemory,
    SqliteFile(PathBuf),
}

/// Rejected connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocationError(pub String);

impl Display for StoreLocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid store location: {}", self.0)
    }
}

impl Error for StoreLocationError {}

impl StoreLocation {
    /// Parses `memory:`, `sqlite::memory:`, `sqlite://<path>` or a bare path.
    pub fn parse(raw: &str) -> Result<Self, StoreLocationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StoreLocationError("connection string is empty".to_string()));
        }
        if trimmed == MEMORY_SCHEME {
            return Ok(Self::Memory);
        }
        if trimmed == SQLITE_MEMORY {
            return Ok(Self::SqliteMemory);
        }
        if let Some(path) = trimmed.strip_prefix(SQLITE_PREFIX) {
            if path.is_empty() {
                return Err(StoreLocationError(format!(
                    "`{trimmed}` does not name a database file"
                )));
            }
            return Ok(Self::SqliteFile(PathBuf::from(path)));
        }
        if trimmed.contains("://") {
            return Err(StoreLocationError(format!(
                "unsupported scheme in `{trimmed}`; expected sqlite:// or memory:"
            )));
        }
        Ok(Self::SqliteFile(PathBuf::from(trimmed)))
    }

    /// Short label for logs. Never includes the path.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::SqliteMemory => "sqlite_memory",
            Self::SqliteFile(_) => "sqlite_file",
        }
    }
}

/// Opens the repository behind `location`.
///
/// # Errors
/// - Returns the underlying database error when the file cannot be opened or
///   migrated.
pub fn open_store(location: &StoreLocation) -> RepoResult<SharedRepository> {
    let repo: SharedRepository = match location {
        StoreLocation::Memory => Arc::new(InMemoryPersonRepository::new()),
        StoreLocation::SqliteMemory => Arc::new(SqlitePersonRepository::open_in_memory()?),
        StoreLocation::SqliteFile(path) => Arc::new(SqlitePersonRepository::open(path)?),
    };
    info!(
        "event=store_open module=repo status=ok mode={}",
        location.mode()
    );
    Ok(repo)
}
