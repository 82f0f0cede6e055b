//! Versioned schema for the person table.
//!
//! # Invariants
//! - Versions are contiguous from 1 and never renumbered.
//! - A database is only ever moved forward, inside one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "persons",
    sql: include_str!("0001_persons.sql"),
}];

/// Where a connection's schema stands relative to this binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Current,
    Behind { db_version: u32, expected: u32 },
    Ahead { db_version: u32, latest_supported: u32 },
}

impl SchemaState {
    fn into_result(self) -> DbResult<()> {
        match self {
            Self::Current => Ok(()),
            Self::Behind {
                db_version,
                expected,
            } => Err(DbError::SchemaNotReady {
                db_version,
                expected,
            }),
            Self::Ahead {
                db_version,
                latest_supported,
            } => Err(DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            }),
        }
    }
}

pub fn latest_version() -> u32 {
    MIGRATIONS.len() as u32
}

pub fn schema_state(conn: &Connection) -> DbResult<SchemaState> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    Ok(match db_version {
        v if v == latest => SchemaState::Current,
        v if v < latest => SchemaState::Behind {
            db_version: v,
            expected: latest,
        },
        v => SchemaState::Ahead {
            db_version: v,
            latest_supported: latest,
        },
    })
}

/// Fails unless the schema is exactly at `latest_version()`.
pub fn ensure_current(conn: &Connection) -> DbResult<()> {
    schema_state(conn)?.into_result()
}

/// Brings the schema up to `latest_version()`.
///
/// A database written by a newer binary is rejected untouched.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = match schema_state(conn)? {
        SchemaState::Current => return Ok(()),
        SchemaState::Behind { db_version, .. } => db_version,
        ahead @ SchemaState::Ahead { .. } => return ahead.into_result(),
    };

    let tx = conn.transaction()?;
    for step in &MIGRATIONS[from as usize..] {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(())
}
