//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `persons` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Person::validate()` before SQL mutations.
//! - Name uniqueness comes from the `idx_persons_name` unique index, never
//!   from a read-then-insert check.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{ensure_schema_ready, open_db, open_db_in_memory, DbError};
use crate::model::person::{Person, PersonId, PersonValidationError};
use rusqlite::ffi;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT uuid, name, number FROM persons";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    /// Another person already holds this name.
    Duplicate(String),
    NotFound(PersonId),
    Db(DbError),
    InvalidData(String),
    LockPoisoned(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Duplicate(name) => write!(f, "{name} already exists in phonebook"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::LockPoisoned(op) => write!(f, "store lock poisoned during {op}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Duplicate(_) | Self::NotFound(_) | Self::InvalidData(_) | Self::LockPoisoned(_) => {
                None
            }
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for person records.
///
/// Implementations must be shareable across request handlers.
pub trait PersonRepository: Send + Sync {
    /// Returns every stored person in insertion order.
    fn list_persons(&self) -> RepoResult<Vec<Person>>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Exact, case-sensitive name lookup.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Person>>;
    /// Persists a new person. A taken name fails with `Duplicate` before any
    /// field rule is checked.
    fn create_person(&self, person: &Person) -> RepoResult<PersonId>;
    /// Replaces name and number of an existing person.
    fn update_person(&self, person: &Person) -> RepoResult<()>;
    /// Removes a person permanently. A second delete yields `NotFound`.
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;
    fn count_persons(&self) -> RepoResult<u64>;
}

impl<R: PersonRepository + ?Sized> PersonRepository for Arc<R> {
    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        (**self).list_persons()
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        (**self).get_person(id)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Person>> {
        (**self).find_by_name(name)
    }

    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        (**self).create_person(person)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        (**self).update_person(person)
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        (**self).delete_person(id)
    }

    fn count_persons(&self) -> RepoResult<u64> {
        (**self).count_persons()
    }
}

/// SQLite-backed person repository.
///
/// Owns its connection; statements are serialized through a mutex.
pub struct SqlitePersonRepository {
    conn: Mutex<Connection>,
}

impl SqlitePersonRepository {
    /// Wraps a connection whose migrations are already applied.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    fn lock(&self, op: &'static str) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned(op))
    }
}

impl PersonRepository for SqlitePersonRepository {
    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        let conn = self.lock("list")?;
        let mut stmt = conn.prepare(&format!(
            "{PERSON_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut persons = Vec::new();

        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }

        Ok(persons)
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let conn = self.lock("get")?;
        let mut stmt = conn.prepare(&format!("{PERSON_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Person>> {
        let conn = self.lock("find_by_name")?;
        let mut stmt = conn.prepare(&format!("{PERSON_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        let conn = self.lock("create")?;
        // Name collisions win over field errors; the UNIQUE index still backs this.
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM persons WHERE name = ?1);",
            [&person.name],
            |row| row.get(0),
        )?;
        if taken {
            return Err(RepoError::Duplicate(person.name.clone()));
        }
        person.validate()?;

        conn.execute(
            "INSERT INTO persons (uuid, name, number) VALUES (?1, ?2, ?3);",
            params![person.id.to_string(), person.name, person.number],
        )
        .map_err(|err| map_write_error(err, &person.name))?;

        Ok(person.id)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let conn = self.lock("update")?;
        let changed = conn
            .execute(
                "UPDATE persons
                 SET
                    name = ?2,
                    number = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![person.id.to_string(), person.name, person.number],
            )
            .map_err(|err| map_write_error(err, &person.name))?;

        if changed == 0 {
            return Err(RepoError::NotFound(person.id));
        }

        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let conn = self.lock("delete")?;
        let changed = conn.execute("DELETE FROM persons WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_persons(&self) -> RepoResult<u64> {
        let conn = self.lock("count")?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM persons;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative person count `{count}`")))
    }
}

fn map_write_error(err: rusqlite::Error, name: &str) -> RepoError {
    if is_name_unique_violation(&err) {
        return RepoError::Duplicate(name.to_string());
    }
    RepoError::from(err)
}

fn is_name_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                && message
                    .as_deref()
                    .is_some_and(|text| text.contains("persons.name"))
        }
        _ => false,
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in persons.uuid"))
    })?;

    let person = Person::with_id(id, row.get::<_, String>("name")?, row.get::<_, String>("number")?);
    person.validate().map_err(|err| {
        RepoError::InvalidData(format!("person {id} fails validation: {err}"))
    })?;
    Ok(person)
}
