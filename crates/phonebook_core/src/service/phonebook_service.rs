//! Phonebook use-case service.
//!
//! # Responsibility
//! - Check request shape (field presence, identifier syntax) before the store
//!   is touched.
//! - Translate store outcomes into the typed error taxonomy callers render.
//!
//! # Invariants
//! - Missing-field errors are reported by this layer, never by the store.
//! - `name` is immutable through `update_person`.
//! - Logs carry event metadata only, never names or numbers.

use crate::model::person::{parse_person_id, Person, PersonId, PersonValidationError};
use crate::repo::person_repo::{PersonRepository, RepoError};
use log::{error, info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NAME_IMMUTABLE_MESSAGE: &str = "Name cannot be updated through this endpoint";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Body of create and update requests.
///
/// Unknown fields (for example an echoed `id`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

impl PersonPayload {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            number: Some(number.into()),
        }
    }

    pub fn number_only(number: impl Into<String>) -> Self {
        Self {
            name: None,
            number: Some(number.into()),
        }
    }
}

/// Machine-checkable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Duplicate,
    NotFound,
    MalformedIdentifier,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Duplicate => "DuplicateError",
            Self::NotFound => "NotFound",
            Self::MalformedIdentifier => "MalformedIdentifier",
            Self::Internal => "InternalError",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service error for phonebook use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Required request fields are absent or empty.
    MissingFields(Vec<&'static str>),
    /// A field violates the record constraints.
    Validation(PersonValidationError),
    /// Update tried to rename a person.
    NameImmutable,
    /// Name already taken; `existing_id` is the holder when it could be read.
    Duplicate {
        name: String,
        existing_id: Option<PersonId>,
    },
    NotFound(PersonId),
    /// Identifier text does not parse.
    MalformedIdentifier(String),
    /// Store or infrastructure failure.
    Internal(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields(_) | Self::Validation(_) | Self::NameImmutable => {
                ErrorKind::Validation
            }
            Self::Duplicate { .. } => ErrorKind::Duplicate,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MalformedIdentifier(_) => ErrorKind::MalformedIdentifier,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields(fields) if fields.len() > 1 => {
                write!(f, "Both {} are required", fields.join(" and "))
            }
            Self::MissingFields(fields) => write!(f, "{} is required", fields.join(", ")),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NameImmutable => f.write_str(NAME_IMMUTABLE_MESSAGE),
            Self::Duplicate { name, .. } => write!(f, "{name} already exists in phonebook"),
            Self::NotFound(id) => write!(f, "Person with id {id} not found"),
            Self::MalformedIdentifier(raw) => write!(f, "Invalid ID format: `{raw}`"),
            Self::Internal(err) => write!(f, "store failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Duplicate(name) => Self::Duplicate {
                name,
                existing_id: None,
            },
            other => Self::Internal(other),
        }
    }
}

/// Phonebook facade over a person repository.
pub struct PhonebookService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PhonebookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrow the backing repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists every person in store order.
    pub fn list_persons(&self) -> ServiceResult<Vec<Person>> {
        self.repo
            .list_persons()
            .map_err(|err| log_failure("person_list", err.into()))
    }

    /// Total stored persons.
    pub fn count_persons(&self) -> ServiceResult<u64> {
        self.repo
            .count_persons()
            .map_err(|err| log_failure("person_count", err.into()))
    }

    /// Fetches one person by wire identifier.
    ///
    /// A malformed identifier is reported as `MalformedIdentifier`, an
    /// unknown one as `NotFound`.
    pub fn get_person(&self, raw_id: &str) -> ServiceResult<Person> {
        parse_id(raw_id)
            .and_then(|id| {
                self.repo
                    .get_person(id)?
                    .ok_or(ServiceError::NotFound(id))
            })
            .map_err(|err| log_failure("person_get", err))
    }

    /// Creates a person from a request payload.
    ///
    /// # Contract
    /// - Absent or empty `name`/`number` fail with `MissingFields` listing
    ///   every missing field.
    /// - A taken name fails with `Duplicate` and leaves the holder untouched.
    pub fn create_person(&self, payload: &PersonPayload) -> ServiceResult<Person> {
        let (name, number) = match (present(&payload.name), present(&payload.number)) {
            (Some(name), Some(number)) => (name, number),
            (name, number) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("name");
                }
                if number.is_none() {
                    missing.push("number");
                }
                return Err(log_failure(
                    "person_create",
                    ServiceError::MissingFields(missing),
                ));
            }
        };

        let person = Person::new(name, number);
        match self.repo.create_person(&person) {
            Ok(id) => {
                info!("event=person_create module=service status=ok person_id={id}");
                Ok(person)
            }
            Err(RepoError::Duplicate(name)) => {
                let existing_id = self
                    .repo
                    .find_by_name(&name)
                    .ok()
                    .flatten()
                    .map(|existing| existing.id);
                Err(log_failure(
                    "person_create",
                    ServiceError::Duplicate { name, existing_id },
                ))
            }
            Err(err) => Err(log_failure("person_create", err.into())),
        }
    }

    /// Replaces the number of an existing person.
    ///
    /// # Contract
    /// - `number` is required; fields not in the payload stay untouched.
    /// - A payload `name` equal to the stored name is accepted; any other
    ///   name fails with `NameImmutable`.
    pub fn update_person(&self, raw_id: &str, payload: &PersonPayload) -> ServiceResult<Person> {
        self.apply_update(raw_id, payload)
            .map_err(|err| log_failure("person_update", err))
    }

    /// Removes a person permanently.
    pub fn delete_person(&self, raw_id: &str) -> ServiceResult<()> {
        let id = parse_id(raw_id).map_err(|err| log_failure("person_delete", err))?;
        self.repo
            .delete_person(id)
            .map_err(|err| log_failure("person_delete", err.into()))?;
        info!("event=person_delete module=service status=ok person_id={id}");
        Ok(())
    }

    fn apply_update(&self, raw_id: &str, payload: &PersonPayload) -> ServiceResult<Person> {
        let id = parse_id(raw_id)?;
        let number = present(&payload.number)
            .ok_or_else(|| ServiceError::MissingFields(vec!["number"]))?;

        let mut person = self.repo.get_person(id)?.ok_or(ServiceError::NotFound(id))?;
        if let Some(name) = present(&payload.name) {
            if name != person.name {
                return Err(ServiceError::NameImmutable);
            }
        }

        person.number = number.to_string();
        self.repo.update_person(&person)?;
        info!("event=person_update module=service status=ok person_id={id}");
        Ok(person)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn parse_id(raw_id: &str) -> ServiceResult<PersonId> {
    parse_person_id(raw_id).ok_or_else(|| ServiceError::MalformedIdentifier(raw_id.to_string()))
}

fn log_failure(event: &'static str, err: ServiceError) -> ServiceError {
    match err.kind() {
        ErrorKind::Internal => error!(
            "event={event} module=service status=error error_kind={} error={err}",
            err.kind()
        ),
        kind => warn!("event={event} module=service status=rejected error_kind={kind}"),
    }
    err
}
