//! Core domain logic for the phonebook.
//! This crate is the single source of truth for person-record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::person::{
    parse_person_id, validate_name, validate_number, Person, PersonId, PersonValidationError,
};
pub use repo::memory_repo::InMemoryPersonRepository;
pub use repo::person_repo::{PersonRepository, RepoError, RepoResult, SqlitePersonRepository};
pub use repo::store::{open_store, SharedRepository, StoreLocation, StoreLocationError};
pub use service::phonebook_service::{
    ErrorKind, PersonPayload, PhonebookService, ServiceError, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
