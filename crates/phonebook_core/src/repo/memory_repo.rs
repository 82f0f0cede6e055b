//! In-process person repository.
//!
//! # Responsibility
//! - Offer the `PersonRepository` contract without any database.
//! - Back tests and throwaway `memory:` stores.
//!
//! # Invariants
//! - The name check and the insert happen under one write lock.
//! - Records keep insertion order; updates never move a record.

use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::{PersonRepository, RepoError, RepoResult};
use std::sync::RwLock;

/// `RwLock<Vec<_>>` store; fine for the handful of records a phonebook holds.
#[derive(Debug, Default)]
pub struct InMemoryPersonRepository {
    records: RwLock<Vec<Person>>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersonRepository for InMemoryPersonRepository {
    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        Ok(records.clone())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        Ok(records.iter().find(|person| person.id == id).cloned())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Person>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        Ok(records.iter().find(|person| person.name == name).cloned())
    }

    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepoError::LockPoisoned("write"))?;
        if records.iter().any(|existing| existing.name == person.name) {
            return Err(RepoError::Duplicate(person.name.clone()));
        }
        person.validate()?;
        if records.iter().any(|existing| existing.id == person.id) {
            return Err(RepoError::InvalidData(format!(
                "person id {} is already in use",
                person.id
            )));
        }
        records.push(person.clone());

        Ok(person.id)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let mut records = self
            .records
            .write()
            .map_err(|_| RepoError::LockPoisoned("write"))?;
        let index = records
            .iter()
            .position(|existing| existing.id == person.id)
            .ok_or(RepoError::NotFound(person.id))?;
        if records
            .iter()
            .any(|existing| existing.id != person.id && existing.name == person.name)
        {
            return Err(RepoError::Duplicate(person.name.clone()));
        }
        records[index] = person.clone();

        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepoError::LockPoisoned("write"))?;
        let index = records
            .iter()
            .position(|person| person.id == id)
            .ok_or(RepoError::NotFound(id))?;
        records.remove(index);

        Ok(())
    }

    fn count_persons(&self) -> RepoResult<u64> {
        let records = self
            .records
            .read()
            .map_err(|_| RepoError::LockPoisoned("read"))?;
        Ok(records.len() as u64)
    }
}
