//! Domain model for phonebook records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every person is identified by a stable `PersonId`.
//! - Deletion is a hard delete; ids are never handed out again.

pub mod person;
