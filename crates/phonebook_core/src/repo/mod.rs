//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the person store contract.
//! - Isolate SQLite details from service orchestration.
//! - Provide a swappable in-memory backing with the same contract.
//!
//! # Invariants
//! - Repository writes must enforce `Person::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to storage transport errors.

pub mod memory_repo;
pub mod person_repo;
pub mod store;
