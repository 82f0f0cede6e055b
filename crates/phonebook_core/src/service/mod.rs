//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep transport layers (HTTP, CLI) decoupled from storage details.

pub mod phonebook_service;
