//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical phonebook record.
//! - Own field-level validation rules for `name` and `number`.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `name` has at least `NAME_MIN_CHARS` characters.
//! - `number` has at least `NUMBER_MIN_CHARS` characters and matches
//!   `NUMBER_PATTERN`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to a person at creation.
pub type PersonId = Uuid;

pub const NAME_MIN_CHARS: usize = 3;
pub const NUMBER_MIN_CHARS: usize = 8;
/// Two or three ASCII digits, a hyphen, then one or more ASCII digits.
pub const NUMBER_PATTERN: &str = r"^[0-9]{2,3}-[0-9]+$";

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(NUMBER_PATTERN).expect("valid phone number regex"));

/// Canonical phonebook record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identifier, immutable after creation.
    pub id: PersonId,
    /// Display name. Unique across all stored persons (case-sensitive).
    pub name: String,
    /// Phone number in `NN-NNNNNN` / `NNN-NNNNN` form.
    pub number: String,
}

/// Field-level validation failure for a person record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    EmptyName,
    NameTooShort { min: usize, actual: usize },
    EmptyNumber,
    NumberTooShort { min: usize, actual: usize },
    InvalidNumberFormat(String),
}

impl PersonValidationError {
    /// Returns the record field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooShort { .. } => "name",
            Self::EmptyNumber
            | Self::NumberTooShort { .. }
            | Self::InvalidNumberFormat(_) => "number",
        }
    }
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required"),
            Self::NameTooShort { min, actual } => write!(
                f,
                "name is shorter than the minimum allowed length ({min}), got {actual}"
            ),
            Self::EmptyNumber => write!(f, "number is required"),
            Self::NumberTooShort { min, actual } => write!(
                f,
                "number is shorter than the minimum allowed length ({min}), got {actual}"
            ),
            Self::InvalidNumberFormat(value) => write!(f, "{value} is not a valid phone number!"),
        }
    }
}

impl Error for PersonValidationError {}

impl Person {
    /// Creates a person with a freshly generated id.
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, number)
    }

    /// Creates a person with a caller-provided id.
    ///
    /// Used by storage read paths where identity already exists.
    pub fn with_id(id: PersonId, name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            number: number.into(),
        }
    }

    /// Validates every field against the record invariants.
    ///
    /// Name is checked before number; the first failure is returned.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)?;
        validate_number(&self.number)
    }
}

/// Checks the `name` field rules.
pub fn validate_name(name: &str) -> Result<(), PersonValidationError> {
    if name.is_empty() {
        return Err(PersonValidationError::EmptyName);
    }
    let actual = name.chars().count();
    if actual < NAME_MIN_CHARS {
        return Err(PersonValidationError::NameTooShort {
            min: NAME_MIN_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Checks the `number` field rules.
pub fn validate_number(number: &str) -> Result<(), PersonValidationError> {
    if number.is_empty() {
        return Err(PersonValidationError::EmptyNumber);
    }
    let actual = number.chars().count();
    if actual < NUMBER_MIN_CHARS {
        return Err(PersonValidationError::NumberTooShort {
            min: NUMBER_MIN_CHARS,
            actual,
        });
    }
    if !NUMBER_RE.is_match(number) {
        return Err(PersonValidationError::InvalidNumberFormat(
            number.to_string(),
        ));
    }
    Ok(())
}

/// Parses a wire identifier.
///
/// Returns `None` for anything that is not a hyphenated UUID.
pub fn parse_person_id(raw: &str) -> Option<PersonId> {
    let trimmed = raw.trim();
    // Uuid::parse_str also takes simple/braced/urn forms; the wire only uses hyphenated.
    if trimmed.len() != 36 {
        return None;
    }
    Uuid::parse_str(trimmed).ok()
}
