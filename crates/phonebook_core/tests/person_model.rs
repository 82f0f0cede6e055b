use phonebook_core::{validate_name, validate_number, Person, PersonValidationError};

#[test]
fn new_person_gets_unique_ids() {
    let first = Person::new("Arto Hellas", "040-123456");
    let second = Person::new("Arto Hellas", "040-123456");
    assert_ne!(first.id, second.id);
}

#[test]
fn valid_person_passes_validation() {
    let person = Person::new("Ada Lovelace", "39-445323523");
    person.validate().unwrap();
}

#[test]
fn name_shorter_than_three_chars_is_rejected() {
    let err = Person::new("Al", "12-3456789").validate().unwrap_err();
    assert_eq!(err, PersonValidationError::NameTooShort { min: 3, actual: 2 });
    assert_eq!(err.field(), "name");
}

#[test]
fn name_length_counts_characters_not_bytes() {
    // Two characters, four bytes.
    assert!(validate_name("Åö").is_err());
    validate_name("Åsa").unwrap();
}

#[test]
fn empty_fields_are_reported_as_empty() {
    assert_eq!(validate_name("").unwrap_err(), PersonValidationError::EmptyName);
    assert_eq!(
        validate_number("").unwrap_err(),
        PersonValidationError::EmptyNumber
    );
}

#[test]
fn number_must_be_at_least_eight_chars() {
    let err = validate_number("12-3456").unwrap_err();
    assert_eq!(err, PersonValidationError::NumberTooShort { min: 8, actual: 7 });
    validate_number("12-34567").unwrap();
}

#[test]
fn number_must_match_prefix_hyphen_digits_pattern() {
    for bad in [
        "1-23456789",
        "1234-567890",
        "39-44-5323523",
        "040 123456",
        "040-12345a",
        "0401234567",
        "040-",
        " 040-123456",
    ] {
        let err = validate_number(bad).unwrap_err();
        assert_eq!(err.field(), "number", "{bad} should fail on number");
    }

    for good in ["09-1234556", "040-123456", "123-4567890123"] {
        validate_number(good).unwrap();
    }
}

#[test]
fn invalid_format_message_echoes_value() {
    let err = validate_number("abc-defghij").unwrap_err();
    assert_eq!(err.to_string(), "abc-defghij is not a valid phone number!");
}

#[test]
fn person_serializes_with_wire_field_names() {
    let person = Person::new("Dan Abramov", "12-43234345");
    let value = serde_json::to_value(&person).unwrap();
    assert_eq!(value["id"], person.id.to_string());
    assert_eq!(value["name"], "Dan Abramov");
    assert_eq!(value["number"], "12-43234345");
    assert_eq!(value.as_object().unwrap().len(), 3);
}

#[test]
fn name_length_counts_chars_not_utf16_units() {
    assert!(matches!(
        validate_name("😀a"),
        Err(PersonValidationError::NameTooShort { min: 3, actual: 2 })
    ));
    assert!(validate_name("😀ab").is_ok());
}
