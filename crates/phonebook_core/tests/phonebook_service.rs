use phonebook_core::{
    open_store, ErrorKind, InMemoryPersonRepository, PersonPayload, PersonValidationError,
    PhonebookService, PersonRepository, ServiceError, SharedRepository, SqlitePersonRepository,
    StoreLocation,
};
use std::sync::Arc;

fn services() -> Vec<(&'static str, PhonebookService<SharedRepository>)> {
    let sqlite: SharedRepository = Arc::new(SqlitePersonRepository::open_in_memory().unwrap());
    let memory: SharedRepository = Arc::new(InMemoryPersonRepository::new());
    vec![
        ("sqlite", PhonebookService::new(sqlite)),
        ("memory", PhonebookService::new(memory)),
    ]
}

#[test]
fn create_then_get_returns_equal_record() {
    for (backend, service) in services() {
        let created = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        let fetched = service.get_person(&created.id.to_string()).unwrap();
        assert_eq!(fetched, created, "{backend}");
    }
}

#[test]
fn duplicate_create_reports_existing_id_and_keeps_original() {
    for (backend, service) in services() {
        let original = service
            .create_person(&PersonPayload::new("Ada Lovelace", "39-445323523"))
            .unwrap();

        let err = service
            .create_person(&PersonPayload::new("Ada Lovelace", "00-00000000"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate, "{backend}");
        match err {
            ServiceError::Duplicate { name, existing_id } => {
                assert_eq!(name, "Ada Lovelace");
                assert_eq!(existing_id, Some(original.id), "{backend}");
            }
            other => panic!("{backend}: unexpected error {other}"),
        }

        let stored = service.get_person(&original.id.to_string()).unwrap();
        assert_eq!(stored.number, "39-445323523", "{backend}");
        assert_eq!(service.count_persons().unwrap(), 1, "{backend}");
    }
}

#[test]
fn taken_name_is_duplicate_even_with_invalid_number() {
    for (backend, service) in services() {
        let original = service
            .create_person(&PersonPayload::new("Ada Lovelace", "39-445323523"))
            .unwrap();

        let err = service
            .create_person(&PersonPayload::new("Ada Lovelace", "bad"))
            .unwrap_err();
        assert!(
            matches!(&err, ServiceError::Duplicate { existing_id, .. } if *existing_id == Some(original.id)),
            "{backend}: unexpected error {err}"
        );
        assert_eq!(service.count_persons().unwrap(), 1, "{backend}");
    }
}

#[test]
fn short_name_is_a_validation_error() {
    for (backend, service) in services() {
        let err = service
            .create_person(&PersonPayload::new("Al", "12-3456789"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{backend}");
        assert!(matches!(
            err,
            ServiceError::Validation(PersonValidationError::NameTooShort { .. })
        ));
        assert_eq!(service.count_persons().unwrap(), 0, "{backend}");
    }
}

#[test]
fn missing_fields_are_caught_before_the_store() {
    for (backend, service) in services() {
        let err = service.create_person(&PersonPayload::default()).unwrap_err();
        assert!(
            matches!(&err, ServiceError::MissingFields(fields) if fields == &["name", "number"]),
            "{backend}"
        );

        let err = service
            .create_person(&PersonPayload {
                name: Some("Arto Hellas".to_string()),
                number: Some(String::new()),
            })
            .unwrap_err();
        assert!(
            matches!(&err, ServiceError::MissingFields(fields) if fields == &["number"]),
            "{backend}"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn invalid_number_rejected_on_create_and_update() {
    for (backend, service) in services() {
        let err = service
            .create_person(&PersonPayload::new("Arto Hellas", "1234567-8"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{backend}");

        let created = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        let err = service
            .update_person(&created.id.to_string(), &PersonPayload::number_only("040123456"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{backend}");

        let stored = service.get_person(&created.id.to_string()).unwrap();
        assert_eq!(stored.number, "040-123456", "{backend}");
    }
}

#[test]
fn update_changes_number_and_unknown_id_is_not_found() {
    for (backend, service) in services() {
        let created = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();

        let updated = service
            .update_person(&created.id.to_string(), &PersonPayload::number_only("99-9999999"))
            .unwrap();
        assert_eq!(updated.number, "99-9999999", "{backend}");
        assert_eq!(updated.id, created.id, "{backend}");

        let err = service
            .update_person(
                "00000000-0000-4000-8000-000000000000",
                &PersonPayload::number_only("99-9999999"),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{backend}");
    }
}

#[test]
fn update_accepts_unchanged_name_but_rejects_rename() {
    for (backend, service) in services() {
        let created = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        let id = created.id.to_string();

        let same_name = service
            .update_person(&id, &PersonPayload::new("Arto Hellas", "040-654321"))
            .unwrap();
        assert_eq!(same_name.number, "040-654321", "{backend}");

        let err = service
            .update_person(&id, &PersonPayload::new("Arto Vihavainen", "040-111111"))
            .unwrap_err();
        assert!(matches!(err, ServiceError::NameImmutable), "{backend}");
        assert_eq!(err.to_string(), "Name cannot be updated through this endpoint");

        let stored = service.get_person(&id).unwrap();
        assert_eq!(stored.name, "Arto Hellas", "{backend}");
        assert_eq!(stored.number, "040-654321", "{backend}");
    }
}

#[test]
fn update_requires_number() {
    for (backend, service) in services() {
        let created = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        let err = service
            .update_person(&created.id.to_string(), &PersonPayload::default())
            .unwrap_err();
        assert!(
            matches!(&err, ServiceError::MissingFields(fields) if fields == &["number"]),
            "{backend}"
        );
    }
}

#[test]
fn malformed_identifier_is_distinct_from_not_found() {
    for (backend, service) in services() {
        let err = service.get_person("not-a-valid-id").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedIdentifier, "{backend}");

        let err = service.delete_person("42").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedIdentifier, "{backend}");

        let err = service
            .get_person("00000000-0000-4000-8000-000000000000")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound, "{backend}");
    }
}

#[test]
fn delete_then_get_is_not_found_and_second_delete_too() {
    for (backend, service) in services() {
        let created = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        let id = created.id.to_string();

        service.delete_person(&id).unwrap();
        assert_eq!(
            service.get_person(&id).unwrap_err().kind(),
            ErrorKind::NotFound,
            "{backend}"
        );
        assert_eq!(
            service.delete_person(&id).unwrap_err().kind(),
            ErrorKind::NotFound,
            "{backend}"
        );
    }
}

#[test]
fn list_length_tracks_count_between_mutations() {
    for (backend, service) in services() {
        let check = |service: &PhonebookService<SharedRepository>| {
            assert_eq!(
                service.list_persons().unwrap().len() as u64,
                service.count_persons().unwrap(),
                "{backend}"
            );
        };

        check(&service);
        let a = service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        check(&service);
        service
            .create_person(&PersonPayload::new("Ada Lovelace", "39-445323523"))
            .unwrap();
        check(&service);
        let _ = service.create_person(&PersonPayload::new("Ada Lovelace", "39-445323524"));
        check(&service);
        service.delete_person(&a.id.to_string()).unwrap();
        check(&service);
        assert_eq!(service.count_persons().unwrap(), 1, "{backend}");
    }
}

#[test]
fn open_store_builds_every_backend() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("phonebook.sqlite3");
    let locations = [
        StoreLocation::Memory,
        StoreLocation::SqliteMemory,
        StoreLocation::parse(&format!("sqlite://{}", file.display())).unwrap(),
    ];

    for location in &locations {
        let repo = open_store(location).unwrap();
        let service = PhonebookService::new(repo);
        service
            .create_person(&PersonPayload::new("Arto Hellas", "040-123456"))
            .unwrap();
        assert_eq!(service.repo().count_persons().unwrap(), 1, "{location:?}");
    }
    assert!(file.exists());
}
