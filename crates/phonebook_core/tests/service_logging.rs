//! Rejection log lines emitted by the service, captured through the `log` facade.

use log::{LevelFilter, Log, Metadata, Record};
use phonebook_core::{InMemoryPersonRepository, PersonPayload, PhonebookService};
use std::sync::Mutex;

static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
static CAPTURE: Capture = Capture;

struct Capture;

impl Log for Capture {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        LINES.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
}

fn rejected_line_for(event: &str) -> Option<String> {
    LINES
        .lock()
        .unwrap()
        .iter()
        .find(|line| line.starts_with(&format!("event={event} ")) && line.contains("status=rejected"))
        .cloned()
}

#[test]
fn malformed_ids_are_logged_as_rejections_on_every_operation() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let service = PhonebookService::new(InMemoryPersonRepository::new());
    service.get_person("not-a-valid-id").unwrap_err();
    service.delete_person("42").unwrap_err();
    service
        .update_person("nope", &PersonPayload::number_only("99-9999999"))
        .unwrap_err();

    for event in ["person_get", "person_delete", "person_update"] {
        let line = rejected_line_for(event).unwrap_or_else(|| panic!("no rejection for {event}"));
        assert!(line.contains("error_kind=MalformedIdentifier"), "{line}");
    }
}
