//! Operator CLI for a phonebook store.
//!
//! # Responsibility
//! - List every person, or add one, straight against a store location.
//! - Route writes through `PhonebookService` so the server's rules apply.

use clap::Parser;
use phonebook_core::{open_store, PersonPayload, PhonebookService, StoreLocation};
use std::io::{self, Write};
use std::process::ExitCode;

const USAGE: &str = "Usage: phonebook <store> [<name> <number>]";

#[derive(Debug, Parser)]
#[command(name = "phonebook", version, about = "List or add phonebook entries")]
struct Cli {
    /// Store location: `sqlite://<path>`, a bare path, `sqlite::memory:` or `memory:`.
    store: String,
    /// Optional `<name> <number>` pair to add.
    entry: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), String> {
    let location = StoreLocation::parse(&cli.store).map_err(|err| err.to_string())?;
    let repo = open_store(&location).map_err(|err| format!("failed to open store: {err}"))?;
    let service = PhonebookService::new(repo);

    match cli.entry.as_slice() {
        [] => {
            let persons = service
                .list_persons()
                .map_err(|err| format!("list persons failed: {err}"))?;
            writeln!(out, "phonebook:").map_err(write_failed)?;
            for person in persons {
                writeln!(out, "{} {}", person.name, person.number).map_err(write_failed)?;
            }
            Ok(())
        }
        [name, number] => {
            let person = service
                .create_person(&PersonPayload::new(name.as_str(), number.as_str()))
                .map_err(|err| format!("add person failed: {err}"))?;
            writeln!(out, "added {} number {} to phonebook", person.name, person.number)
                .map_err(write_failed)
        }
        _ => Err(USAGE.to_string()),
    }
}

fn write_failed(err: io::Error) -> String {
    format!("write to stdout failed: {err}")
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, USAGE};

    fn cli(store: &str, entry: &[&str]) -> Cli {
        Cli {
            store: store.to_string(),
            entry: entry.iter().map(|value| value.to_string()).collect(),
        }
    }

    fn run_captured(store: &str, entry: &[&str]) -> Result<String, String> {
        let mut out = Vec::new();
        run(cli(store, entry), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn add_then_list_against_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = format!("sqlite://{}", dir.path().join("cli.sqlite3").display());

        assert_eq!(
            run_captured(&store, &["Arto Hellas", "040-123456"]).unwrap(),
            "added Arto Hellas number 040-123456 to phonebook\n"
        );
        assert_eq!(
            run_captured(&store, &[]).unwrap(),
            "phonebook:\nArto Hellas 040-123456\n"
        );

        let err = run_captured(&store, &["Arto Hellas", "040-654321"]).unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn wrong_arity_prints_usage() {
        assert_eq!(run_captured("memory:", &["only-name"]).unwrap_err(), USAGE);
    }

    #[test]
    fn invalid_entry_is_rejected() {
        let err = run_captured("memory:", &["Al", "12-3456789"]).unwrap_err();
        assert!(err.starts_with("add person failed"));
    }
}
