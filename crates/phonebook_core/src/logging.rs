//! Process-wide logging for phonebook binaries.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once, on stderr or as rolling files.
//! - Record panics as one sanitized line before the default hook runs.
//!
//! # Invariants
//! - A second init with identical settings is a no-op; any other is refused.
//! - Nothing in here panics.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const FILE_BASENAME: &str = "phonebook";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rolling files inside an absolute directory.
    Directory(PathBuf),
}

impl LogTarget {
    pub fn directory(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("log directory cannot be empty".to_string());
        }
        let dir = Path::new(trimmed);
        if !dir.is_absolute() {
            return Err(format!("log directory must be absolute, got `{trimmed}`"));
        }
        Ok(Self::Directory(dir.to_path_buf()))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    target: LogTarget,
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts logging at `level` ("trace" .. "error", "warning" accepted).
///
/// # Errors
/// - Unknown level names.
/// - A log directory that cannot be created or a backend that fails to start.
/// - Logging already running with a different level or target.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), String> {
    let wanted = LogSettings {
        level: parse_level(level)?,
        target,
    };

    let active = ACTIVE.get_or_try_init(|| {
        let handle = start_backend(&wanted)?;
        install_panic_hook();
        info!(
            "event=logging_init module=core status=ok level={} target={} version={} os={}",
            wanted.level,
            wanted.target,
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        Ok::<_, String>(ActiveLogger {
            settings: wanted.clone(),
            _handle: handle,
        })
    })?;

    if active.settings == wanted {
        Ok(())
    } else {
        Err(format!(
            "logging already running with level={} target={}; refusing level={} target={}",
            active.settings.level, active.settings.target, wanted.level, wanted.target
        ))
    }
}

/// Active `(level, target)`, if logging has been started.
pub fn logging_status() -> Option<(LevelFilter, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.target.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    let name = raw.trim().to_ascii_lowercase();
    let name = if name == "warning" { "warn" } else { name.as_str() };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error",
            raw.trim()
        )),
        Ok(level) => Ok(level),
    }
}

fn start_backend(settings: &LogSettings) -> Result<LoggerHandle, String> {
    let spec = LogSpecification::builder().default(settings.level).build();
    let logger = Logger::with(spec);

    let logger = match &settings.target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|err| format!("cannot create log directory `{}`: {err}", dir.display()))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    logger
        .start()
        .map_err(|err| format!("logger backend failed to start: {err}"))
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        chained(info);
    }));
}

/// Collapses line breaks and caps length so a payload stays on one log line.
fn one_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert!(parse_level("off").is_err());
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn relative_log_directory_is_rejected() {
        assert!(LogTarget::directory("logs/dev").unwrap_err().contains("absolute"));
        assert!(LogTarget::directory("  ").is_err());
    }

    #[test]
    fn one_line_flattens_and_truncates() {
        assert_eq!(one_line("a\nb\rc", 10), "a b c");
        assert_eq!(one_line("abcdefgh", 3), "abc...");
    }

    #[test]
    fn repeated_init_must_match_first_settings() {
        let dir = tempfile::tempdir().unwrap();
        let target = LogTarget::directory(dir.path().to_str().unwrap()).unwrap();

        init_logging("info", target.clone()).unwrap();
        init_logging("INFO", target.clone()).unwrap();
        assert!(init_logging("debug", target.clone())
            .unwrap_err()
            .contains("refusing"));
        assert!(init_logging("info", LogTarget::Stderr)
            .unwrap_err()
            .contains("refusing"));

        assert_eq!(logging_status(), Some((LevelFilter::Info, target)));
    }
}
