//! Logging bootstrap for the dashboard core.
//!
//! # Responsibility
//! - Initialize rolling file logs exactly once per process.
//! - Capture panics as sanitized, metadata-only log events.
//!
//! # Invariants
//! - Re-initialization with the same level and directory is idempotent.
//! - Re-initialization with a conflicting level or directory is rejected.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "teampulse";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 8 * 1024 * 1024;
const MAX_LOG_FILES: usize = 4;
const MAX_PANIC_PAYLOAD_CHARS: usize = 200;

static ACTIVE: OnceCell<ActiveLogging> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogging {
    level: &'static str,
    directory: PathBuf,
    _handle: LoggerHandle,
}

/// Initializes file logging at `level` into `directory`.
///
/// # Errors
/// - Unsupported level string.
/// - Empty or relative directory, or one that cannot be created.
/// - A previous initialization with a conflicting level or directory.
pub fn init_logging(level: &str, directory: &str) -> Result<(), String> {
    let level = canonical_level(level)?;
    let directory = canonical_directory(directory)?;

    if let Some(active) = ACTIVE.get() {
        return check_matches(active, level, &directory);
    }

    let requested_directory = directory.clone();
    let activated = ACTIVE.get_or_try_init(move || -> Result<ActiveLogging, String> {
        std::fs::create_dir_all(&directory)
            .map_err(|err| format!("cannot create log directory `{}`: {err}", directory.display()))?;

        let handle = Logger::try_with_str(level)
            .map_err(|err| format!("invalid log level `{level}`: {err}"))?
            .log_to_file(
                FileSpec::default()
                    .directory(directory.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("cannot start logger: {err}"))?;

        install_panic_hook();

        info!(
            "event=logging_init module=logging status=ok level={level} dir={} version={}",
            directory.display(),
            env!("CARGO_PKG_VERSION")
        );

        Ok(ActiveLogging {
            level,
            directory,
            _handle: handle,
        })
    })?;

    // A racing init may have won with a different configuration.
    check_matches(activated, level, &requested_directory)
}

/// Returns `(level, directory)` when logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.directory.clone()))
}

/// Default level per build mode: `debug` for debug builds, `info`
/// otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn check_matches(
    active: &ActiveLogging,
    level: &'static str,
    directory: &Path,
) -> Result<(), String> {
    if active.directory != directory {
        return Err(format!(
            "logging already active at `{}`; refusing to switch to `{}`",
            active.directory.display(),
            directory.display()
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already active at level `{}`; refusing to switch to `{level}`",
            active.level
        ));
    }
    Ok(())
}

fn canonical_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn canonical_directory(directory: &str) -> Result<PathBuf, String> {
    let trimmed = directory.trim();
    if trimmed.is_empty() {
        return Err("log directory cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!(
            "log directory must be an absolute path, got `{trimmed}`"
        ));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.get().is_some() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        // Panic payloads can carry user text; cap and flatten before
        // logging.
        let payload = sanitize_message(&payload_text(panic_info), MAX_PANIC_PAYLOAD_CHARS);
        error!("event=panic module=logging status=error location={location} payload={payload}");
        previous(panic_info);
    }));

    let _ = PANIC_HOOK.set(());
}

fn payload_text(info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    let mut capped: String = flat.chars().take(max_chars).collect();
    if flat.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}
