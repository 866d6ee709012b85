//! File-based logging bootstrap.
//!
//! The terminal belongs to the TUI, so diagnostics go to rotating files under
//! `<data-dir>/logs/` instead of stderr.

use std::path::Path;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

const LOG_FILE_BASENAME: &str = "todo";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const SUPPORTED_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Start logging at `level` into `log_dir`.
///
/// The returned handle must be kept alive for as long as logs should be written.
///
/// # Errors
/// - Returns an error when `level` is not one of error/warn/info/debug/trace.
/// - Returns an error when the directory cannot be created or the backend fails to start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<LoggerHandle, String> {
    let level = normalize_level(level)?;

    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let handle = Logger::try_with_str(&level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
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
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=app_start status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}

fn normalize_level(level: &str) -> Result<String, String> {
    let normalized = level.trim().to_ascii_lowercase();
    if SUPPORTED_LEVELS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(format!(
            "unsupported log level `{level}`; expected one of {}",
            SUPPORTED_LEVELS.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_level;

    #[test]
    fn test_normalize_level_accepts_known_levels() {
        assert_eq!(normalize_level(" INFO ").unwrap(), "info");
        assert_eq!(normalize_level("trace").unwrap(), "trace");
    }

    #[test]
    fn test_normalize_level_rejects_unknown() {
        assert!(normalize_level("verbose").is_err());
        assert!(normalize_level("").is_err());
    }
}
