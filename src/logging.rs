// File: src/logging.rs
use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::Path;

const LOG_FILE_BASENAME: &str = "unical";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Where log records go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// Batch and report modes.
    Stderr,
    /// The TUI owns the terminal, so it logs to a rotating file instead.
    File(&'a Path),
}

pub fn level_for(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Starts the logger. `RUST_LOG` takes precedence over `level`.
///
/// The returned handle must be kept alive for the lifetime of the process.
pub fn init_logging(level: &str, target: LogTarget<'_>) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)
        .with_context(|| format!("invalid log level `{level}`"))?;

    let logger = match target {
        LogTarget::Stderr => logger.log_to_stderr().format(flexi_logger::default_format),
        LogTarget::File(dir) => logger
            .log_to_file(
                FileSpec::default()
                    .directory(dir)
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .append()
            .format_for_files(flexi_logger::detailed_format),
    };

    logger
        .write_mode(WriteMode::Direct)
        .start()
        .context("failed to start logger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(false), "info");
        assert_eq!(level_for(true), "debug");
    }
}
