use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail};
use tracing::level_filters::LevelFilter;
use tracing_appender::{
    non_blocking::{self, NonBlocking},
    rolling,
};
use tracing_subscriber::fmt;

/// Where log events go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stdout,
    /// Daily rolling file `<directory>/<prefix>.<date>`.
    File { directory: PathBuf, prefix: String },
}

pub fn parse_level(level: &str) -> anyhow::Result<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        _ => bail!("unknown log level {level:?}"),
    }
}

/// Installs the global subscriber. The returned guard must outlive every
/// event written to a file sink.
pub fn init(
    sink: &LogSink,
    filter: impl Into<LevelFilter>,
) -> anyhow::Result<Option<non_blocking::WorkerGuard>> {
    match sink {
        LogSink::Stdout => setup_tracing_to_stdout(filter).map(|_| None),
        LogSink::File { directory, prefix } => {
            setup_tracing_to_file(directory, prefix, filter).map(Some)
        }
    }
}

pub fn setup_tracing_to_stdout(filter: impl Into<LevelFilter>) -> anyhow::Result<()> {
    fmt()
        .with_max_level(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

pub fn setup_tracing_to_file(
    directory: impl AsRef<Path>,
    file_name_prefix: impl AsRef<Path>,
    filter: impl Into<LevelFilter>,
) -> anyhow::Result<non_blocking::WorkerGuard> {
    let (writer, guard) = file_writer(directory, file_name_prefix);
    fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(filter)
        .try_init()
        .map_err(|e| anyhow!(e))?;

    Ok(guard)
}

fn file_writer(
    directory: impl AsRef<Path>,
    file_name_prefix: impl AsRef<Path>,
) -> (NonBlocking, non_blocking::WorkerGuard) {
    let file_appender = rolling::daily(directory, file_name_prefix);
    tracing_appender::non_blocking(file_appender)
}
