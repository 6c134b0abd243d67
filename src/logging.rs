//! Tracing initialization.
//!
//! Builds a subscriber with an EnvFilter derived from [`LogLevel`], a compact
//! or JSON stdout layer, and an optional non-blocking file layer.
//!
//! File logging is refused (with a warning) if any ancestor of the log file is
//! a symlink; the run continues with stdout only.

use anyhow::Result;
use chrono::Local;
use std::fmt as stdfmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogLevel, path_has_symlink_ancestor};
use crate::output as out;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

pub fn level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::INFO,
        LogLevel::Info => LevelFilter::DEBUG,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

/// Filter scoped to this crate, so dependency chatter stays out of the logs.
pub fn env_filter(lvl: LogLevel) -> EnvFilter {
    let level = match level_filter(lvl) {
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
        _ => "info",
    };
    EnvFilter::new(format!("warn,ext_sorter={level}"))
}

/// Formatting layer writing to `writer`, compact or JSON.
pub fn format_layer<S, W>(writer: W, json: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = tsfmt::layer()
        .with_timer(LocalHumanTime)
        .with_level(true)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(writer);
    if json {
        base.json().boxed()
    } else {
        base.compact().boxed()
    }
}

/// Open `path` for appending; new files get mode 0600 on Unix.
pub fn open_log_file_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}

/// Open a non-blocking writer for `path`, or explain on stderr why not.
fn file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            out::print_warn(&format!(
                "Refusing to log to {}: an ancestor directory is a symlink. Logging to stdout only.",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!(
                "Could not check log path {} for symlinks ({e}). Logging to stdout only.",
                path.display()
            ));
            return None;
        }
    }
    match open_log_file_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!(
                "Failed to open log file {}: {e}. Logging to stdout only.",
                path.display()
            ));
            None
        }
    }
}

/// Install the global subscriber. The returned guard (present when a log file
/// is in use) must be kept alive until exit so buffered lines are flushed.
pub fn init_tracing(lvl: LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_file.and_then(file_writer) {
        Some((writer, guard)) => (Some(format_layer(writer, json)), Some(guard)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(lvl))
        .with(format_layer(io::stdout, json))
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}
