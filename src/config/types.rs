//! Core configuration types.
//! - Config holds the settings of one sorting run.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::shutdown::StopHandle;
use crate::sort::{CopyOptions, DEFAULT_MAX_TASKS};

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Directory creation, copies and the summary (default)
    #[default]
    Normal,
    /// Adds benign races and skipped entries
    Info,
    /// Everything, including gate waits
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Settings for one run of the sorter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tree to read files from
    pub source_root: PathBuf,
    /// Where extension buckets are created
    pub output_root: PathBuf,
    /// Upper bound on simultaneous copies
    pub max_tasks: usize,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, log what would be copied but do not write anything
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            output_root: PathBuf::new(),
            max_tasks: DEFAULT_MAX_TASKS,
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// Construct a Config for the given roots; other fields use defaults.
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            ..Default::default()
        }
    }

    /// Options for the copy pipeline, wired to `stop`.
    pub fn copy_options(&self, stop: StopHandle) -> CopyOptions {
        CopyOptions {
            destination_root: self.output_root.clone(),
            max_concurrency: self.max_tasks,
            dry_run: self.dry_run,
            stop,
        }
    }
}
