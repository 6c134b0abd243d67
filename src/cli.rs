//! CLI definition and parsing.
//!
//! Notes:
//! - `--debug` is a shorthand for `--log-level debug` and wins over it.
//! - Flags override values from the config file.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};

/// Copy every file of a folder tree into per-extension subfolders.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Sort files into folders by extension, copying in parallel"
)]
pub struct Args {
    /// Folder whose files (recursively) are sorted.
    #[arg(
        value_name = "SOURCE_FOLDER",
        value_hint = ValueHint::DirPath,
        required_unless_present = "print_config"
    )]
    pub source_folder: Option<PathBuf>,

    /// Folder receiving one subfolder per extension; created if missing.
    #[arg(
        value_name = "OUTPUT_FOLDER",
        value_hint = ValueHint::DirPath,
        required_unless_present = "print_config"
    )]
    pub output_folder: Option<PathBuf>,

    /// Maximum number of files copied at the same time (default 5).
    #[arg(long, value_name = "N", value_parser = parse_max_tasks)]
    pub max_tasks: Option<usize>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Set log level: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Also append logs to this file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long)]
    pub json: bool,

    /// Log what would be copied, but do not create or write anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the config file location in use and exit.
    #[arg(long)]
    pub print_config: bool,
}

fn parse_max_tasks(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".into()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("not a positive integer: {e}")),
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config value).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(src) = &self.source_folder {
            cfg.source_root = src.clone();
        }
        if let Some(out) = &self.output_folder {
            cfg.output_root = out.clone();
        }
        if let Some(n) = self.max_tasks {
            cfg.max_tasks = n;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
