//! Per-unit outcomes and the aggregated run report.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::hints;

/// Why a copy unit failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    NotFound,
    PermissionDenied,
    Other(String),
}

impl FailureReason {
    /// Classify an I/O error raised while performing `op` on `path`.
    pub fn from_io(op: &str, path: &Path, e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => FailureReason::NotFound,
            io::ErrorKind::PermissionDenied => FailureReason::PermissionDenied,
            _ => FailureReason::Other(hints::describe(op, path, e)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::NotFound => "not_found",
            FailureReason::PermissionDenied => "permission_denied",
            FailureReason::Other(_) => "other_io",
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            FailureReason::NotFound => 40,
            FailureReason::PermissionDenied => 41,
            FailureReason::Other(_) => 49,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound => f.write_str("file not found"),
            FailureReason::PermissionDenied => f.write_str("permission denied"),
            FailureReason::Other(msg) => f.write_str(msg),
        }
    }
}

/// Step of the unit that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CreateBucket,
    Read,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::CreateBucket => "create_bucket",
            Stage::Read => "read",
            Stage::Write => "write",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Success { destination: PathBuf, bytes: u64 },
    Failure { reason: FailureReason, stage: Stage },
}

impl CopyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CopyOutcome::Success { .. })
    }
}

/// Outcome of one unit, keyed by the source it processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRecord {
    pub source: PathBuf,
    pub outcome: CopyOutcome,
}

/// Everything a run produced.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// One record per submitted unit, in completion order.
    pub records: Vec<UnitRecord>,
    /// Traversal entries that could not be read and were skipped.
    pub walk_errors: u64,
    /// Total bytes written to destination buckets.
    pub bytes_copied: u64,
    /// Highest number of units admitted at the same time.
    pub peak_in_flight: usize,
    /// Admission stopped early on request.
    pub interrupted: bool,
    /// Nothing was written.
    pub dry_run: bool,
}

impl RunReport {
    pub fn submitted(&self) -> usize {
        self.records.len()
    }

    pub fn copied(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.submitted() - self.copied()
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitRecord> {
        self.records.iter().filter(|r| !r.outcome.is_success())
    }

    /// Outcome recorded for `source`, if it was submitted.
    pub fn outcome_for(&self, source: &Path) -> Option<&CopyOutcome> {
        self.records
            .iter()
            .find(|r| r.source == source)
            .map(|r| &r.outcome)
    }

    /// True for a non-empty run in which no unit succeeded.
    pub fn all_failed(&self) -> bool {
        !self.records.is_empty() && self.copied() == 0
    }

    /// One-line summary used for logs and the CLI.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "submitted={} copied={} failed={} bytes={} walk_errors={} peak_in_flight={}",
            self.submitted(),
            self.copied(),
            self.failed(),
            self.bytes_copied,
            self.walk_errors,
            self.peak_in_flight
        );
        if self.dry_run {
            line.push_str(" (dry-run)");
        }
        if self.interrupted {
            line.push_str(" (interrupted)");
        }
        line
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Mutable accumulator shared by the units of a run.
#[derive(Debug, Default)]
pub struct RunReportBuilder {
    records: Vec<UnitRecord>,
    bytes_copied: u64,
}

impl RunReportBuilder {
    pub fn record(&mut self, source: PathBuf, outcome: CopyOutcome) {
        if let CopyOutcome::Success { bytes, .. } = &outcome {
            self.bytes_copied += bytes;
        }
        self.records.push(UnitRecord { source, outcome });
    }

    /// Finish the report. `walk_errors` starts at zero; only a traversal
    /// knows about skipped entries, and [`sort_tree`](super::sort_tree) adds them.
    pub fn build(self, peak_in_flight: usize, interrupted: bool, dry_run: bool) -> RunReport {
        RunReport {
            records: self.records,
            walk_errors: 0,
            bytes_copied: self.bytes_copied,
            peak_in_flight,
            interrupted,
            dry_run,
        }
    }
}
