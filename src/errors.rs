//! Typed error definitions for ext_sorter.
//! Run-level failures abort before any copy starts; unit-level failures are
//! never raised as errors and end up in the run report instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SorterError {
    #[error("Source folder does not exist: {0}")]
    SourceRootMissing(PathBuf),

    #[error("Source folder is not a directory: {0}")]
    SourceRootNotDirectory(PathBuf),

    #[error("Cannot read source folder {path}: {source}")]
    SourceRootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Output folder {path} is unusable: {reason}")]
    OutputRootInvalid { path: PathBuf, reason: String },

    #[error("Maximum number of parallel tasks must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl SorterError {
    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self {
            SorterError::SourceRootMissing(_) => 10,
            SorterError::SourceRootNotDirectory(_) => 11,
            SorterError::SourceRootUnreadable { .. } => 12,
            SorterError::OutputRootInvalid { .. } => 20,
            SorterError::InvalidConcurrency(_) => 30,
            SorterError::Interrupted => 130,
        }
    }

    /// Short machine-friendly label used as the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SorterError::SourceRootMissing(_) => "source_root_missing",
            SorterError::SourceRootNotDirectory(_) => "source_root_not_directory",
            SorterError::SourceRootUnreadable { .. } => "source_root_unreadable",
            SorterError::OutputRootInvalid { .. } => "output_root_invalid",
            SorterError::InvalidConcurrency(_) => "invalid_concurrency",
            SorterError::Interrupted => "interrupted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errs = [
            SorterError::SourceRootMissing(PathBuf::from("/a")),
            SorterError::SourceRootNotDirectory(PathBuf::from("/a")),
            SorterError::SourceRootUnreadable {
                path: PathBuf::from("/a"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
            SorterError::OutputRootInvalid {
                path: PathBuf::from("/b"),
                reason: "is a file".into(),
            },
            SorterError::InvalidConcurrency(0),
            SorterError::Interrupted,
        ];
        let mut codes: Vec<u16> = errs.iter().map(SorterError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
    }

    #[test]
    fn missing_root_message_names_path() {
        let e = SorterError::SourceRootMissing(PathBuf::from("/nope/src"));
        assert!(e.to_string().contains("/nope/src"));
        assert_eq!(e.kind(), "source_root_missing");
    }
}
