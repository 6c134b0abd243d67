//! Config validation.
//! Checks the source root before anything is created, then prepares the
//! output root.

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::types::Config;
use crate::errors::SorterError;
use crate::sort::Traverser;

impl Config {
    /// Validate roots and limits; create the output root if it is missing.
    ///
    /// The source root is checked first so a missing source never leaves an
    /// empty output folder behind.
    pub fn validate(&self) -> Result<(), SorterError> {
        if self.max_tasks == 0 {
            return Err(SorterError::InvalidConcurrency(self.max_tasks));
        }

        Traverser::new(&self.source_root)?;
        debug!(path = %self.source_root.display(), "source folder readable");

        ensure_output_root(&self.output_root, self.dry_run)?;

        let src_real = dunce::canonicalize(&self.source_root)
            .unwrap_or_else(|_| self.source_root.clone());
        let out_real = dunce::canonicalize(&self.output_root)
            .unwrap_or_else(|_| self.output_root.clone());
        if src_real == out_real {
            return Err(SorterError::OutputRootInvalid {
                path: self.output_root.clone(),
                reason: "same directory as the source folder".into(),
            });
        }
        if out_real.starts_with(&src_real) {
            warn!(
                source = %src_real.display(),
                output = %out_real.display(),
                "Output folder is inside the source folder; copied files may be visited again"
            );
        }

        info!(
            source = %self.source_root.display(),
            output = %self.output_root.display(),
            max_tasks = self.max_tasks,
            "Config validated"
        );
        Ok(())
    }
}

fn ensure_output_root(path: &Path, dry_run: bool) -> Result<(), SorterError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SorterError::OutputRootInvalid {
            path: path.to_path_buf(),
            reason: "exists but is not a directory".into(),
        }),
        Err(_) if dry_run => {
            info!(path = %path.display(), "dry-run: would create output directory");
            Ok(())
        }
        Err(_) => {
            info!(path = %path.display(), "Creating output directory");
            fs::create_dir_all(path).map_err(|e| SorterError::OutputRootInvalid {
                path: path.to_path_buf(),
                reason: format!("cannot create: {e}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn missing_source_fails_without_creating_output() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let cfg = Config::new(tmp.path().join("missing"), tmp.path().join("out"));
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, SorterError::SourceRootMissing(_)));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn output_is_created_when_absent() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("src").create_dir_all().unwrap();
        let cfg = Config::new(tmp.path().join("src"), tmp.path().join("nested/out"));
        cfg.validate().unwrap();
        assert!(tmp.path().join("nested/out").is_dir());
    }

    #[test]
    fn dry_run_does_not_create_output() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("src").create_dir_all().unwrap();
        let mut cfg = Config::new(tmp.path().join("src"), tmp.path().join("out"));
        cfg.dry_run = true;
        cfg.validate().unwrap();
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn output_that_is_a_file_is_rejected() {
        let tmp = assert_fs::TempDir::new().unwrap();
        tmp.child("src").create_dir_all().unwrap();
        tmp.child("out").write_str("file").unwrap();
        let cfg = Config::new(tmp.path().join("src"), tmp.path().join("out"));
        assert!(matches!(
            cfg.validate().unwrap_err(),
            SorterError::OutputRootInvalid { .. }
        ));
    }

    #[test]
    fn same_source_and_output_is_rejected() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let cfg = Config::new(tmp.path(), tmp.path());
        assert!(matches!(
            cfg.validate().unwrap_err(),
            SorterError::OutputRootInvalid { .. }
        ));
    }

    #[test]
    fn zero_tasks_is_rejected() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let mut cfg = Config::new(tmp.path(), tmp.path().join("out"));
        cfg.max_tasks = 0;
        assert!(matches!(
            cfg.validate().unwrap_err(),
            SorterError::InvalidConcurrency(0)
        ));
    }
}
