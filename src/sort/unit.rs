//! One classify-and-copy unit of work.

use std::cell::Cell;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use super::bucket::{bucket_dir, ensure_bucket};
use super::report::{CopyOutcome, FailureReason, Stage};

/// Copy `src` into its extension bucket below `destination_root`.
///
/// The whole file is read into memory and then written out, truncating any
/// previous copy. Nothing is cleaned up if the write fails halfway.
pub fn copy_into_bucket(src: &Path, destination_root: &Path, dry_run: bool) -> CopyOutcome {
    copy_tracking_stage(src, destination_root, dry_run, &Cell::new(Stage::CreateBucket))
}

/// [`copy_into_bucket`], recording in `reached` the step currently running so
/// a caller that catches a panic can attribute it.
pub(crate) fn copy_tracking_stage(
    src: &Path,
    destination_root: &Path,
    dry_run: bool,
    reached: &Cell<Stage>,
) -> CopyOutcome {
    let bucket = bucket_dir(destination_root, src);
    let Some(file_name) = src.file_name() else {
        return fail(
            src,
            Stage::Read,
            FailureReason::Other(format!("'{}' has no file name", src.display())),
        );
    };
    let dest = bucket.join(file_name);

    if dry_run {
        info!(src = %src.display(), dest = %dest.display(), "dry-run: would copy file");
        return CopyOutcome::Success {
            destination: dest,
            bytes: 0,
        };
    }

    reached.set(Stage::CreateBucket);
    if let Err(e) = ensure_bucket(&bucket) {
        let reason = FailureReason::from_io("create bucket directory", &bucket, &e);
        return fail(&bucket, Stage::CreateBucket, reason);
    }

    info!(src = %src.display(), dest = %dest.display(), "Copying file");
    reached.set(Stage::Read);
    let data = match fs::read(src) {
        Ok(d) => d,
        Err(e) => return fail(src, Stage::Read, FailureReason::from_io("read source", src, &e)),
    };
    reached.set(Stage::Write);
    if let Err(e) = fs::write(&dest, &data) {
        return fail(&dest, Stage::Write, FailureReason::from_io("write destination", &dest, &e));
    }

    CopyOutcome::Success {
        destination: dest,
        bytes: data.len() as u64,
    }
}

fn fail(path: &Path, stage: Stage, reason: FailureReason) -> CopyOutcome {
    match &reason {
        FailureReason::NotFound => {
            error!(code = reason.code(), kind = reason.kind(), %stage, path = %path.display(), "File not found")
        }
        FailureReason::PermissionDenied => {
            error!(code = reason.code(), kind = reason.kind(), %stage, path = %path.display(), "Permission denied")
        }
        FailureReason::Other(msg) => {
            error!(code = reason.code(), kind = reason.kind(), %stage, path = %path.display(), reason = %msg, "Copy failed")
        }
    }
    CopyOutcome::Failure { reason, stage }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn copies_bytes_into_extension_bucket() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let src = tmp.child("in/Photo.PNG");
        src.write_binary(&[0u8, 159, 146, 150]).unwrap();
        let out = tmp.child("out");

        let outcome = copy_into_bucket(src.path(), out.path(), false);
        let dest = out.path().join("png").join("Photo.PNG");
        assert_eq!(
            outcome,
            CopyOutcome::Success {
                destination: dest.clone(),
                bytes: 4
            }
        );
        assert_eq!(fs::read(dest).unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn overwrites_previous_copy() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let src = tmp.child("in/a.txt");
        src.write_str("new content").unwrap();
        let out = tmp.child("out");
        out.child("txt/a.txt").write_str("old and much longer content").unwrap();

        assert!(copy_into_bucket(src.path(), out.path(), false).is_success());
        out.child("txt/a.txt").assert("new content");
    }

    #[test]
    fn missing_source_is_not_found_at_read_stage() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let out = tmp.child("out");
        let outcome = copy_into_bucket(&tmp.path().join("ghost.txt"), out.path(), false);
        assert_eq!(
            outcome,
            CopyOutcome::Failure {
                reason: FailureReason::NotFound,
                stage: Stage::Read
            }
        );
    }

    #[test]
    fn bucket_blocked_by_file_fails_at_bucket_stage() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let src = tmp.child("in/report.pdf");
        src.write_str("%PDF").unwrap();
        let out = tmp.child("out");
        out.child("pdf").write_str("squatter").unwrap();

        match copy_into_bucket(src.path(), out.path(), false) {
            CopyOutcome::Failure { stage, reason } => {
                assert_eq!(stage, Stage::CreateBucket);
                assert!(matches!(reason, FailureReason::Other(_)));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn stage_cell_follows_progress() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let src = tmp.child("in/a.txt");
        src.write_str("a").unwrap();
        let out = tmp.child("out");

        let reached = Cell::new(Stage::CreateBucket);
        assert!(copy_tracking_stage(src.path(), out.path(), false, &reached).is_success());
        assert_eq!(reached.get(), Stage::Write);

        let reached = Cell::new(Stage::CreateBucket);
        let ghost = tmp.path().join("in/ghost.txt");
        copy_tracking_stage(&ghost, out.path(), false, &reached);
        assert_eq!(reached.get(), Stage::Read);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let src = tmp.child("in/notes.md");
        src.write_str("# hi").unwrap();
        let out = tmp.child("out");

        let outcome = copy_into_bucket(src.path(), out.path(), true);
        assert!(outcome.is_success());
        assert!(!out.path().exists());
    }

    #[test]
    fn extensionless_file_lands_in_no_extension_bucket() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let src = tmp.child("in/root_file1");
        src.write_str("plain").unwrap();
        let out = tmp.child("out");

        assert!(copy_into_bucket(src.path(), out.path(), false).is_success());
        out.child("no_extension/root_file1").assert("plain");
    }
}
