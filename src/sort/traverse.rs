//! Source tree traversal.
//!
//! Streams regular files (and symlinks to them) under a root using walkdir,
//! so memory grows with tree depth rather than file count. Unreadable entries below the root are
//! logged and skipped; only a bad root is fatal.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::SorterError;

#[derive(Debug, Clone)]
pub struct Traverser {
    root: PathBuf,
    skipped: Arc<AtomicU64>,
}

impl Traverser {
    /// Check that `root` is a readable directory and prepare a traverser.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SorterError> {
        let root = root.into();
        check_root(&root)?;
        Ok(Self {
            root,
            skipped: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries skipped so far because they could not be read, across all walks.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Start a fresh walk yielding every regular file below the root.
    ///
    /// Symlinked directories are not descended into. A symlink is yielded when
    /// its target is a regular file, and also when the target cannot be
    /// resolved (dangling link), so the copy reports it as a failure.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + use<> {
        let skipped = Arc::clone(&self.skipped);
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(e) if e.file_type().is_file() => Some(e.into_path()),
                Ok(e) if e.file_type().is_symlink() => symlink_target_file(e.into_path()),
                Ok(e) => {
                    if !e.file_type().is_dir() {
                        debug!(path = %e.path().display(), "Skipping non-regular entry");
                    }
                    None
                }
                Err(err) => {
                    skipped.fetch_add(1, Ordering::Relaxed);
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<unknown>".into());
                    warn!(kind = "source_entry_unreadable", %path, error = %err, "Skipping unreadable entry");
                    None
                }
            })
    }
}

fn symlink_target_file(link: PathBuf) -> Option<PathBuf> {
    match fs::metadata(&link) {
        Ok(meta) if meta.is_file() => Some(link),
        Ok(_) => {
            debug!(path = %link.display(), "Skipping symlink to a non-regular target");
            None
        }
        Err(e) => {
            debug!(path = %link.display(), error = %e, "Symlink target unresolved; submitting anyway");
            Some(link)
        }
    }
}

fn check_root(root: &Path) -> Result<(), SorterError> {
    let meta = match fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SorterError::SourceRootMissing(root.to_path_buf()));
        }
        Err(source) => {
            return Err(SorterError::SourceRootUnreadable {
                path: root.to_path_buf(),
                source,
            });
        }
    };
    if !meta.is_dir() {
        return Err(SorterError::SourceRootNotDirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|source| SorterError::SourceRootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}
