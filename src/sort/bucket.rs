//! Extension classification and destination bucket handling.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bucket used for files whose name carries no extension
/// (`README`, `.bashrc`, `name.`). A file literally named `x.no_extension`
/// shares it.
pub const NO_EXTENSION_BUCKET: &str = "no_extension";

/// Lower-cased extension of the final path segment without the leading dot.
/// Empty when the file has none. Non-UTF-8 bytes are replaced, so use
/// [`bucket_dir`] rather than this to place a file.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Directory name for a given extension.
pub fn bucket_name(extension: &str) -> &str {
    if extension.is_empty() {
        NO_EXTENSION_BUCKET
    } else {
        extension
    }
}

/// `destination_root/<bucket>` for `path`.
///
/// UTF-8 extensions are lower-cased; any other extension is used byte for
/// byte, so two distinct non-UTF-8 extensions never share a bucket.
pub fn bucket_dir(destination_root: &Path, path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if !ext.is_empty() => match ext.to_str() {
            Some(utf8) => destination_root.join(utf8.to_lowercase()),
            None => destination_root.join(ext),
        },
        _ => destination_root.join(NO_EXTENSION_BUCKET),
    }
}

/// Make sure `dir` exists.
///
/// Another unit may create the same bucket at the same moment; losing that
/// race is not an error. There is no separate exists-check before creating.
pub fn ensure_bucket(dir: &Path) -> io::Result<()> {
    match fs::create_dir(dir) {
        Ok(()) => {
            info!(path = %dir.display(), "Created bucket directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if dir.is_dir() {
                debug!(path = %dir.display(), "Bucket already present");
                Ok(())
            } else {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("'{}' exists and is not a directory", dir.display()),
                ))
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            // Destination root itself vanished or was never created.
            fs::create_dir_all(dir)?;
            info!(path = %dir.display(), "Created bucket directory");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn extension_is_lowercased_and_dot_stripped() {
        assert_eq!(extension_of(Path::new("a/b/Report.PDF")), "pdf");
        assert_eq!(extension_of(Path::new("archive.tar.gz")), "gz");
        assert_eq!(extension_of(Path::new("photo.JpEg")), "jpeg");
    }

    #[test]
    fn names_without_suffix_have_empty_extension() {
        assert_eq!(extension_of(Path::new("root_file1")), "");
        assert_eq!(extension_of(Path::new("dir/.bashrc")), "");
        assert_eq!(extension_of(Path::new("trailing.")), "");
    }

    #[test]
    fn empty_extension_maps_to_designated_bucket() {
        assert_eq!(bucket_name(""), NO_EXTENSION_BUCKET);
        assert_eq!(bucket_name("txt"), "txt");
        assert_eq!(
            bucket_dir(Path::new("/out"), Path::new("/src/Makefile")),
            PathBuf::from("/out").join(NO_EXTENSION_BUCKET)
        );
        assert_eq!(
            bucket_dir(Path::new("/out"), Path::new("/src/x/notes.TXT")),
            PathBuf::from("/out/txt")
        );
    }

    #[test]
    fn literal_no_extension_suffix_shares_the_bucket() {
        assert_eq!(
            bucket_dir(Path::new("/out"), Path::new("/src/odd.no_extension")),
            bucket_dir(Path::new("/out"), Path::new("/src/README"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_extensions_keep_distinct_buckets() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = Path::new(OsStr::from_bytes(b"/src/a.\xffx"));
        let b = Path::new(OsStr::from_bytes(b"/src/b.\xfex"));
        let da = bucket_dir(Path::new("/out"), a);
        let db = bucket_dir(Path::new("/out"), b);
        assert_ne!(da, db);
        assert_eq!(da.file_name().unwrap().as_bytes(), b"\xffx");
        // The lossy form used for logs collapses both.
        assert_eq!(extension_of(a), extension_of(b));
    }

    #[test]
    fn ensure_bucket_is_idempotent() {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path().join("txt");
        ensure_bucket(&dir).unwrap();
        ensure_bucket(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn ensure_bucket_rejects_file_in_the_way() {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path().join("pdf");
        fs::write(&dir, b"not a dir").unwrap();
        let err = ensure_bucket(&dir).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn ensure_bucket_creates_missing_root() {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path().join("out").join("png");
        ensure_bucket(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn racing_creators_all_succeed() {
        let td = tempfile::tempdir().unwrap();
        let dir = Arc::new(td.path().join("mp4"));
        let start = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = Arc::clone(&dir);
                let start = Arc::clone(&start);
                thread::spawn(move || {
                    start.wait();
                    ensure_bucket(&dir)
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap().expect("no creator should fail");
        }
        assert!(dir.is_dir());
    }
}
