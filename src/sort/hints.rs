//! Human-oriented descriptions of I/O failures.
//!
//! Unit failures that are not "not found" or "permission denied" are reported
//! as free-form messages; this module makes those messages actionable by
//! naming the step, the path and a short hint derived from the OS error.

use std::io;
use std::path::Path;

#[cfg(unix)]
fn hint_for_os_code(code: i32) -> Option<&'static str> {
    match code {
        libc::EACCES | libc::EPERM => Some("permission denied; check ownership and permissions"),
        libc::ENOENT => Some("path not found; it may have been removed during the run"),
        libc::ENOTDIR => Some("a path component is a file, not a directory"),
        libc::EISDIR => Some("expected a file but found a directory"),
        libc::ENOSPC => Some("no space left on the destination device"),
        libc::EROFS => Some("destination is on a read-only filesystem"),
        libc::ENAMETOOLONG => Some("file name or path too long"),
        libc::EMFILE => Some("process file descriptor limit reached; lower --max-tasks"),
        libc::ENFILE => Some("system-wide open file limit reached; lower --max-tasks"),
        libc::EIO => Some("low-level I/O error reported by the device"),
        _ => None,
    }
}

#[cfg(windows)]
fn hint_for_os_code(code: i32) -> Option<&'static str> {
    match code {
        5 => Some("access denied; check permissions"),            // ERROR_ACCESS_DENIED
        2 | 3 => Some("path not found; it may have been removed"), // FILE/PATH NOT FOUND
        32 => Some("sharing violation; file is in use"),           // ERROR_SHARING_VIOLATION
        112 => Some("insufficient disk space"),                    // ERROR_DISK_FULL
        206 => Some("file name or path too long"),                 // ERROR_FILENAME_EXCED_RANGE
        4 => Some("too many open files; lower --max-tasks"),       // ERROR_TOO_MANY_OPEN_FILES
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
fn hint_for_os_code(_code: i32) -> Option<&'static str> {
    None
}

fn hint_for_kind(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and permissions"),
        io::ErrorKind::NotFound => Some("path not found; it may have been removed during the run"),
        io::ErrorKind::InvalidData => Some("data could not be processed"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Some("busy or timed out; retry later"),
        _ => None,
    }
}

/// Hint for `e`, preferring the raw OS code over the portable kind.
pub fn hint(e: &io::Error) -> Option<&'static str> {
    e.raw_os_error()
        .and_then(hint_for_os_code)
        .or_else(|| hint_for_kind(e.kind()))
}

/// `"<op> '<path>': <error> (<hint>) [os code: N]"`
pub fn describe(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{op} '{}': {e}", path.display());
    if let Some(h) = hint(e) {
        msg.push_str(" (");
        msg.push_str(h);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}
