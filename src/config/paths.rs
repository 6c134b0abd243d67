//! Config file location and log path safety checks.

use dirs::config_dir;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "EXT_SORTER_CONFIG";

/// Config file in use: `$EXT_SORTER_CONFIG` if set, else the OS config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("ext_sorter");
        base.push("config.xml");
        Some(base)
    } else {
        env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("ext_sorter")
                .join("config.xml")
        })
    }
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    for anc in path.ancestors().skip(1) {
        if anc.as_os_str().is_empty() {
            continue;
        }
        match fs::symlink_metadata(anc) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tempdir_path_has_no_symlink_ancestor() {
        let td = tempfile::tempdir().unwrap();
        let base = dunce::canonicalize(td.path()).unwrap();
        let log = base.join("logs").join("run.log");
        assert!(!path_has_symlink_ancestor(&log).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_parent_is_detected() {
        let td = tempfile::tempdir().unwrap();
        let base = dunce::canonicalize(td.path()).unwrap();
        let real = base.join("real");
        fs::create_dir_all(&real).unwrap();
        let link = base.join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("run.log")).unwrap());
    }
}
