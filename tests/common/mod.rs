#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Files of the mock source tree, relative to its root.
pub const MOCK_FILES: &[&str] = &[
    "folder1/test1.txt",
    "folder1/test2.pdf",
    "folder1/image1.jpg",
    "folder2/test3.docx",
    "folder2/image2.png",
    "folder2/video1.mp4",
    "root_file1.txt",
    "root_image.jpg",
];

/// Write `files` under `root`; each file's content is its own relative path.
pub fn write_tree(root: &Path, files: &[&str]) {
    for rel in files {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, rel.as_bytes()).unwrap();
    }
}

/// Build the mock tree under `root/source` and return its path.
pub fn mock_source(root: &Path) -> PathBuf {
    let src = root.join("source");
    write_tree(&src, MOCK_FILES);
    src
}

/// Every regular file below `root`, relative to it, with `/` separators.
pub fn relative_files(root: &Path) -> BTreeSet<String> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect()
}

pub fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
