//! Path utilities for locating test data files.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test file in multiple locations.
///
/// Checks `TEST_DATA_DIR` (if set), then `crates/netcdf-parser/testdata/`,
/// then the workspace-level `testdata/`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/netcdf-parser/testdata").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory for test output.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Creates a temporary directory holding the given files, each with the
/// given contents. Names ending in `/` become subdirectories.
pub fn temp_dir_with_files(files: &[(&str, &[u8])]) -> tempfile::TempDir {
    let dir = temp_test_dir();
    for (name, contents) in files {
        let path = dir.path().join(name.trim_end_matches('/'));
        if name.ends_with('/') {
            std::fs::create_dir_all(&path).expect("Failed to create test subdirectory");
        } else {
            write_file(&path, contents);
        }
    }
    dir
}

fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create test directory");
    }
    std::fs::write(path, contents).expect("Failed to write test file");
}
