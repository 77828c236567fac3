//! Path utilities for test files.

use std::io::Write;
use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes `contents` to a temporary `.yaml` file.
///
/// The file is removed when the returned handle is dropped, so keep it alive
/// for as long as the path is in use.
pub fn write_scenario_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("scenario_")
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temporary scenario file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary scenario file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        // Should contain Cargo.toml at workspace level
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_temp_test_dir() {
        let dir = temp_test_dir();
        assert!(dir.path().exists());
        // Dir is cleaned up when dropped
    }

    #[test]
    fn test_write_scenario_file() {
        let file = write_scenario_file("name: x\n");
        let path = file.path().to_path_buf();
        assert!(path.to_string_lossy().ends_with(".yaml"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "name: x\n");
        drop(file);
        assert!(!path.exists());
    }
}
