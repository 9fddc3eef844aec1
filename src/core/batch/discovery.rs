//! Record-file discovery
//!
//! Recursively lists the record files under an input root in lexicographic
//! path order, so progress percentages and log ordering are reproducible across
//! runs on the same tree.

use crate::config::BatchConfig;
use crate::domain::errors::BatchError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists every file under `root` whose extension is configured as a record file
///
/// # Errors
///
/// Returns [`BatchError::Discovery`] if any part of the tree cannot be read.
pub fn discover_records(root: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(config.follow_links) {
        let entry = entry.map_err(|e| BatchError::Discovery {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;

        if entry.file_type().is_file() && config.matches_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();

    tracing::debug!(root = %root.display(), count = files.len(), "Discovered record files");

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discovery_is_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/2.dcm");
        touch(dir.path(), "a.dcm");
        touch(dir.path(), "b/1.DCM");
        touch(dir.path(), "c/d/e/3.dcm");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "b/DICOMDIR");

        let files = discover_records(dir.path(), &BatchConfig::default()).unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(relative, vec!["a.dcm", "b/1.DCM", "b/2.dcm", "c/d/e/3.dcm"]);
    }

    #[test]
    fn test_discovery_empty_tree() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "readme.md");

        let files = discover_records(dir.path(), &BatchConfig::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discovery_custom_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.dicom");
        touch(dir.path(), "b.dcm");

        let config = BatchConfig {
            extensions: vec!["dicom".to_string()],
            follow_links: false,
        };
        let files = discover_records(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.dicom"));
    }

    #[test]
    fn test_discovery_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = discover_records(&dir.path().join("missing"), &BatchConfig::default())
            .unwrap_err();
        assert!(matches!(err, BatchError::Discovery { .. }));
    }
}
