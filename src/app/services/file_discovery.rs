//! Discovery of sales export files on disk
//!
//! Inputs given on the command line may be single files or directories. A
//! directory is walked (recursively unless told otherwise) and every file
//! whose name matches the configured glob pattern is collected.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Information about a discovered export file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFileInfo {
    /// Full path to the export
    pub path: PathBuf,

    /// File size in bytes
    pub size_bytes: u64,
}

impl ExportFileInfo {
    /// Get the base filename without path
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Find export files below `root`
///
/// A plain file is returned as-is regardless of the pattern. Results are
/// sorted by path so batch order is stable.
pub fn discover_exports(root: &Path, pattern: &str, recursive: bool) -> Result<Vec<ExportFileInfo>> {
    let metadata = std::fs::metadata(root)
        .map_err(|e| Error::source_unavailable(root.display().to_string(), e))?;

    if metadata.is_file() {
        return Ok(vec![ExportFileInfo {
            path: root.to_path_buf(),
            size_bytes: metadata.len(),
        }]);
    }

    let pattern = Pattern::new(pattern)
        .map_err(|e| Error::configuration(format!("Invalid file pattern '{}': {}", pattern, e)))?;

    info!("Scanning {} for '{}'", root.display(), pattern.as_str());

    let mut walker = WalkDir::new(root).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(format!("Failed to scan {}", root.display()), e)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !pattern.matches_with(&name, MATCH_OPTIONS) {
            debug!("Skipping {}", entry.path().display());
            continue;
        }

        let size_bytes = entry
            .metadata()
            .map_err(|e| Error::directory_traversal(format!("Failed to stat {}", entry.path().display()), e))?
            .len();

        files.push(ExportFileInfo {
            path: entry.into_path(),
            size_bytes,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    info!("Discovered {} export files", files.len());

    Ok(files)
}

/// Discover exports for several inputs, keeping input order
pub fn discover_all(inputs: &[PathBuf], pattern: &str, recursive: bool) -> Result<Vec<ExportFileInfo>> {
    let mut files = Vec::new();
    for input in inputs {
        files.extend(discover_exports(input, pattern, recursive)?);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("janeiro.csv"), "Data;Valor\n").unwrap();
        fs::write(dir.path().join("FEVEREIRO.CSV"), "Data;Valor\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore").unwrap();
        fs::create_dir(dir.path().join("2023")).unwrap();
        fs::write(dir.path().join("2023").join("dezembro.csv"), "Data;Valor\n").unwrap();
        dir
    }

    fn names(files: &[ExportFileInfo]) -> Vec<String> {
        files.iter().map(|f| f.filename()).collect()
    }

    #[test]
    fn test_recursive_discovery_is_sorted_and_case_insensitive() {
        let dir = create_tree();
        let files = discover_exports(dir.path(), "*.csv", true).unwrap();

        // "2023/" sorts before the top-level files
        assert_eq!(names(&files), vec!["dezembro.csv", "FEVEREIRO.CSV", "janeiro.csv"]);
        assert!(files.iter().all(|f| f.size_bytes > 0));
    }

    #[test]
    fn test_non_recursive_discovery() {
        let dir = create_tree();
        let files = discover_exports(dir.path(), "*.csv", false).unwrap();

        assert_eq!(files.len(), 2);
        assert!(!names(&files).contains(&"dezembro.csv".to_string()));
    }

    #[test]
    fn test_single_file_ignores_pattern() {
        let dir = create_tree();
        let path = dir.path().join("notes.txt");
        let files = discover_exports(&path, "*.csv", true).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, path);
    }

    #[test]
    fn test_missing_root_is_source_unavailable() {
        let err = discover_exports(Path::new("/nonexistent/exports"), "*.csv", true).unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = create_tree();
        let err = discover_exports(dir.path(), "[", true).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_discover_all_keeps_input_order() {
        let first = create_tree();
        let second = create_tree();
        let inputs = vec![second.path().join("janeiro.csv"), first.path().to_path_buf()];

        let files = discover_all(&inputs, "*.csv", false).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].path, inputs[0]);
    }
}
