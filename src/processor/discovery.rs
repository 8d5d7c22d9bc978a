//! File discovery module for contact exports
//!
//! Finds the `*.csv` exports directly inside the input directory. Nested
//! directories are not searched.

use crate::error::{ContactError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File discovery component for an input directory
#[derive(Debug)]
pub struct FileDiscovery {
    input_dir: PathBuf,
}

impl FileDiscovery {
    pub fn new(input_dir: PathBuf) -> Self {
        Self { input_dir }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// List CSV exports in the input directory, sorted by file name
    pub fn discover_csv_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(ContactError::DirectoryNotFound {
                path: self.input_dir.clone(),
            });
        }

        let dir = glob::Pattern::escape(&self.input_dir.to_string_lossy());
        let pattern = Path::new(&dir).join("*.csv").to_string_lossy().into_owned();
        debug!("Searching for CSV files matching: {}", pattern);

        let entries = glob::glob(&pattern).map_err(|e| ContactError::Discovery {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if is_csv_file(&path) => files.push(path),
                Ok(path) => debug!("Skipping non-file match: {}", path.display()),
                Err(e) => warn!("Unreadable directory entry: {}", e),
            }
        }

        files.sort();
        debug!("Found {} CSV files", files.len());
        Ok(files)
    }
}

/// Regular file with a lower-case `.csv` extension
fn is_csv_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "csv")
}
