//! Filesystem helpers used by the writer and the extractor.
//!
//! Directory listing is done with `walkdir` and file name matching with
//! `glob` patterns, so `"*.xml"` behaves the same on every platform.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Pattern that matches every file (the default folder filter).
pub const MATCH_ALL: &str = "*.*";

/// Creates `dir` (and its parents) if it does not exist yet.
///
/// Returns false for an empty path or when the directory cannot be created.
pub fn ensure_dir(dir: impl AsRef<Path>) -> bool {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return false;
    }
    if dir.is_dir() {
        return true;
    }
    match std::fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to create directory '{}': {}", dir.display(), e);
            false
        }
    }
}

/// Compiled file name filter.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pattern: Pattern,
    match_all: bool,
}

impl FileFilter {
    /// Compiles a file name pattern such as `*.xml`.
    ///
    /// `*.*` and `*` match every file, including names without an extension.
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            match_all: pattern == MATCH_ALL || pattern == "*",
        })
    }

    /// Returns true if `file_name` matches this filter.
    pub fn matches(&self, file_name: &str) -> bool {
        if self.match_all {
            return true;
        }
        let options = MatchOptions {
            case_sensitive: cfg!(not(windows)),
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.pattern.matches_with(file_name, options)
    }
}

/// Lists the files under `folder` whose names match `filter`.
///
/// With `recursive` set, subdirectories are searched too. The result is
/// sorted by path so archives built from it are reproducible.
pub fn list_files(folder: &Path, filter: &FileFilter, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(folder).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let message = e.to_string();
            Error::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other(message)),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if filter.matches(&name) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
