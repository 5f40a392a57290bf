//! Entry names with validation for secure path handling.

use crate::{Error, Result};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Maximum length for entry names (in bytes).
const MAX_PATH_LENGTH: usize = 32768;

/// A validated entry name.
///
/// `ArchivePath` uses forward slashes as separators and guarantees that:
/// - The name is not empty and contains no NUL bytes
/// - The name is relative (does not start with `/`)
/// - No empty segments exist (no `//`)
/// - No `.` or `..` segments are present (prevents path traversal)
///
/// # Examples
///
/// ```
/// use zipset::ArchivePath;
///
/// let path = ArchivePath::new("dir/file.txt").unwrap();
/// assert_eq!(path.as_str(), "dir/file.txt");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// Backslashes are treated as separators and converted to `/`.
    pub fn new(s: &str) -> Result<Self> {
        let normalized = s.replace('\\', "/");
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Builds the entry name of `file` relative to `folder`.
    ///
    /// The folder prefix and any leading separator are stripped and the
    /// remaining components are joined with `/`, so the relative directory
    /// structure is preserved inside the archive.
    pub fn relative_to(folder: &Path, file: &Path) -> Result<Self> {
        let relative = file.strip_prefix(folder).map_err(|_| {
            Error::InvalidArchivePath(format!(
                "'{}' is not inside '{}'",
                file.display(),
                folder.display()
            ))
        })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => {
                    return Err(Error::InvalidArchivePath(format!(
                        "unexpected component in '{}'",
                        relative.display()
                    )));
                }
            }
        }
        Self::new(&segments.join("/"))
    }

    /// Returns the base name of `file` as an entry name.
    pub fn file_name_of(file: &Path) -> Result<Self> {
        let name = file
            .file_name()
            .ok_or_else(|| Error::InvalidArchivePath(format!("'{}' has no file name", file.display())))?;
        Self::new(&name.to_string_lossy())
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }

        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.starts_with('/') || has_drive_prefix(s) {
            return Err(Error::InvalidArchivePath(
                "absolute path not allowed".into(),
            ));
        }

        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidArchivePath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidArchivePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidArchivePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns true if the name ends with `ext`, ignoring ASCII case.
    pub fn has_extension(&self, ext: &str) -> bool {
        let name = self.0.as_bytes();
        let ext = ext.as_bytes();
        name.len() >= ext.len() && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
    }

    /// Resolves this entry below `dest`.
    pub fn to_dest_path(&self, dest: &Path) -> PathBuf {
        let mut path = dest.to_path_buf();
        for segment in self.0.split('/') {
            path.push(segment);
        }
        path
    }
}

/// Rejects `C:` style prefixes so Windows absolute paths never pass.
fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Validates an entry name read from an archive and resolves it under `dest`.
///
/// Directory entries may carry a trailing `/`, which is ignored.
pub(crate) fn safe_dest_path(entry_name: &str, dest: &Path) -> Result<PathBuf> {
    let trimmed = entry_name.trim_end_matches('/');
    let path = ArchivePath::new(trimmed).map_err(|_| Error::PathTraversal {
        path: entry_name.to_string(),
    })?;
    Ok(path.to_dest_path(dest))
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
