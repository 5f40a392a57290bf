//! Deterministic renaming of output files.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use sha2::{Digest, Sha256};

use crate::Result;

/// Returns a path that does not overwrite an existing archive.
///
/// If `path` does not exist it is returned unchanged. Otherwise the files in
/// the same directory (non-recursive) matching `<stem>*<ext>` are counted and
/// a `(count)` marker is inserted just before the extension, so `out.zip`
/// becomes `out(1).zip` when it is the only match.
///
/// This is a single pass with no retry loop and assumes a single writer.
pub fn resolve_conflict(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.as_os_str().is_empty() || !path.exists() {
        return path.to_path_buf();
    }

    let count = match count_similar(path) {
        Ok(count) => count,
        Err(e) => {
            log::warn!(
                "Could not scan for conflicts with '{}': {}",
                path.display(),
                e
            );
            return path.to_path_buf();
        }
    };

    if count == 0 {
        return path.to_path_buf();
    }
    let renamed = insert_before_extension(path, &format!("({})", count));
    log::info!(
        "Resolved name conflict: '{}' -> '{}'",
        path.display(),
        renamed.display()
    );
    renamed
}

/// Counts files next to `path` whose names match `<stem>*<ext>`.
fn count_similar(path: &Path) -> io::Result<usize> {
    let (stem, ext) = split_name(path);
    let pattern = Pattern::new(&format!(
        "{}*{}",
        Pattern::escape(&stem),
        Pattern::escape(&ext)
    ))
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && pattern.matches(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}

/// Splits the file name into stem and extension (with its leading dot).
fn split_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, ext)
}

fn insert_before_extension(path: &Path, marker: &str) -> PathBuf {
    let (stem, ext) = split_name(path);
    path.with_file_name(format!("{}{}{}", stem, marker, ext))
}

/// Renames a file so its name carries the SHA-256 digest of its content.
///
/// `report.xml` becomes `report_<hex digest>.xml`. A file already present
/// under the new name is replaced. Returns `Ok(None)` when `path` is empty or
/// does not exist.
pub fn rename_with_digest(path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() || !path.is_file() {
        return Ok(None);
    }

    let digest = {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        format!("{:x}", hasher.finalize())
    };

    let target = insert_before_extension(path, &format!("_{}", digest));
    if target.exists() {
        std::fs::remove_file(&target)?;
    }
    std::fs::rename(path, &target)?;
    log::info!("Renamed '{}' -> '{}'", path.display(), target.display());
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        assert_eq!(resolve_conflict(&path), path);
    }

    #[test]
    fn test_single_conflict_inserts_one() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(resolve_conflict(&path), temp.path().join("out(1).zip"));
    }

    #[test]
    fn test_counts_similar_names() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        std::fs::write(&path, b"x").unwrap();
        std::fs::write(temp.path().join("out(1).zip"), b"x").unwrap();
        std::fs::write(temp.path().join("other.zip"), b"x").unwrap();
        std::fs::write(temp.path().join("out.txt"), b"x").unwrap();
        assert_eq!(resolve_conflict(&path), temp.path().join("out(2).zip"));
    }

    #[test]
    fn test_no_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("archive");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(resolve_conflict(&path), temp.path().join("archive(1)"));
    }

    #[test]
    fn test_special_characters_in_stem() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data[2024].zip");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(
            resolve_conflict(&path),
            temp.path().join("data[2024](1).zip")
        );
    }

    #[test]
    fn test_rename_with_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.xml");
        std::fs::write(&path, b"abc").unwrap();

        let renamed = rename_with_digest(&path).unwrap().unwrap();
        let expected = temp.path().join(
            "report_ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad.xml",
        );
        assert_eq!(renamed, expected);
        assert!(!path.exists());
        assert_eq!(std::fs::read(&expected).unwrap(), b"abc");
    }

    #[test]
    fn test_rename_with_digest_missing() {
        let temp = TempDir::new().unwrap();
        assert!(rename_with_digest(temp.path().join("nope.xml")).unwrap().is_none());
        assert!(rename_with_digest("").unwrap().is_none());
    }
}
