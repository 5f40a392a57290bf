//! One-call compression of file lists and folders.

use std::path::Path;

use super::{ArchiveWriter, WriteOptions, WriteResult};
use crate::Result;
use crate::fs::{FileFilter, list_files};

/// Compresses `files` into a new archive, each under its base name.
///
/// Files are added in order. The first empty or missing path ends the batch
/// without an error; the files added before it are kept. Returns `Ok(None)`
/// (and creates nothing) when `files` is empty.
///
/// # Example
///
/// ```rust,no_run
/// use zipset::{WriteOptions, compress_files};
///
/// let options = WriteOptions::new().password("secret").buffer_size_mib(10);
/// compress_files(["a.xml", "b.xml"], "out.zip", options)?;
/// # Ok::<(), zipset::Error>(())
/// ```
pub fn compress_files<I, P>(
    files: I,
    archive: impl AsRef<Path>,
    options: WriteOptions,
) -> Result<Option<WriteResult>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut files = files.into_iter().peekable();
    if files.peek().is_none() {
        return Ok(None);
    }

    let mut writer = ArchiveWriter::create(archive, options)?;
    for file in files {
        let file = file.as_ref();
        if file.as_os_str().is_empty() || !file.is_file() {
            log::debug!("Stopping batch at missing file '{}'", file.display());
            break;
        }
        writer.add_file(file)?;
    }
    writer.finish().map(Some)
}

/// Compresses the files under `folder` matching `pattern` into a new archive.
///
/// Entry names are relative to `folder`. Returns `Ok(None)` without creating
/// an archive if the folder is missing or holds no matching file.
pub fn compress_folder(
    folder: impl AsRef<Path>,
    archive: impl AsRef<Path>,
    pattern: &str,
    recursive: bool,
    options: WriteOptions,
) -> Result<Option<WriteResult>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Ok(None);
    }
    let filter = FileFilter::new(pattern)?;
    let files = list_files(folder, &filter, recursive)?;
    if files.is_empty() {
        log::debug!("No files matching '{}' in '{}'", pattern, folder.display());
        return Ok(None);
    }

    let mut writer = ArchiveWriter::create(archive, options)?;
    writer.add_listed(folder, &files)?;
    writer.finish().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compress_files_stops_at_missing() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let c = temp.path().join("c.txt");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&c, b"c").unwrap();

        let archive = temp.path().join("out.zip");
        let result = compress_files(
            [a, temp.path().join("missing.txt"), c],
            &archive,
            WriteOptions::new(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(result.entries_written, 1);
    }

    #[test]
    fn test_compress_files_empty_list() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("out.zip");
        let none: [&Path; 0] = [];
        assert!(compress_files(none, &archive, WriteOptions::new()).unwrap().is_none());
        assert!(!archive.exists());
    }

    #[test]
    fn test_compress_folder_without_matches() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"a").unwrap();
        let archive = temp.path().join("out").join("x.zip");

        let result = compress_folder(temp.path(), &archive, "*.xml", true, WriteOptions::new());
        assert!(result.unwrap().is_none());
        assert!(!archive.exists());

        let missing = compress_folder(temp.path().join("nope"), &archive, "*.*", true, WriteOptions::new());
        assert!(missing.unwrap().is_none());
    }

    #[test]
    fn test_compress_folder() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("d")).unwrap();
        std::fs::write(src.join("a.xml"), b"<a/>").unwrap();
        std::fs::write(src.join("d").join("b.xml"), b"<b/>").unwrap();

        let archive = temp.path().join("out.zip");
        let result = compress_folder(&src, &archive, "*.*", true, WriteOptions::new())
            .unwrap()
            .unwrap();
        assert_eq!(result.entries_written, 2);
        assert_eq!(result.archive_path, archive);
    }
}
