//! Archive writing API.
//!
//! [`ArchiveWriter`] owns one output archive. Entries are added one at a time,
//! each streamed through a single reusable transfer buffer, and the archive is
//! finalized by [`ArchiveWriter::finish`] (or, as a fallback, on drop).
//!
//! # Example
//!
//! ```rust,no_run
//! use zipset::{ArchiveWriter, WriteOptions};
//!
//! let mut writer = ArchiveWriter::create("backup.zip", WriteOptions::new().password("secret"))?;
//! writer.add_file("report.xml")?;
//! writer.add_folder("exports", "*.xml", true)?;
//! writer.add_bytes("notes/readme.txt", b"hello")?;
//!
//! let result = writer.finish()?;
//! println!("Wrote {} entries", result.entries_written);
//! # Ok::<(), zipset::Error>(())
//! ```

mod batch;
pub(crate) mod options;

pub use batch::{compress_files, compress_folder};
pub use options::{WriteOptions, WriteResult};

use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use crate::codec::ArchiveSink;
use crate::copy::{TransferBuffer, copy_chunked, stream_len};
use crate::fs::{FileFilter, ensure_dir, list_files};
use crate::naming::resolve_conflict;
use crate::progress::{EntryTracker, ProgressReporter};
use crate::{ArchivePath, Error, Result};

/// Streaming archive writer.
pub struct ArchiveWriter {
    sink: Option<ArchiveSink<BufWriter<File>>>,
    path: PathBuf,
    name: String,
    buffer: TransferBuffer,
    progress: Option<Box<dyn ProgressReporter>>,
    entries_written: usize,
    total_size: u64,
}

impl ArchiveWriter {
    /// Creates the archive file at `path`.
    ///
    /// Missing parent directories are created. With
    /// [`WriteOptions::resolve_conflict`] set, an existing file is never
    /// overwritten; a `(n)` marker is added to the name instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: impl AsRef<Path>, options: WriteOptions) -> Result<Self> {
        let requested = path.as_ref();
        if requested.as_os_str().is_empty() {
            return Err(Error::InvalidArchivePath("empty archive path".into()));
        }
        if let Some(parent) = requested.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent);
        }

        let path = if options.resolve_conflict {
            resolve_conflict(requested)
        } else {
            requested.to_path_buf()
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file = File::create(&path)?;
        let encrypted = options.password.as_ref().is_some_and(|p| !p.is_empty());
        let sink = ArchiveSink::new(BufWriter::new(file), options.level, options.password);
        log::debug!(
            "Opened archive '{}' (level {}, encrypted: {})",
            path.display(),
            options.level,
            encrypted
        );

        Ok(Self {
            sink: Some(sink),
            path,
            name,
            buffer: TransferBuffer::new(options.buffer_size),
            progress: options.progress,
            entries_written: 0,
            total_size: 0,
        })
    }

    /// File name of the archive being written.
    pub fn archive_name(&self) -> &str {
        &self.name
    }

    /// Full path of the archive being written.
    pub fn archive_path(&self) -> &Path {
        &self.path
    }

    /// Number of entries added so far.
    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Changes the transfer buffer size.
    ///
    /// Only takes effect before the first entry is added; returns false once
    /// the buffer is in use.
    pub fn set_buffer_size(&mut self, bytes: usize) -> bool {
        self.buffer.resize(bytes)
    }

    /// Adds a file under its base name.
    ///
    /// Does nothing if `path` is empty or does not name an existing file.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !path.is_file() {
            log::debug!("Skipping missing file '{}'", path.display());
            return Ok(());
        }
        let entry_name = ArchivePath::file_name_of(path)?;
        let mut file = File::open(path)?;
        self.add_entry(&entry_name, &mut file)
    }

    /// Adds every file under `folder` whose name matches `pattern`.
    ///
    /// Entry names keep the directory structure relative to `folder`. Files are
    /// added in path order. Does nothing if the folder does not exist.
    pub fn add_folder(&mut self, folder: impl AsRef<Path>, pattern: &str, recursive: bool) -> Result<()> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            log::debug!("Skipping missing folder '{}'", folder.display());
            return Ok(());
        }
        let filter = FileFilter::new(pattern)?;
        let files = list_files(folder, &filter, recursive)?;
        self.add_listed(folder, &files)
    }

    /// Adds already-listed files below `folder`, named relative to it.
    pub(crate) fn add_listed(&mut self, folder: &Path, files: &[PathBuf]) -> Result<()> {
        for file in files {
            let entry_name = ArchivePath::relative_to(folder, file)?;
            let mut source = File::open(file)?;
            self.add_entry(&entry_name, &mut source)?;
        }
        Ok(())
    }

    /// Adds an entry whose content is read from `content`.
    ///
    /// The entry length is the number of bytes between the current position
    /// and the end of `content`. Does nothing if `entry_name` is empty.
    pub fn add_stream(&mut self, entry_name: &str, mut content: impl Read + Seek) -> Result<()> {
        if entry_name.is_empty() {
            return Ok(());
        }
        let entry_name = ArchivePath::new(entry_name)?;
        self.add_entry(&entry_name, &mut content)
    }

    /// Adds an entry from a byte slice.
    pub fn add_bytes(&mut self, entry_name: &str, data: &[u8]) -> Result<()> {
        self.add_stream(entry_name, Cursor::new(data))
    }

    fn add_entry<R: Read + Seek>(&mut self, entry_name: &ArchivePath, content: &mut R) -> Result<()> {
        let position = content.stream_position()?;
        let total = stream_len(content)?.saturating_sub(position);

        let sink = self.sink.as_mut().ok_or_else(finalized)?;
        sink.start_entry(entry_name, total)?;
        log::debug!("Adding entry '{}' ({} bytes)", entry_name, total);

        let mut tracker = EntryTracker::start(
            self.progress.as_deref_mut(),
            &self.name,
            entry_name.as_str(),
            total,
        );
        let copied = copy_chunked(content, sink, self.buffer.get(), |done| {
            tracker.chunk(done)
        })?;
        tracker.complete(copied);

        if copied != total {
            log::warn!(
                "Entry '{}' changed while being added: expected {} bytes, copied {}",
                entry_name,
                total,
                copied
            );
        }
        self.entries_written += 1;
        self.total_size += copied;
        Ok(())
    }

    /// Finalizes the archive and returns what was written.
    ///
    /// The completion event is raised with the final archive size.
    pub fn finish(mut self) -> Result<WriteResult> {
        self.finalize()
    }

    fn finalize(&mut self) -> Result<WriteResult> {
        let Some(sink) = self.sink.take() else {
            return Err(finalized());
        };
        self.buffer.release();

        let outcome = sink.finish().and_then(|mut writer| {
            writer.flush()?;
            Ok(writer.get_ref().metadata()?.len())
        });
        let archive_size = match &outcome {
            Ok(len) => *len,
            Err(_) => std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
        };
        if let Some(reporter) = self.progress.as_deref_mut() {
            reporter.on_archive_complete(&self.name, archive_size);
        }
        let archive_size = outcome?;

        log::debug!(
            "Finalized archive '{}': {} entries, {} bytes",
            self.path.display(),
            self.entries_written,
            archive_size
        );
        Ok(WriteResult {
            archive_path: self.path.clone(),
            entries_written: self.entries_written,
            total_size: self.total_size,
            archive_size,
        })
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if self.sink.is_none() {
            return;
        }
        if let Err(e) = self.finalize() {
            log::warn!(
                "Failed to finalize archive '{}' on drop: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn finalized() -> Error {
    Error::Io(io::Error::other("archive has already been finalized"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ChannelProgress;
    use crate::progress::ProgressEvent;
    use tempfile::TempDir;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index_raw(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_create_makes_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("out.zip");
        let writer = ArchiveWriter::create(&path, WriteOptions::new()).unwrap();
        assert_eq!(writer.archive_name(), "out.zip");
        writer.finish().unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_create_rejects_empty_path() {
        let err = ArchiveWriter::create("", WriteOptions::new()).err().unwrap();
        assert!(matches!(err, Error::InvalidArchivePath(_)));
    }

    #[test]
    fn test_resolve_conflict_on_create() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        std::fs::write(&path, b"existing").unwrap();

        let writer =
            ArchiveWriter::create(&path, WriteOptions::new().resolve_conflict(true)).unwrap();
        assert_eq!(writer.archive_path(), temp.path().join("out(1).zip"));
        writer.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"existing");
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        let mut writer = ArchiveWriter::create(&path, WriteOptions::new()).unwrap();
        writer.add_bytes("z.txt", b"z").unwrap();
        writer.add_bytes("a/b.txt", b"b").unwrap();
        writer.add_bytes("", b"ignored").unwrap();
        let result = writer.finish().unwrap();

        assert_eq!(result.entries_written, 2);
        assert_eq!(result.total_size, 2);
        assert_eq!(result.archive_size, std::fs::metadata(&path).unwrap().len());
        assert_eq!(entry_names(&path), vec!["z.txt", "a/b.txt"]);
    }

    #[test]
    fn test_add_file_skips_missing() {
        let temp = TempDir::new().unwrap();
        let mut writer =
            ArchiveWriter::create(temp.path().join("out.zip"), WriteOptions::new()).unwrap();
        writer.add_file(temp.path().join("missing.txt")).unwrap();
        writer.add_file("").unwrap();
        assert_eq!(writer.entries_written(), 0);
    }

    #[test]
    fn test_add_folder_relative_names() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("b.xml"), b"b").unwrap();
        std::fs::write(src.join("skip.txt"), b"s").unwrap();
        std::fs::write(src.join("nested").join("a.xml"), b"a").unwrap();

        let path = temp.path().join("out.zip");
        let mut writer = ArchiveWriter::create(&path, WriteOptions::new()).unwrap();
        writer.add_folder(&src, "*.xml", true).unwrap();
        writer.add_folder(temp.path().join("nope"), "*.*", true).unwrap();
        writer.finish().unwrap();

        assert_eq!(entry_names(&path), vec!["b.xml", "nested/a.xml"]);
    }

    #[test]
    fn test_add_stream_counts_from_position() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        let mut writer = ArchiveWriter::create(&path, WriteOptions::new()).unwrap();

        let mut cursor = Cursor::new(b"0123456789".to_vec());
        cursor.set_position(4);
        writer.add_stream("tail.txt", &mut cursor).unwrap();
        let result = writer.finish().unwrap();
        assert_eq!(result.total_size, 6);
    }

    #[test]
    fn test_set_buffer_size_before_first_entry_only() {
        let temp = TempDir::new().unwrap();
        let mut writer =
            ArchiveWriter::create(temp.path().join("out.zip"), WriteOptions::new()).unwrap();
        assert!(writer.set_buffer_size(8));
        writer.add_bytes("a.txt", b"abc").unwrap();
        assert!(!writer.set_buffer_size(16));
    }

    #[test]
    fn test_progress_and_completion_events() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        let (reporter, rx) = ChannelProgress::new(64);
        let options = WriteOptions::new().buffer_size(4).progress(reporter);

        let mut writer = ArchiveWriter::create(&path, options).unwrap();
        writer.add_bytes("e.txt", b"0123456789").unwrap();
        writer.finish().unwrap();

        let events: Vec<_> = rx.iter().collect();
        let done: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Progress { bytes_done, .. } => Some(*bytes_done),
                _ => None,
            })
            .collect();
        assert_eq!(done, vec![4, 8, 10]);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::ArchiveComplete {
                archive: "out.zip".into(),
                bytes: std::fs::metadata(&path).unwrap().len(),
            })
        );
    }

    #[test]
    fn test_drop_finalizes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.zip");
        let (reporter, rx) = ChannelProgress::new(64);
        {
            let mut writer =
                ArchiveWriter::create(&path, WriteOptions::new().progress(reporter)).unwrap();
            writer.add_bytes("kept.txt", b"still here").unwrap();
        }

        assert_eq!(entry_names(&path), vec!["kept.txt"]);
        assert!(
            rx.iter()
                .any(|e| matches!(e, ProgressEvent::ArchiveComplete { .. }))
        );
    }
}
