//! Archive extraction.
//!
//! [`extract`] walks the entries of an archive in order and writes each one
//! below the target folder through the chunked copy. A wrong or missing
//! password is not an error: it is reported as
//! [`UnCompressStatus::InvalidPassword`], detected when an entry fails to
//! open or decode.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipset::{ExtractOptions, UnCompressStatus, extract};
//!
//! match extract("backup.zip", "./restored", ExtractOptions::new().password("secret"))? {
//!     UnCompressStatus::Success => println!("done"),
//!     UnCompressStatus::InvalidPassword => eprintln!("wrong password"),
//!     other => eprintln!("not extracted: {:?}", other),
//! }
//! # Ok::<(), zipset::Error>(())
//! ```

pub(crate) mod options;

pub use options::ExtractOptions;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::Result;
use crate::archive_path::safe_dest_path;
use crate::codec::{ArchiveSource, EntryInfo, classify_read_error};
use crate::copy::{CopyError, TransferBuffer, copy_chunked};
use crate::progress::{EntryTracker, ProgressReporter};

/// Outcome of [`extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnCompressStatus {
    /// The archive file does not exist; nothing was attempted.
    ArchiveNotFound,
    /// An entry could not be decoded with the given password.
    InvalidPassword,
    /// A password was given but the archive had no file entry to check it on.
    PasswordUnverified,
    /// Every entry was extracted.
    Success,
}

impl UnCompressStatus {
    /// Returns true for [`UnCompressStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Extracts every entry of `archive` below `target`.
///
/// Directory structure is recreated from the entry names. Extraction stops at
/// the first entry that fails to decode; files written before that point are
/// kept.
///
/// # Errors
///
/// Returns an error for I/O failures, an unreadable container, or an entry
/// name that would escape `target`.
pub fn extract(
    archive: impl AsRef<Path>,
    target: impl AsRef<Path>,
    mut options: ExtractOptions,
) -> Result<UnCompressStatus> {
    let archive = archive.as_ref();
    let target = target.as_ref();
    if !archive.is_file() {
        log::debug!("Archive '{}' not found", archive.display());
        return Ok(UnCompressStatus::ArchiveNotFound);
    }

    let archive_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let reader = BufReader::new(File::open(archive)?);
    let mut source = ArchiveSource::new(reader, options.password.take())?;
    std::fs::create_dir_all(target)?;

    let mut buffer = TransferBuffer::new(options.buffer_size);
    let mut files_extracted = 0usize;

    for index in 0..source.len() {
        let info = source.entry_info(index)?;
        let dest = safe_dest_path(&info.name, target)?;
        if info.is_dir {
            std::fs::create_dir_all(&dest)?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let status = extract_entry(
            &mut source,
            index,
            &info,
            &dest,
            buffer.get(),
            options.progress.as_deref_mut(),
            &archive_name,
        )?;
        if status != UnCompressStatus::Success {
            return Ok(status);
        }
        files_extracted += 1;
    }

    if source.has_password() && files_extracted == 0 {
        log::debug!(
            "Archive '{}' has no file entries; password not verified",
            archive.display()
        );
        return Ok(UnCompressStatus::PasswordUnverified);
    }
    log::debug!(
        "Extracted {} entries from '{}' to '{}'",
        files_extracted,
        archive.display(),
        target.display()
    );
    Ok(UnCompressStatus::Success)
}

fn extract_entry<R: std::io::Read + std::io::Seek>(
    source: &mut ArchiveSource<R>,
    index: usize,
    info: &EntryInfo,
    dest: &Path,
    buffer: &mut [u8],
    progress: Option<&mut (dyn ProgressReporter + 'static)>,
    archive_name: &str,
) -> Result<UnCompressStatus> {
    let mut reader = match source.open_entry(index, info) {
        Ok(reader) => reader,
        Err(e) if e.is_password_error() => {
            log::debug!("Cannot open entry '{}': {}", info.name, e);
            return Ok(UnCompressStatus::InvalidPassword);
        }
        Err(e) => return Err(e),
    };

    log::debug!(
        "Extracting '{}' ({} bytes, modified {:?})",
        info.name,
        info.size,
        info.modified
    );
    let mut out = BufWriter::new(File::create(dest)?);
    let mut tracker = EntryTracker::start(progress, archive_name, &info.name, info.size);
    let copied = copy_chunked(&mut reader, &mut out, buffer, |done| tracker.chunk(done));
    let copied = match copied {
        Ok(n) => n,
        Err(CopyError::Source(e)) => {
            let error = classify_read_error(info, e);
            drop(out);
            remove_partial(dest);
            if error.is_password_error() {
                log::debug!("Failed to decode entry '{}': {}", info.name, error);
                return Ok(UnCompressStatus::InvalidPassword);
            }
            return Err(error);
        }
        Err(e @ CopyError::Sink(_)) => return Err(e.into()),
    };
    out.flush()?;
    tracker.complete(copied);
    Ok(UnCompressStatus::Success)
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!(
            "Failed to clean up partial file '{}': {}",
            path.display(),
            e
        );
    }
}
