//! Archive container adapter.
//!
//! The container format itself (ZIP with Deflate, WinZip AES-256 when a
//! password is set) comes from the `zip` crate. This module narrows it down to
//! what the writer, the extractor and the transformer need: start an entry,
//! write bytes, finish; list entries, open one for reading. Password failures
//! are mapped to [`Error::WrongPassword`] here so the callers never see codec
//! specifics.

use std::io::{self, Read, Seek, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use crate::{ArchivePath, Error, Password, Result};

/// Default compression level (0-9).
pub const DEFAULT_LEVEL: u32 = 6;

/// Highest accepted compression level.
pub const MAX_LEVEL: u32 = 9;

/// Entries at or above this size need ZIP64 records.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Write side of an open archive.
pub(crate) struct ArchiveSink<W: Write + Seek> {
    inner: ZipWriter<W>,
    level: u32,
    password: Option<Password>,
}

impl<W: Write + Seek> ArchiveSink<W> {
    /// Starts a new archive on `sink`. Empty passwords disable encryption.
    pub(crate) fn new(sink: W, level: u32, password: Option<Password>) -> Self {
        Self {
            inner: ZipWriter::new(sink),
            level: level.min(MAX_LEVEL),
            password: Password::non_empty(password),
        }
    }

    /// Closes the previous entry (if any) and opens `name` for writing.
    pub(crate) fn start_entry(&mut self, name: &ArchivePath, size: u64) -> Result<()> {
        let options = SimpleFileOptions::default().large_file(size >= ZIP64_THRESHOLD);
        // Deflate has no level 0; store instead.
        let options = if self.level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.level as _))
        };

        match &self.password {
            Some(password) => self.inner.start_file(
                name.as_str(),
                options.with_aes_encryption(AesMode::Aes256, password.as_str()),
            )?,
            None => self.inner.start_file(name.as_str(), options)?,
        }
        Ok(())
    }

    /// Writes the central directory and returns the underlying sink.
    pub(crate) fn finish(self) -> Result<W> {
        Ok(self.inner.finish()?)
    }
}

impl<W: Write + Seek> Write for ArchiveSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Metadata of one entry, read without decoding its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryInfo {
    /// Entry name as stored in the archive (forward slashes).
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Whether the entry content is encrypted.
    pub encrypted: bool,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Last modification time, when the archive records a valid one.
    pub modified: Option<zip::DateTime>,
}

/// Read side of an open archive.
pub(crate) struct ArchiveSource<R: Read + Seek> {
    inner: ZipArchive<R>,
    password: Option<Password>,
}

impl<R: Read + Seek> ArchiveSource<R> {
    /// Opens an archive. Empty passwords count as no password.
    pub(crate) fn new(reader: R, password: Option<Password>) -> Result<Self> {
        Ok(Self {
            inner: ZipArchive::new(reader)?,
            password: Password::non_empty(password),
        })
    }

    /// Number of entries, in archive order.
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if a non-empty password was supplied.
    pub(crate) fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Reads the metadata of entry `index`.
    pub(crate) fn entry_info(&mut self, index: usize) -> Result<EntryInfo> {
        let file = self.inner.by_index_raw(index)?;
        Ok(EntryInfo {
            name: file.name().to_string(),
            size: file.size(),
            encrypted: file.encrypted(),
            is_dir: file.is_dir(),
            modified: file.last_modified().into(),
        })
    }

    /// Opens entry `index` for streaming decompression.
    ///
    /// Fails with [`Error::WrongPassword`] if the entry is encrypted and the
    /// password is missing or rejected by the codec.
    pub(crate) fn open_entry(&mut self, index: usize, info: &EntryInfo) -> Result<impl Read + '_> {
        let opened = match (&self.password, info.encrypted) {
            (Some(password), true) => self.inner.by_index_decrypt(index, password.as_bytes()),
            (None, true) => return Err(Error::wrong_password(&info.name)),
            (_, false) => self.inner.by_index(index),
        };
        opened.map_err(|e| match e {
            ZipError::InvalidPassword => Error::wrong_password(&info.name),
            other => Error::Codec(other),
        })
    }
}

/// Classifies a read failure on an entry stream.
///
/// For encrypted entries a decode failure is how a wrong password shows up
/// (the codec's quick check passes for a small share of wrong passwords).
pub(crate) fn classify_read_error(info: &EntryInfo, error: io::Error) -> Error {
    if info.encrypted {
        log::debug!("Read failed on encrypted entry '{}': {}", info.name, error);
        Error::wrong_password(&info.name)
    } else {
        Error::Io(error)
    }
}
