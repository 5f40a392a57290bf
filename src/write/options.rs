//! Write options and configuration for archive creation.

use std::path::PathBuf;

use crate::Password;
use crate::codec::{DEFAULT_LEVEL, MAX_LEVEL};
use crate::copy::{BYTES_MIB, DEFAULT_WRITE_BUFFER_SIZE};
use crate::progress::ProgressReporter;

/// Options for creating archives.
pub struct WriteOptions {
    /// Compression level (0-9).
    pub level: u32,
    /// Password for encryption. `None` or an empty password writes plain entries.
    pub password: Option<Password>,
    /// Size of the transfer buffer in bytes.
    pub buffer_size: usize,
    /// Whether to pick a non-colliding file name when the archive exists.
    pub resolve_conflict: bool,
    /// Receives per-chunk progress and the completion event.
    pub progress: Option<Box<dyn ProgressReporter>>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            password: None,
            buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            resolve_conflict: false,
            progress: None,
        }
    }
}

impl std::fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteOptions")
            .field("level", &self.level)
            .field("has_password", &self.password.is_some())
            .field("buffer_size", &self.buffer_size)
            .field("resolve_conflict", &self.resolve_conflict)
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

impl WriteOptions {
    /// Creates new write options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level (strict validation).
    ///
    /// Valid values are 0-9, where:
    /// - 0: No compression (store only)
    /// - 1-3: Fast compression, lower ratio
    /// - 4-6: Balanced compression (default is 6)
    /// - 7-9: Maximum compression, slower
    ///
    /// Use [`level_clamped`] instead if you want invalid values to be silently
    /// clamped to 9 rather than returning an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if level is greater than 9.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zipset::WriteOptions;
    ///
    /// let opts = WriteOptions::new().level(9)?;
    /// assert_eq!(opts.level, 9);
    ///
    /// assert!(WriteOptions::new().level(15).is_err());
    /// # Ok::<(), zipset::Error>(())
    /// ```
    ///
    /// [`level_clamped`]: Self::level_clamped
    /// [`Error::InvalidCompressionLevel`]: crate::Error::InvalidCompressionLevel
    pub fn level(mut self, level: u32) -> crate::Result<Self> {
        if level > MAX_LEVEL {
            return Err(crate::Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Sets the compression level, clamping values above 9.
    ///
    /// Use [`level`](Self::level) to reject out-of-range values instead.
    pub fn level_clamped(mut self, level: u32) -> Self {
        self.level = level.min(MAX_LEVEL);
        self
    }

    /// Sets the password. An empty password disables encryption.
    pub fn password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the transfer buffer size in bytes.
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    /// Sets the transfer buffer size in mebibytes.
    pub fn buffer_size_mib(self, mib: u64) -> Self {
        let bytes = mib.saturating_mul(BYTES_MIB);
        self.buffer_size(usize::try_from(bytes).unwrap_or(usize::MAX))
    }

    /// Enables or disables archive name conflict resolution.
    pub fn resolve_conflict(mut self, enabled: bool) -> Self {
        self.resolve_conflict = enabled;
        self
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }
}

/// Result of a finished archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Where the archive was written (after conflict resolution).
    pub archive_path: PathBuf,
    /// Number of entries written.
    pub entries_written: usize,
    /// Total uncompressed bytes.
    pub total_size: u64,
    /// Size of the finalized archive file.
    pub archive_size: u64,
}

impl WriteResult {
    /// Returns the compression ratio (archive size / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.archive_size as f64 / self.total_size as f64
        }
    }

    /// Returns the space savings percentage.
    pub fn space_savings(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }
}
