//! Extraction options.

use crate::Password;
use crate::copy::DEFAULT_EXTRACT_BUFFER_SIZE;
use crate::progress::ProgressReporter;

/// Options for extracting archives.
pub struct ExtractOptions {
    /// Password for encrypted archives.
    pub password: Option<Password>,
    /// Size of the transfer buffer in bytes (default 10 MiB).
    pub buffer_size: usize,
    /// Progress reporter for tracking extraction progress (optional).
    pub progress: Option<Box<dyn ProgressReporter>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            password: None,
            buffer_size: DEFAULT_EXTRACT_BUFFER_SIZE,
            progress: None,
        }
    }
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("has_password", &self.password.is_some())
            .field("buffer_size", &self.buffer_size)
            .finish_non_exhaustive()
    }
}

impl ExtractOptions {
    /// Creates extraction options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password used to decrypt entries.
    pub fn password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the transfer buffer size in bytes.
    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes.max(1);
        self
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ExtractOptions::new();
        assert!(opts.password.is_none());
        assert_eq!(opts.buffer_size, 10 * 1024 * 1024);
        assert!(opts.progress.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let opts = ExtractOptions::new().password("topsecret").buffer_size(0);
        assert_eq!(opts.buffer_size, 1);
        let debug = format!("{:?}", opts);
        assert!(!debug.contains("topsecret"));
    }
}
