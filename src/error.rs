//! Error types for archive operations.
//!
//! This module provides the [`Error`] enum which represents all failure modes
//! of the writer, the extractor and the dataset transformer, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! Expected top-level outcomes (archive missing, wrong password) are reported
//! through [`UnCompressStatus`] and [`ImportResult`]. Everything else, such as
//! a failing disk or malformed XML, comes back as an [`Error`]:
//!
//! ```rust,no_run
//! use zipset::{Error, ExtractOptions, UnCompressStatus, extract};
//!
//! fn run(path: &str) -> zipset::Result<()> {
//!     match extract(path, "./out", ExtractOptions::new().password("secret")) {
//!         Ok(UnCompressStatus::Success) => println!("done"),
//!         Ok(status) => println!("not extracted: {:?}", status),
//!         Err(Error::Io(e)) => eprintln!("I/O error: {}", e),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`UnCompressStatus`]: crate::read::UnCompressStatus
//! [`ImportResult`]: crate::transform::ImportResult

use std::io;

/// Helper struct for formatting WrongPassword error messages.
struct WrongPasswordDisplay<'a> {
    entry_name: Option<&'a str>,
}

impl std::fmt::Display for WrongPasswordDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Wrong password")?;
        match self.entry_name {
            Some(name) => write!(f, " for entry '{}'", name),
            None => Ok(()),
        }
    }
}

/// The main error type for archive operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`Codec`][Self::Codec] | File system or container failures |
/// | Credentials | [`WrongPassword`][Self::WrongPassword] | Missing or incorrect password |
/// | Dataset | [`Xml`][Self::Xml], [`MalformedRecord`][Self::MalformedRecord] | Unexpected XML content |
/// | Arguments | [`InvalidCompressionLevel`][Self::InvalidCompressionLevel], [`InvalidArchivePath`][Self::InvalidArchivePath], [`InvalidPattern`][Self::InvalidPattern] | Caller input |
/// | Security | [`PathTraversal`][Self::PathTraversal] | Entry escaping the target folder |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive container could not be read or written.
    ///
    /// Wraps the codec's own error for everything that is not a password
    /// failure (those are reported as [`Error::WrongPassword`]).
    #[error("Archive codec error: {0}")]
    Codec(#[from] zip::result::ZipError),

    /// The XML payload of a dataset entry could not be scanned.
    #[error("XML error in entry '{entry}': {source}")]
    Xml {
        /// The entry being scanned.
        entry: String,
        /// The underlying parser error.
        #[source]
        source: quick_xml::Error,
    },

    /// The password is missing or incorrect.
    ///
    /// There is no up-front password check: this error is raised only when
    /// the codec fails to decode an encrypted entry.
    #[error("{}", WrongPasswordDisplay { entry_name: entry_name.as_deref() })]
    WrongPassword {
        /// The entry where the failure was detected (if known).
        entry_name: Option<String>,
    },

    /// A dataset entry ended before the open record was closed.
    #[error("Malformed record in entry '{entry}' (table {}): {reason}", table.as_deref().unwrap_or("<none>"))]
    MalformedRecord {
        /// The entry being scanned.
        entry: String,
        /// The active table name, if one had been seen.
        table: Option<String>,
        /// What went wrong.
        reason: &'static str,
    },

    /// Compression level outside the valid 0-9 range.
    #[error("Invalid compression level {level}: must be between 0 and 9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u32,
    },

    /// An entry name failed validation.
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// A file name pattern could not be compiled.
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An entry would be extracted outside the target folder.
    #[error("Path traversal detected in entry '{path}'")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },
}

impl Error {
    /// Returns true if this error means the password was wrong or missing.
    pub fn is_password_error(&self) -> bool {
        matches!(self, Self::WrongPassword { .. })
    }

    /// Returns true for plain I/O failures.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    pub(crate) fn wrong_password(entry_name: &str) -> Self {
        Self::WrongPassword {
            entry_name: Some(entry_name.to_string()),
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
