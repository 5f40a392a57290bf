//! Streaming transform of dataset XML entries into SQL `INSERT` statements.
//!
//! Each qualifying entry is decompressed and parsed in one pass: the XML
//! scanner reads straight from the decoder, one statement is handed to the
//! [`TransformHandler`] as soon as its record closes, and nothing else is
//! buffered.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipset::transform::{ImportResult, TransformOptions, statement_fn, transform};
//!
//! let options = TransformOptions::new().password("secret").primary_key("id");
//! let mut handler = statement_fn(|_table, statement| println!("{}", statement));
//! if transform("dataset.zip", options, &mut handler)? == ImportResult::PwdError {
//!     eprintln!("wrong password");
//! }
//! # Ok::<(), zipset::Error>(())
//! ```

pub(crate) mod options;
pub mod scanner;
pub mod statement;

pub use options::{DEFAULT_DATASET_ROOT, DEFAULT_EXTENSION, TransformOptions};
pub use scanner::RecordScanner;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::codec::{ArchiveSource, classify_read_error};
use crate::{ArchivePath, Error, Result};

/// Outcome of [`transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportResult {
    /// Nothing was processed (also returned when the archive does not exist).
    #[default]
    NotRun,
    /// An entry could not be decoded with the given password.
    PwdError,
    /// A password was given but no qualifying entry was there to check it on.
    PasswordUnverified,
    /// Every qualifying entry was scanned.
    Success,
}

/// Receives the output of [`transform`].
///
/// Every method has an empty default body.
pub trait TransformHandler {
    /// Called for every completed record.
    fn on_statement_built(&mut self, table: &str, statement: &str) {
        let _ = (table, statement);
    }

    /// Called when the dataset wrapper of an entry closes. `table` is empty if
    /// the entry held no record.
    fn on_entry_parsed(&mut self, entry: &str, table: &str, record_count: usize) {
        let _ = (entry, table, record_count);
    }

    /// Called before a qualifying entry is scanned.
    fn on_entry_parse_started(&mut self, entry: &str, size: u64) {
        let _ = (entry, size);
    }

    /// Called once after the last entry.
    fn on_archive_parsed(&mut self, archive: &Path) {
        let _ = archive;
    }
}

impl<H: TransformHandler + ?Sized> TransformHandler for &mut H {
    fn on_statement_built(&mut self, table: &str, statement: &str) {
        (**self).on_statement_built(table, statement);
    }

    fn on_entry_parsed(&mut self, entry: &str, table: &str, record_count: usize) {
        (**self).on_entry_parsed(entry, table, record_count);
    }

    fn on_entry_parse_started(&mut self, entry: &str, size: u64) {
        (**self).on_entry_parse_started(entry, size);
    }

    fn on_archive_parsed(&mut self, archive: &Path) {
        (**self).on_archive_parsed(archive);
    }
}

/// A handler that only receives statements, through a closure.
pub struct StatementFn<F> {
    callback: F,
}

impl<F> TransformHandler for StatementFn<F>
where
    F: FnMut(&str, &str),
{
    fn on_statement_built(&mut self, table: &str, statement: &str) {
        (self.callback)(table, statement)
    }
}

/// Creates a handler from a `(table, statement)` closure.
pub fn statement_fn<F>(f: F) -> StatementFn<F>
where
    F: FnMut(&str, &str),
{
    StatementFn { callback: f }
}

/// Streams the dataset entries of `archive` into SQL statements.
///
/// Entries whose name does not end with [`TransformOptions::extension`] are
/// skipped. Processing stops at the first entry that cannot be decoded and
/// [`ImportResult::PwdError`] is returned.
///
/// # Errors
///
/// Returns an error for I/O failures, an unreadable container, malformed XML
/// or a truncated record.
pub fn transform<H>(
    archive: impl AsRef<Path>,
    mut options: TransformOptions,
    handler: &mut H,
) -> Result<ImportResult>
where
    H: TransformHandler + ?Sized,
{
    let archive = archive.as_ref();
    if !archive.is_file() {
        log::debug!("Archive '{}' not found", archive.display());
        return Ok(ImportResult::NotRun);
    }

    let reader = BufReader::new(File::open(archive)?);
    let mut source = ArchiveSource::new(reader, options.password.take())?;
    let mut parsed = 0usize;

    for index in 0..source.len() {
        let info = source.entry_info(index)?;
        let qualifies = !info.is_dir
            && ArchivePath::new(&info.name).is_ok_and(|p| p.has_extension(&options.extension));
        if !qualifies {
            log::debug!("Skipping entry '{}'", info.name);
            continue;
        }

        handler.on_entry_parse_started(&info.name, info.size);
        let entry = match source.open_entry(index, &info) {
            Ok(entry) => entry,
            Err(e) if e.is_password_error() => {
                log::debug!("Cannot open entry '{}': {}", info.name, e);
                return Ok(ImportResult::PwdError);
            }
            Err(e) => return Err(e),
        };

        let mut scanner = RecordScanner::new(BufReader::new(entry), &info.name, &options);
        match scanner.run(handler) {
            Ok(_) => parsed += 1,
            Err(Error::Io(e)) => {
                let error = classify_read_error(&info, e);
                if error.is_password_error() {
                    log::debug!("Failed to decode entry '{}': {}", info.name, error);
                    return Ok(ImportResult::PwdError);
                }
                return Err(error);
            }
            Err(e) => return Err(e),
        }
    }

    handler.on_archive_parsed(archive);
    if source.has_password() && parsed == 0 {
        return Ok(ImportResult::PasswordUnverified);
    }
    Ok(ImportResult::Success)
}
