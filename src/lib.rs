//! # zipset
//!
//! Password-protectable compressed archives, plus a streaming path from
//! tabular XML entries to SQL `INSERT` statements.
//!
//! The crate writes and reads ZIP archives (Deflate, WinZip AES-256 when a
//! password is set) one entry at a time through a single fixed-size transfer
//! buffer, reporting progress after every chunk. The dataset transformer parses
//! the XML of each entry while it is being decompressed, so datasets of any
//! size are turned into statements without being loaded into memory.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use zipset::{ArchiveWriter, Result, WriteOptions};
//!
//! fn main() -> Result<()> {
//!     let options = WriteOptions::new().password("secret").resolve_conflict(true);
//!     let mut writer = ArchiveWriter::create("export/backup.zip", options)?;
//!
//!     writer.add_file("customers.xml")?;
//!     writer.add_folder("reports", "*.xml", true)?;
//!     writer.add_bytes("readme.txt", b"Hello, World!")?;
//!
//!     let result = writer.finish()?;
//!     println!("Wrote {} entries to {}", result.entries_written, result.archive_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ### Extracting an Archive
//!
//! ```rust,no_run
//! use zipset::{ExtractOptions, Result, UnCompressStatus, extract};
//!
//! fn main() -> Result<()> {
//!     let status = extract("backup.zip", "./output", ExtractOptions::new().password("secret"))?;
//!     if status == UnCompressStatus::InvalidPassword {
//!         eprintln!("wrong password");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Turning a Dataset Archive into SQL
//!
//! ```rust,no_run
//! use zipset::{Result, TransformOptions, transform};
//! use zipset::transform::statement_fn;
//!
//! fn main() -> Result<()> {
//!     let options = TransformOptions::new().password("secret").primary_keys(["id"]);
//!     let mut statements = Vec::new();
//!     let mut handler = statement_fn(|_table, sql| statements.push(sql.to_string()));
//!     transform("dataset.zip", options, &mut handler)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Progress Reporting
//!
//! [`WriteOptions`] and [`ExtractOptions`] accept a [`ProgressReporter`](progress::ProgressReporter).
//! See the [`progress`] module for the provided reporters.
//!
//! ## Logging
//!
//! Lifecycle messages go through the [`log`](https://docs.rs/log) facade. The
//! library never installs a logger.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive_path;
mod codec;
pub mod copy;
pub mod error;
pub mod fs;
pub mod naming;
mod password;
pub mod progress;
pub mod read;
pub mod transform;
pub mod write;

pub use archive_path::ArchivePath;
pub use codec::{DEFAULT_LEVEL, MAX_LEVEL};
pub use copy::{BYTES_MIB, bytes_to_mib};
pub use error::{Error, Result};
pub use fs::ensure_dir;
pub use naming::{rename_with_digest, resolve_conflict};
pub use password::Password;

pub use read::{ExtractOptions, UnCompressStatus, extract};

pub use write::{
    ArchiveWriter, WriteOptions, WriteResult, compress_files, compress_folder,
};

pub use transform::{ImportResult, TransformHandler, TransformOptions, transform};

pub use progress::{
    ChannelProgress, ClosureProgress, EntryProgress, NoProgress, ProgressEvent, ProgressReporter,
    StatisticsProgress, progress_fn,
};
