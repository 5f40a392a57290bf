//! Exit codes for the CLI tool.

use zipset::{Error, ImportResult, UnCompressStatus};

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// Wrong password
pub const WRONG_PASSWORD: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Archive not found
pub const NOT_FOUND: i32 = 6;
/// Ctrl+C (128 + SIGINT)
pub const USER_INTERRUPT: i32 = 130;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    WrongPassword,
    IoError,
    NotFound,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::WrongPassword => WRONG_PASSWORD,
            Self::IoError => IO_ERROR,
            Self::NotFound => NOT_FOUND,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a zipset error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::Codec(_) => ExitCode::BadArchive,
        Error::Xml { .. } | Error::MalformedRecord { .. } => ExitCode::BadArchive,
        Error::WrongPassword { .. } => ExitCode::WrongPassword,
        Error::PathTraversal { .. } => ExitCode::FatalError,
        Error::InvalidCompressionLevel { .. }
        | Error::InvalidArchivePath(_)
        | Error::InvalidPattern { .. } => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}

/// Converts an extraction status to an exit code
pub fn status_to_exit_code(status: UnCompressStatus) -> ExitCode {
    match status {
        UnCompressStatus::Success => ExitCode::Success,
        UnCompressStatus::PasswordUnverified => ExitCode::Warning,
        UnCompressStatus::InvalidPassword => ExitCode::WrongPassword,
        UnCompressStatus::ArchiveNotFound => ExitCode::NotFound,
    }
}

/// Converts a transform result to an exit code
pub fn import_to_exit_code(result: ImportResult) -> ExitCode {
    match result {
        ImportResult::Success => ExitCode::Success,
        ImportResult::PasswordUnverified => ExitCode::Warning,
        ImportResult::PwdError => ExitCode::WrongPassword,
        ImportResult::NotRun => ExitCode::NotFound,
    }
}
