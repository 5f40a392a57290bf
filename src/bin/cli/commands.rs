//! Command implementations for the CLI tool.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use zipset::{
    ArchiveWriter, ExtractOptions, ImportResult, TransformHandler, TransformOptions, WriteOptions,
    extract, transform,
};

use crate::exit_codes::{ExitCode, error_to_exit_code, import_to_exit_code, status_to_exit_code};
use crate::password::resolve_password;
use crate::progress::CliProgress;

/// Configuration for the compress command.
pub struct CompressConfig<'a> {
    pub archive_path: &'a Path,
    pub inputs: &'a [PathBuf],
    pub password: Option<String>,
    pub ask_password: bool,
    pub level: u32,
    pub buffer_mib: u64,
    pub pattern: &'a str,
    pub recursive: bool,
    pub resolve_conflict: bool,
    pub quiet: bool,
}

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub archive_path: &'a Path,
    pub output_dir: &'a Path,
    pub password: Option<String>,
    pub ask_password: bool,
    pub buffer_mib: u64,
    pub quiet: bool,
}

/// Configuration for the transform command.
pub struct TransformConfig<'a> {
    pub archive_path: &'a Path,
    pub output: Option<&'a Path>,
    pub password: Option<String>,
    pub ask_password: bool,
    pub primary_keys: &'a [String],
    pub dataset_root: &'a str,
    pub extension: &'a str,
    pub tolerate_truncation: bool,
    pub quiet: bool,
}

/// Compress command implementation
pub fn compress(config: &CompressConfig<'_>) -> ExitCode {
    let Ok(password) = resolve_password(config.password.clone(), config.ask_password, true) else {
        return ExitCode::BadArgs;
    };

    let mut options = match WriteOptions::new().level(config.level) {
        Ok(opts) => opts
            .buffer_size_mib(config.buffer_mib)
            .resolve_conflict(config.resolve_conflict),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };
    if let Some(pwd) = password {
        options = options.password(pwd);
    }

    let progress = CliProgress::new(config.quiet);
    progress.set_message("Compressing...");
    let overall = progress.overall();
    let options = options.progress(progress);

    let mut writer = match ArchiveWriter::create(config.archive_path, options) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error creating archive: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let mut missing = 0usize;
    for input in config.inputs {
        let added = if input.is_dir() {
            writer.add_folder(input, config.pattern, config.recursive)
        } else if input.is_file() {
            writer.add_file(input)
        } else {
            eprintln!("Warning: {} not found, skipping", input.display());
            missing += 1;
            Ok(())
        };
        if let Err(e) = added {
            overall.abandon_with_message("Failed");
            eprintln!("Error adding {}: {}", input.display(), e);
            return error_to_exit_code(&e);
        }
    }

    let result = match writer.finish() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error finalizing archive: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if !config.quiet {
        println!(
            "Wrote {} entries to {} ({:.1}% saved)",
            result.entries_written,
            result.archive_path.display(),
            result.space_savings() * 100.0
        );
    }

    if missing > 0 {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

/// Extract command implementation
pub fn extract_archive(config: &ExtractConfig<'_>) -> ExitCode {
    let Ok(password) = resolve_password(config.password.clone(), config.ask_password, false) else {
        return ExitCode::BadArgs;
    };

    let buffer = zipset::BYTES_MIB.saturating_mul(config.buffer_mib);
    let mut options = ExtractOptions::new().buffer_size(usize::try_from(buffer).unwrap_or(usize::MAX));
    if let Some(pwd) = password {
        options = options.password(pwd);
    }

    let progress = CliProgress::new(config.quiet);
    progress.set_message("Extracting...");
    let overall = progress.overall();
    let options = options.progress(progress);

    let status = match extract(config.archive_path, config.output_dir, options) {
        Ok(status) => status,
        Err(e) => {
            overall.abandon_with_message("Failed");
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if status.is_success() {
        overall.finish_with_message("Done");
    } else {
        overall.abandon_with_message(format!("{:?}", status));
        eprintln!("Extraction stopped: {:?}", status);
    }
    status_to_exit_code(status)
}

/// Writes statements one per line and reports entry summaries on stderr.
struct StatementPrinter<W: Write> {
    out: W,
    failed: Option<io::Error>,
    quiet: bool,
}

impl<W: Write> TransformHandler for StatementPrinter<W> {
    fn on_statement_built(&mut self, _table: &str, statement: &str) {
        if self.failed.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", statement) {
            self.failed = Some(e);
        }
    }

    fn on_entry_parsed(&mut self, entry: &str, table: &str, record_count: usize) {
        if !self.quiet {
            eprintln!("{}: {} records of {}", entry, record_count, table);
        }
    }
}

/// Transform command implementation
pub fn transform_archive(config: &TransformConfig<'_>) -> ExitCode {
    let Ok(password) = resolve_password(config.password.clone(), config.ask_password, false) else {
        return ExitCode::BadArgs;
    };

    let mut options = TransformOptions::new()
        .primary_keys(config.primary_keys.iter().cloned())
        .dataset_root(config.dataset_root)
        .extension(config.extension)
        .tolerate_truncation(config.tolerate_truncation);
    if let Some(pwd) = password {
        options = options.password(pwd);
    }

    let out: Box<dyn Write> = match config.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Error creating {}: {}", path.display(), e);
                return ExitCode::IoError;
            }
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut printer = StatementPrinter {
        out,
        failed: None,
        quiet: config.quiet,
    };

    let result = match transform(config.archive_path, options, &mut printer) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    if let Some(e) = printer.failed.take().or_else(|| printer.out.flush().err()) {
        eprintln!("Error writing statements: {}", e);
        return ExitCode::IoError;
    }
    if result != ImportResult::Success {
        eprintln!("Transform stopped: {:?}", result);
    }
    import_to_exit_code(result)
}
