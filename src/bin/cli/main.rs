//! CLI tool for zipset archive operations.

mod commands;
mod exit_codes;
mod password;
mod progress;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Password-protected archives and dataset-to-SQL import
#[derive(Parser)]
#[command(name = "zipset")]
#[command(author, version, about = "Password-protected archives and dataset-to-SQL import", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create archive from files and folders (alias: a)
    #[command(alias = "a")]
    Compress {
        /// Archive file to create
        archive: PathBuf,

        /// Files and folders to add
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Encrypt entries with this password
        #[arg(short = 'p', long, env = "ZIPSET_PASSWORD")]
        password: Option<String>,

        /// Prompt for the password
        #[arg(long, conflicts_with = "password")]
        ask_password: bool,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "6")]
        level: u32,

        /// Transfer buffer size in MiB
        #[arg(long, default_value = "100")]
        buffer_mib: u64,

        /// File name pattern for folders
        #[arg(long, default_value = zipset::fs::MATCH_ALL)]
        pattern: String,

        /// Only add the top level of folders
        #[arg(long)]
        no_recursive: bool,

        /// Pick a new name instead of overwriting an existing archive
        #[arg(long)]
        resolve_conflict: bool,
    },

    /// Extract files from archive (alias: x)
    #[command(alias = "x")]
    Extract {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Password for encrypted entries
        #[arg(short = 'p', long, env = "ZIPSET_PASSWORD")]
        password: Option<String>,

        /// Prompt for the password
        #[arg(long, conflicts_with = "password")]
        ask_password: bool,

        /// Transfer buffer size in MiB
        #[arg(long, default_value = "10")]
        buffer_mib: u64,
    },

    /// Print SQL INSERT statements for the dataset entries (alias: t)
    #[command(alias = "t")]
    Transform {
        /// Archive file holding dataset XML entries
        archive: PathBuf,

        /// Write statements to this file instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Password for encrypted entries
        #[arg(short = 'p', long, env = "ZIPSET_PASSWORD")]
        password: Option<String>,

        /// Prompt for the password
        #[arg(long, conflicts_with = "password")]
        ask_password: bool,

        /// Column to leave out of the statements (repeatable)
        #[arg(short = 'k', long = "primary-key")]
        primary_keys: Vec<String>,

        /// Name of the dataset wrapper element
        #[arg(long, default_value = zipset::transform::DEFAULT_DATASET_ROOT)]
        dataset_root: String,

        /// Extension of entries to scan
        #[arg(long, default_value = zipset::transform::DEFAULT_EXTENSION)]
        extension: String,

        /// Drop a record cut off by the end of its entry instead of failing
        #[arg(long)]
        tolerate_truncation: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Compress {
            archive,
            inputs,
            password,
            ask_password,
            level,
            buffer_mib,
            pattern,
            no_recursive,
            resolve_conflict,
        } => commands::compress(&commands::CompressConfig {
            archive_path: &archive,
            inputs: &inputs,
            password,
            ask_password,
            level,
            buffer_mib,
            pattern: &pattern,
            recursive: !no_recursive,
            resolve_conflict,
            quiet: cli.quiet,
        }),

        Commands::Extract {
            archive,
            output,
            password,
            ask_password,
            buffer_mib,
        } => commands::extract_archive(&commands::ExtractConfig {
            archive_path: &archive,
            output_dir: &output,
            password,
            ask_password,
            buffer_mib,
            quiet: cli.quiet,
        }),

        Commands::Transform {
            archive,
            output,
            password,
            ask_password,
            primary_keys,
            dataset_root,
            extension,
            tolerate_truncation,
        } => commands::transform_archive(&commands::TransformConfig {
            archive_path: &archive,
            output: output.as_deref(),
            password,
            ask_password,
            primary_keys: &primary_keys,
            dataset_root: &dataset_root,
            extension: &extension,
            tolerate_truncation,
            quiet: cli.quiet,
        }),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
