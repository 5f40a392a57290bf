//! Progress bar implementation for CLI operations.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use zipset::bytes_to_mib;
use zipset::progress::{EntryProgress, ProgressReporter};

/// Progress display for CLI operations
pub struct CliProgress {
    multi: MultiProgress,
    overall: ProgressBar,
    current: Option<ProgressBar>,
    quiet: bool,
}

impl CliProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool) -> Self {
        let multi = MultiProgress::new();

        let overall = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        };

        Self {
            multi,
            overall,
            current: None,
            quiet,
        }
    }

    /// Returns a handle to the overall bar, usable after the reporter has been
    /// handed to an operation.
    pub fn overall(&self) -> ProgressBar {
        self.overall.clone()
    }

    /// Sets a message on the overall progress bar
    pub fn set_message(&self, msg: impl Into<String>) {
        if !self.quiet {
            self.overall.set_message(msg.into());
        }
    }
}

impl ProgressReporter for CliProgress {
    fn on_entry_start(&mut self, entry_name: &str, entry_size: u64) {
        if self.quiet {
            return;
        }

        let pb = self.multi.add(ProgressBar::new(entry_size));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {wide_msg} [{bar:30}] {bytes}/{total_bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        // Truncate long names
        let display_name = match entry_name.char_indices().rev().nth(36) {
            Some((idx, _)) if entry_name.chars().count() > 40 => {
                format!("...{}", &entry_name[idx..])
            }
            _ => entry_name.to_string(),
        };
        pb.set_message(display_name);

        self.current = Some(pb);
    }

    fn on_progress(&mut self, progress: &EntryProgress<'_>) {
        if let Some(pb) = self.current.as_ref() {
            pb.set_position(progress.bytes_done);
        }
    }

    fn on_entry_complete(&mut self, _entry_name: &str, _bytes: u64) {
        if let Some(pb) = self.current.take() {
            pb.finish_and_clear();
        }
        self.overall.inc(1);
    }

    fn on_archive_complete(&mut self, archive_name: &str, archive_bytes: u64) {
        self.overall.finish_with_message(format!(
            "-> {} ({} MiB)",
            archive_name,
            bytes_to_mib(archive_bytes)
        ));
    }
}
