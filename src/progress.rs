//! Progress reporting for archive operations.
//!
//! Progress is delivered synchronously, inline with the copy loop: a slow
//! reporter slows the operation down, which is the only form of backpressure.
//! Options hold an `Option<Box<dyn ProgressReporter>>`, so "no reporter" is
//! simply `None`.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipset::progress::progress_fn;
//! use zipset::{ArchiveWriter, WriteOptions};
//!
//! let options = WriteOptions::new().progress(progress_fn(|p| {
//!     println!("{}: {}/{}", p.entry_name, p.bytes_done, p.total_bytes);
//! }));
//! let mut writer = ArchiveWriter::create("out.zip", options)?;
//! writer.add_file("report.xml")?;
//! writer.finish()?;
//! # Ok::<(), zipset::Error>(())
//! ```

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

/// Progress of one entry after a chunk has been transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryProgress<'a> {
    /// File name of the archive being written or read.
    pub archive_name: &'a str,
    /// Name of the entry inside the archive.
    pub entry_name: &'a str,
    /// Total size of the entry in bytes.
    pub total_bytes: u64,
    /// Bytes transferred so far for this entry.
    pub bytes_done: u64,
}

impl EntryProgress<'_> {
    /// Returns the completion percentage (0.0 - 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            (self.bytes_done as f64 / self.total_bytes as f64) * 100.0
        }
    }
}

/// Progress reporting trait for archive operations.
///
/// All methods have empty default bodies; implement only what you need.
pub trait ProgressReporter {
    /// Called when an entry is about to be transferred.
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        let _ = (entry_name, size);
    }

    /// Called after every chunk ("doing-compress" / "doing-uncompress").
    fn on_progress(&mut self, progress: &EntryProgress<'_>) {
        let _ = progress;
    }

    /// Called after the last chunk of an entry, before the next entry starts.
    fn on_entry_complete(&mut self, entry_name: &str, bytes: u64) {
        let _ = (entry_name, bytes);
    }

    /// Called once the archive has been finalized ("compress-complete").
    fn on_archive_complete(&mut self, archive_name: &str, archive_bytes: u64) {
        let _ = (archive_name, archive_bytes);
    }
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for Box<P> {
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        (**self).on_entry_start(entry_name, size);
    }

    fn on_progress(&mut self, progress: &EntryProgress<'_>) {
        (**self).on_progress(progress);
    }

    fn on_entry_complete(&mut self, entry_name: &str, bytes: u64) {
        (**self).on_entry_complete(entry_name, bytes);
    }

    fn on_archive_complete(&mut self, archive_name: &str, archive_bytes: u64) {
        (**self).on_archive_complete(archive_name, archive_bytes);
    }
}

/// A progress reporter that does nothing (null object pattern).
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// A progress reporter that collects statistics.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    /// Entry currently being transferred.
    pub current_entry: Option<String>,
    /// Bytes transferred for the current entry.
    pub current_bytes: u64,
    /// Number of entries completed.
    pub entries_completed: usize,
    /// Bytes transferred across all completed entries.
    pub total_bytes: u64,
    /// Number of progress callbacks received.
    pub progress_calls: usize,
    /// Final archive size, once reported.
    pub archive_bytes: Option<u64>,
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_entry_start(&mut self, entry_name: &str, _size: u64) {
        self.current_entry = Some(entry_name.to_string());
        self.current_bytes = 0;
    }

    fn on_progress(&mut self, progress: &EntryProgress<'_>) {
        self.current_bytes = progress.bytes_done;
        self.progress_calls += 1;
    }

    fn on_entry_complete(&mut self, _entry_name: &str, bytes: u64) {
        self.entries_completed += 1;
        self.total_bytes += bytes;
        self.current_entry = None;
    }

    fn on_archive_complete(&mut self, _archive_name: &str, archive_bytes: u64) {
        self.archive_bytes = Some(archive_bytes);
    }
}

/// A progress reporter that calls a closure for every chunk.
pub struct ClosureProgress<F> {
    callback: F,
}

impl<F> ClosureProgress<F>
where
    F: FnMut(&EntryProgress<'_>),
{
    /// Creates a progress reporter from a closure.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgress<F>
where
    F: FnMut(&EntryProgress<'_>),
{
    fn on_progress(&mut self, progress: &EntryProgress<'_>) {
        (self.callback)(progress)
    }
}

/// Creates a closure-based progress reporter.
pub fn progress_fn<F>(f: F) -> ClosureProgress<F>
where
    F: FnMut(&EntryProgress<'_>),
{
    ClosureProgress::new(f)
}

/// Progress events sent by [`ChannelProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// An entry is about to be transferred.
    EntryStart {
        /// The entry name.
        name: String,
        /// The entry size in bytes.
        size: u64,
    },
    /// A chunk of an entry has been transferred.
    Progress {
        /// The archive file name.
        archive: String,
        /// The entry name.
        entry: String,
        /// Total size of the entry.
        total_bytes: u64,
        /// Bytes transferred so far.
        bytes_done: u64,
    },
    /// An entry has been fully transferred.
    EntryComplete {
        /// The entry name.
        name: String,
        /// Bytes transferred.
        bytes: u64,
    },
    /// The archive has been finalized.
    ArchiveComplete {
        /// The archive file name.
        archive: String,
        /// Final archive size in bytes.
        bytes: u64,
    },
}

/// Forwards progress as [`ProgressEvent`]s into a bounded channel.
///
/// When the channel is full the operation blocks until the consumer catches
/// up. Once the receiver is dropped, events are discarded.
pub struct ChannelProgress {
    sender: SyncSender<ProgressEvent>,
    disconnected: bool,
}

impl ChannelProgress {
    /// Creates a reporter and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, Receiver<ProgressEvent>) {
        let (sender, receiver) = sync_channel(capacity);
        (
            Self {
                sender,
                disconnected: false,
            },
            receiver,
        )
    }

    fn send(&mut self, event: ProgressEvent) {
        if self.disconnected {
            return;
        }
        // Try first so a zero-capacity channel with a live consumer still works
        let event = match self.sender.try_send(event) {
            Ok(()) => return,
            Err(TrySendError::Disconnected(_)) => {
                self.disconnected = true;
                return;
            }
            Err(TrySendError::Full(event)) => event,
        };
        if self.sender.send(event).is_err() {
            self.disconnected = true;
        }
    }
}

impl ProgressReporter for ChannelProgress {
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        self.send(ProgressEvent::EntryStart {
            name: entry_name.to_string(),
            size,
        });
    }

    fn on_progress(&mut self, progress: &EntryProgress<'_>) {
        self.send(ProgressEvent::Progress {
            archive: progress.archive_name.to_string(),
            entry: progress.entry_name.to_string(),
            total_bytes: progress.total_bytes,
            bytes_done: progress.bytes_done,
        });
    }

    fn on_entry_complete(&mut self, entry_name: &str, bytes: u64) {
        self.send(ProgressEvent::EntryComplete {
            name: entry_name.to_string(),
            bytes,
        });
    }

    fn on_archive_complete(&mut self, archive_name: &str, archive_bytes: u64) {
        self.send(ProgressEvent::ArchiveComplete {
            archive: archive_name.to_string(),
            bytes: archive_bytes,
        });
    }
}

/// Feeds one entry's chunk counts to an optional reporter.
///
/// Shared by the writer and the extractor so both report identically.
pub(crate) struct EntryTracker<'r, 'n> {
    reporter: Option<&'r mut (dyn ProgressReporter + 'static)>,
    archive_name: &'n str,
    entry_name: &'n str,
    total_bytes: u64,
}

impl<'r, 'n> EntryTracker<'r, 'n> {
    pub(crate) fn start(
        reporter: Option<&'r mut (dyn ProgressReporter + 'static)>,
        archive_name: &'n str,
        entry_name: &'n str,
        total_bytes: u64,
    ) -> Self {
        let mut tracker = Self {
            reporter,
            archive_name,
            entry_name,
            total_bytes,
        };
        if let Some(r) = tracker.reporter.as_deref_mut() {
            r.on_entry_start(entry_name, total_bytes);
        }
        tracker
    }

    pub(crate) fn chunk(&mut self, bytes_done: u64) {
        if let Some(r) = self.reporter.as_deref_mut() {
            r.on_progress(&EntryProgress {
                archive_name: self.archive_name,
                entry_name: self.entry_name,
                total_bytes: self.total_bytes,
                bytes_done,
            });
        }
    }

    pub(crate) fn complete(mut self, bytes: u64) {
        if let Some(r) = self.reporter.as_deref_mut() {
            r.on_entry_complete(self.entry_name, bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let p = EntryProgress {
            archive_name: "a.zip",
            entry_name: "x",
            total_bytes: 200,
            bytes_done: 50,
        };
        assert!((p.percentage() - 25.0).abs() < f64::EPSILON);

        let empty = EntryProgress {
            total_bytes: 0,
            bytes_done: 0,
            ..p
        };
        assert!((empty.percentage() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_statistics_progress() {
        let mut stats = StatisticsProgress::new();
        stats.on_entry_start("a.txt", 10);
        stats.on_progress(&EntryProgress {
            archive_name: "x.zip",
            entry_name: "a.txt",
            total_bytes: 10,
            bytes_done: 10,
        });
        assert_eq!(stats.current_entry.as_deref(), Some("a.txt"));
        stats.on_entry_complete("a.txt", 10);
        stats.on_archive_complete("x.zip", 99);

        assert_eq!(stats.entries_completed, 1);
        assert_eq!(stats.total_bytes, 10);
        assert_eq!(stats.progress_calls, 1);
        assert_eq!(stats.archive_bytes, Some(99));
        assert!(stats.current_entry.is_none());
    }

    #[test]
    fn test_progress_fn() {
        let mut seen = Vec::new();
        {
            let mut reporter = progress_fn(|p| seen.push(p.bytes_done));
            for done in [4, 8, 9] {
                reporter.on_progress(&EntryProgress {
                    archive_name: "a.zip",
                    entry_name: "e",
                    total_bytes: 9,
                    bytes_done: done,
                });
            }
        }
        assert_eq!(seen, vec![4, 8, 9]);
    }

    #[test]
    fn test_channel_progress() {
        let (mut reporter, rx) = ChannelProgress::new(8);
        reporter.on_entry_start("e.txt", 3);
        reporter.on_progress(&EntryProgress {
            archive_name: "a.zip",
            entry_name: "e.txt",
            total_bytes: 3,
            bytes_done: 3,
        });
        reporter.on_entry_complete("e.txt", 3);
        reporter.on_archive_complete("a.zip", 120);
        drop(reporter);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            ProgressEvent::EntryStart {
                name: "e.txt".into(),
                size: 3
            }
        );
        assert_eq!(
            events[3],
            ProgressEvent::ArchiveComplete {
                archive: "a.zip".into(),
                bytes: 120
            }
        );
    }

    #[test]
    fn test_channel_progress_ignores_dropped_receiver() {
        let (mut reporter, rx) = ChannelProgress::new(1);
        drop(rx);
        reporter.on_entry_start("e.txt", 3);
        reporter.on_entry_complete("e.txt", 3);
        assert!(reporter.disconnected);
    }

    #[test]
    fn test_entry_tracker_without_reporter() {
        let mut tracker = EntryTracker::start(None, "a.zip", "e", 5);
        tracker.chunk(5);
        tracker.complete(5);
    }

    #[test]
    fn test_entry_tracker_order() {
        let (mut reporter, rx) = ChannelProgress::new(16);
        {
            let mut tracker = EntryTracker::start(Some(&mut reporter), "a.zip", "e", 4);
            tracker.chunk(2);
            tracker.chunk(4);
            tracker.complete(4);
        }
        drop(reporter);

        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(events[0], ProgressEvent::EntryStart { .. }));
        assert!(matches!(
            events[2],
            ProgressEvent::Progress { bytes_done: 4, .. }
        ));
        assert!(matches!(events[3], ProgressEvent::EntryComplete { bytes: 4, .. }));
    }
}
