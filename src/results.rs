use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use humansize::{BINARY, format_size};

use crate::error::SearchError;

/// Everything a completed search produced, collected by
/// [`SearchBuilder::run`](crate::SearchBuilder::run).
#[derive(Debug)]
pub struct Results {
    /// Matched paths. Order is unspecified when content search is active.
    pub paths: Vec<PathBuf>,

    /// Non-fatal errors met along the way (permission denied, open failures, ...).
    pub errors: Vec<SearchError>,

    /// Counts and timing for the run.
    pub summary: Summary,

    /// The run was cut short by its cancel token. `paths` and `errors` hold
    /// whatever was produced before that.
    pub cancelled: bool,
}

impl Results {
    pub fn matches(&self) -> usize {
        self.paths.len()
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Statistics for a finished run.
///
/// Every visited entry counts as exactly one directory or one file, before any
/// filtering. `bytes_read` only grows when a content scan runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub directories: u64,
    pub files: u64,
    pub bytes_read: u64,
    pub started: Instant,
    pub finished: Instant,
}

impl Summary {
    /// Wall-clock time from run start to run end.
    pub fn elapsed(&self) -> Duration {
        self.finished.saturating_duration_since(self.started)
    }

    /// Total entries the walker reported.
    pub fn visited(&self) -> u64 {
        self.directories + self.files
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes_read > 0 {
            write!(
                f,
                "Visited {} directories, {} files and read {} in {:?}",
                self.directories,
                self.files,
                format_size(self.bytes_read, BINARY),
                self.elapsed()
            )
        } else {
            write!(
                f,
                "Visited {} directories and {} files in {:?}",
                self.directories,
                self.files,
                self.elapsed()
            )
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryRecorder
// ---------------------------------------------------------------------------

/// Live counters for a run in progress. Shared between the traversal and the
/// scan workers, hence atomics everywhere.
#[derive(Debug)]
pub(crate) struct SummaryRecorder {
    directories: AtomicU64,
    files: AtomicU64,
    bytes_read: AtomicU64,
    started: Instant,
}

impl SummaryRecorder {
    pub(crate) fn start() -> Self {
        Self {
            directories: AtomicU64::new(0),
            files: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub(crate) fn record_entry(&self, is_dir: bool) {
        if is_dir {
            self.directories.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn add_bytes(&self, n: u64) {
        self.bytes_read.fetch_add(n, Ordering::Relaxed);
    }

    /// Stamp the end time. Call once, after every worker has finished.
    pub(crate) fn finish(&self) -> Summary {
        Summary {
            directories: self.directories.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            started: self.started,
            finished: Instant::now(),
        }
    }
}
