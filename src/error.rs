use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    // Traversal
    #[error("{}: permission denied", .0.display())]
    PermissionDenied(PathBuf),

    #[error("{}: path not found", .0.display())]
    NotFound(PathBuf),

    #[error("{}: symlink loop", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The walk mechanism itself failed. Terminal for the run.
    #[error("walk failed: {0}")]
    Walk(String),

    // Content scan
    #[error("{}: cannot open: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: read failed after {bytes_read} bytes: {source}", path.display())]
    Read {
        path: PathBuf,
        bytes_read: u64,
        #[source]
        source: std::io::Error,
    },

    // Config
    #[error("{}: invalid search root", .0.display())]
    InvalidRoot(PathBuf),

    #[error("invalid worker count: {0}")]
    InvalidWorkerCount(usize),

    // Runtime
    #[error("search cancelled early")]
    Cancelled,

    #[error("search worker panicked")]
    WorkerPanicked,

    #[error("failed to spawn search thread")]
    Spawn(#[source] std::io::Error),
}

impl SearchError {
    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::SymlinkLoop(p)
            | Self::InvalidRoot(p)
            | Self::Io { path: p, .. }
            | Self::Open { path: p, .. }
            | Self::Read { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the search can continue after this error.
    ///
    /// Per-entry failures (permission denied, symlink loops, open and read
    /// errors) are streamed to the caller while the walk keeps going.
    /// Everything else ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_)
                | Self::NotFound(_)
                | Self::SymlinkLoop(_)
                | Self::Io { .. }
                | Self::Open { .. }
                | Self::Read { .. }
        )
    }

    /// Cancellation is a terminal condition, not a failure. Callers check for
    /// it to suppress their generic error reporting.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Bytes consumed before a content read failed. Zero for every other error.
    pub fn bytes_read(&self) -> u64 {
        match self {
            Self::Read { bytes_read, .. } => *bytes_read,
            _ => 0,
        }
    }
}

