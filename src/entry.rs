use std::path::PathBuf;

/// A single node produced by a [`Walker`](crate::traits::Walker) during traversal.
///
/// Entries are transient: the engine classifies and filters each one as it
/// arrives and keeps nothing but the path of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path to the entry.
    pub path: PathBuf,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// How deep in the traversal this entry was found. Root = 0.
    pub depth: usize,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, depth: usize) -> Self {
        Self {
            path: path.into(),
            kind,
            depth,
        }
    }

    /// Directories are the only entries that are never content-scanned.
    /// Every other kind counts as a file for filtering and statistics.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// The kind of a traversed entry.
///
/// Links are not followed during traversal, so a symlink shows up as its own
/// kind and is treated like a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    pub(crate) fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_dir() {
            Self::Dir
        } else if ft.is_file() {
            Self::File
        } else if ft.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}
