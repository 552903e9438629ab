use std::path::Path;

use crate::cancel::CancelToken;
use crate::entry::Entry;
use crate::error::SearchError;
use crate::scanner::ScanOutcome;

/// Callback handed to a [`Walker`], invoked once per visited entry.
///
/// Returning `Err` stops the walk; the walker must hand that error back
/// unchanged as its own result. This is how cancellation unwinds a walk.
pub type Visit<'a> = dyn FnMut(Result<Entry, SearchError>) -> Result<(), SearchError> + 'a;

/// Traverses a tree, one entry at a time.
///
/// Implement this to search something other than the local filesystem, or to
/// feed the engine a scripted sequence of entries in tests.
///
/// # Ordering
///
/// Entries must arrive in a deterministic order with every directory before
/// its descendants. The path filter prunes excluded subtrees by remembering
/// directories it has already seen.
///
/// # Error Handling
///
/// Per-entry failures (an unreadable directory, say) are passed to `visit` as
/// `Err` and the walk continues. Return `Err` from `walk` only when the walk
/// mechanism itself can't go on; the run ends with that error.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use dirsearch::{Entry, EntryKind, SearchError, Visit, Walker};
///
/// struct Scripted(Vec<(&'static str, EntryKind)>);
///
/// impl Walker for Scripted {
///     fn walk(&self, _root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError> {
///         for (path, kind) in &self.0 {
///             visit(Ok(Entry::new(*path, *kind, 1)))?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Walker: Send + Sync {
    fn walk(&self, root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError>;
}

/// Decides whether a visited entry is a candidate.
///
/// One instance per run. It is called only from the traversal thread, in visit
/// order, so implementations may keep state (`&mut self`) without locking.
pub trait EntryFilter: Send {
    /// Returns `true` if this entry passes name and type filtering.
    fn is_match(&mut self, entry: &Entry) -> bool;
}

/// Opens a file and checks it for a needle.
///
/// Shared by every scan worker and called concurrently on different paths.
/// Open and read failures come back as `Err` and are reported on the error
/// stream for that path only.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use dirsearch::{CancelToken, ContentMatcher, ScanOutcome, SearchError};
///
/// struct EveryFile;
///
/// impl ContentMatcher for EveryFile {
///     fn scan_file(&self, _path: &Path, _needle: &str, _cancel: &CancelToken) -> Result<ScanOutcome, SearchError> {
///         Ok(ScanOutcome { found: true, bytes_read: 10 })
///     }
/// }
/// ```
pub trait ContentMatcher: Send + Sync {
    fn scan_file(&self, path: &Path, needle: &str, cancel: &CancelToken) -> Result<ScanOutcome, SearchError>;
}
