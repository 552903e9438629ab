//! # dirsearch
//!
//! Directory-tree search: walk a tree, filter entries by name and type, and
//! optionally keep only files whose contents contain a piece of text.
//!
//! The walk itself is single-threaded and deterministic so that excluded
//! directories can prune their whole subtree. Content scanning is the slow
//! part and runs on a small worker pool fed by the walk. Matches and
//! per-entry errors stream out on two channels while the run is in progress.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let results = dirsearch::search()
//!     .root(".")
//!     .include_names(["*.rs"])
//!     .exclude_names([".git", "target"])
//!     .text("unsafe")
//!     .run()
//!     .unwrap();
//!
//! for path in &results.paths {
//!     println!("{}", path.display());
//! }
//! println!("{}", results.summary);
//! ```
//!
//! # Streaming
//!
//! [`SearchBuilder::start`] returns a [`SearchHandle`] whose two receivers
//! yield results as they are found:
//!
//! ```rust,no_run
//! let handle = dirsearch::search().root("/var/log").text("panic").start().unwrap();
//! for path in handle.paths() {
//!     println!("{}", path.display());
//! }
//! for err in handle.errors() {
//!     eprintln!("{err}");
//! }
//! let done = handle.wait();
//! println!("{}", done.summary);
//! ```
//!
//! # Custom collaborators
//!
//! The walker, the name/type filter and the content scanner are all traits
//! ([`Walker`], [`EntryFilter`], [`ContentMatcher`]), so each stage can be
//! swapped or faked independently.

#![forbid(unsafe_code)]

pub mod engine;
pub mod pattern;
pub mod scanner;

mod builder;
mod cancel;
mod config;
mod entry;
mod error;
mod filter;
mod results;
mod traits;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{SearchBuilder, SearchHandle};
pub use cancel::CancelToken;
pub use config::SearchConfig;
pub use engine::Completion;
pub use entry::{Entry, EntryKind};
pub use error::SearchError;
pub use filter::PathFilter;
pub use pattern::NamePatterns;
pub use results::{Results, Summary};
pub use scanner::{FileContentMatcher, ScanOutcome};
pub use traits::{ContentMatcher, EntryFilter, Visit, Walker};
pub use walker::FsWalker;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use dirsearch::{Entry, EntryKind, SearchError, Visit, Walker};
///
/// struct Tree;
///
/// impl Walker for Tree {
///     fn walk(&self, _root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError> {
///         visit(Ok(Entry::new("/root/file1.txt", EntryKind::File, 1)))?;
///         visit(Ok(Entry::new("/root/sub", EntryKind::Dir, 1)))?;
///         visit(Ok(Entry::new("/root/sub/file2.txt", EntryKind::File, 2)))?;
///         Ok(())
///     }
/// }
///
/// let results = dirsearch::search()
///     .root("/root")
///     .walker(Tree)
///     .include_names(["*.txt"])
///     .run()
///     .unwrap();
///
/// assert_eq!(results.matches(), 2);
/// assert_eq!(results.summary.visited(), 3);
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
