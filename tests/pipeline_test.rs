use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dirsearch::{
    CancelToken, ContentMatcher, Entry, EntryFilter, EntryKind, ScanOutcome, SearchError, Visit,
    Walker, search,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Replays a fixed list of visits, stopping when the callback says so.
struct ScriptedWalker(Vec<Result<(&'static str, EntryKind), &'static str>>);

impl ScriptedWalker {
    /// `/root/file1.txt`, `/root/sub/`, `/root/sub/file2.txt`
    fn small_tree() -> Self {
        Self(vec![
            Ok(("/root/file1.txt", EntryKind::File)),
            Ok(("/root/sub", EntryKind::Dir)),
            Ok(("/root/sub/file2.txt", EntryKind::File)),
        ])
    }
}

impl Walker for ScriptedWalker {
    fn walk(&self, _root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError> {
        for step in &self.0 {
            match step {
                Ok((path, kind)) => visit(Ok(Entry::new(*path, *kind, 1)))?,
                Err(path) => visit(Err(SearchError::PermissionDenied(PathBuf::from(path))))?,
            }
        }
        Ok(())
    }
}

/// Visits one entry, then the walk machinery breaks.
struct BrokenWalker;

impl Walker for BrokenWalker {
    fn walk(&self, _root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError> {
        visit(Ok(Entry::new("/root/file1.txt", EntryKind::File, 1)))?;
        Err(SearchError::Walk("directory handle table exhausted".into()))
    }
}

/// Many files, for exercising the worker pool.
struct WideWalker(usize);

impl Walker for WideWalker {
    fn walk(&self, _root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError> {
        for i in 0..self.0 {
            visit(Ok(Entry::new(format!("/wide/file{i:04}.txt"), EntryKind::File, 1)))?;
        }
        Ok(())
    }
}

struct MatchAll;

impl EntryFilter for MatchAll {
    fn is_match(&mut self, _entry: &Entry) -> bool {
        true
    }
}

struct MatchNone;

impl EntryFilter for MatchNone {
    fn is_match(&mut self, _entry: &Entry) -> bool {
        false
    }
}

/// Matches everything, and trips the token once it has seen `after` entries.
struct CancelAfter {
    after: usize,
    seen: usize,
    token: CancelToken,
}

impl EntryFilter for CancelAfter {
    fn is_match(&mut self, _entry: &Entry) -> bool {
        self.seen += 1;
        if self.seen == self.after {
            self.token.cancel();
        }
        true
    }
}

/// Reports a fixed outcome for every file and remembers what it was asked.
#[derive(Clone)]
struct FixedContent {
    outcome: ScanOutcome,
    seen: Arc<Mutex<Vec<PathBuf>>>,
}

impl FixedContent {
    fn new(found: bool, bytes_read: u64) -> Self {
        Self {
            outcome: ScanOutcome { found, bytes_read },
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ContentMatcher for FixedContent {
    fn scan_file(&self, path: &Path, _needle: &str, _cancel: &CancelToken) -> Result<ScanOutcome, SearchError> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        Ok(self.outcome)
    }
}

/// Fails every file after reading a few bytes.
struct FailingContent;

impl ContentMatcher for FailingContent {
    fn scan_file(&self, path: &Path, _needle: &str, _cancel: &CancelToken) -> Result<ScanOutcome, SearchError> {
        Err(SearchError::Read {
            path: path.to_path_buf(),
            bytes_read: 3,
            source: io::Error::new(io::ErrorKind::Other, "error matching"),
        })
    }
}

/// Takes its time over the first file, then trips the run's token.
struct SlowThenCancel {
    scanned: Arc<Mutex<usize>>,
}

impl ContentMatcher for SlowThenCancel {
    fn scan_file(&self, _path: &Path, _needle: &str, cancel: &CancelToken) -> Result<ScanOutcome, SearchError> {
        std::thread::sleep(Duration::from_millis(100));
        *self.scanned.lock().unwrap() += 1;
        cancel.cancel();
        Ok(ScanOutcome { found: true, bytes_read: 1 })
    }
}

fn set(paths: &[PathBuf]) -> BTreeSet<PathBuf> {
    paths.iter().cloned().collect()
}

fn pathset(items: &[&str]) -> BTreeSet<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

// ---------------------------------------------------------------------------
// Name-only mode
// ---------------------------------------------------------------------------

#[test]
fn match_everything_returns_every_path_in_walk_order() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .with_filter(MatchAll)
        .run()
        .unwrap();

    assert_eq!(
        results.paths,
        vec![
            PathBuf::from("/root/file1.txt"),
            PathBuf::from("/root/sub"),
            PathBuf::from("/root/sub/file2.txt"),
        ]
    );
    assert!(results.errors.is_empty());
    assert!(!results.cancelled);
}

#[test]
fn match_nothing_returns_nothing() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .with_filter(MatchNone)
        .run()
        .unwrap();

    assert!(results.paths.is_empty());
    assert_eq!(results.summary.visited(), 3);
}

#[test]
fn default_config_includes_everything() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .run()
        .unwrap();

    assert_eq!(
        set(&results.paths),
        pathset(&["/root/file1.txt", "/root/sub", "/root/sub/file2.txt"])
    );
}

#[test]
fn include_names_narrow_the_results() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .include_names(["file2*"])
        .run()
        .unwrap();

    assert_eq!(results.paths, vec![PathBuf::from("/root/sub/file2.txt")]);
}

#[test]
fn excluded_directory_prunes_its_subtree() {
    let walker = ScriptedWalker(vec![
        Ok(("/repo/.git", EntryKind::Dir)),
        Ok(("/repo/.git/config", EntryKind::File)),
        Ok(("/repo/.git/objects", EntryKind::Dir)),
        Ok(("/repo/.git/objects/ab", EntryKind::File)),
        Ok(("/repo/main.go", EntryKind::File)),
    ]);
    let results = search()
        .root("/repo")
        .walker(walker)
        .exclude_names([".git"])
        .run()
        .unwrap();

    assert_eq!(results.paths, vec![PathBuf::from("/repo/main.go")]);
    // Pruned entries are still walked and counted.
    assert_eq!(results.summary.directories, 2);
    assert_eq!(results.summary.files, 3);
}

#[test]
fn counts_every_visit_regardless_of_filtering() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .directories(false)
        .include_names(["nothing-matches"])
        .run()
        .unwrap();

    assert!(results.paths.is_empty());
    assert_eq!(results.summary.files, 2);
    assert_eq!(results.summary.directories, 1);
    assert_eq!(results.summary.bytes_read, 0);
}

#[test]
fn entry_errors_are_streamed_and_the_walk_continues() {
    let walker = ScriptedWalker(vec![
        Ok(("/root/a.txt", EntryKind::File)),
        Err("/root/locked"),
        Ok(("/root/b.txt", EntryKind::File)),
    ]);
    let results = search().root("/root").walker(walker).run().unwrap();

    assert_eq!(set(&results.paths), pathset(&["/root/a.txt", "/root/b.txt"]));
    assert_eq!(results.errors.len(), 1);
    assert!(matches!(&results.errors[0], SearchError::PermissionDenied(p) if p == Path::new("/root/locked")));
    // Failed visits carry no entry and count as neither kind.
    assert_eq!(results.summary.visited(), 2);
}

#[test]
fn walker_failure_is_the_terminal_error() {
    let err = search().root("/root").walker(BrokenWalker).run().unwrap_err();
    assert!(matches!(err, SearchError::Walk(_)));
    assert!(!err.is_cancelled());
}

#[test]
fn walker_failure_still_closes_the_streams() {
    let handle = search()
        .root("/root")
        .walker(BrokenWalker)
        .text("x")
        .content_matcher(FixedContent::new(true, 1))
        .start()
        .unwrap();

    let paths: Vec<_> = handle.paths().iter().collect();
    let errors: Vec<_> = handle.errors().iter().collect();
    let done = handle.wait();

    assert_eq!(paths, vec![PathBuf::from("/root/file1.txt")]);
    assert!(errors.is_empty());
    assert!(matches!(done.status, Err(SearchError::Walk(_))));
}

// ---------------------------------------------------------------------------
// Content mode
// ---------------------------------------------------------------------------

#[test]
fn text_match_returns_files_but_never_directories() {
    let content = FixedContent::new(true, 10);
    let seen = Arc::clone(&content.seen);

    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .with_filter(MatchAll)
        .text("test")
        .content_matcher(content)
        .run()
        .unwrap();

    assert_eq!(
        set(&results.paths),
        pathset(&["/root/file1.txt", "/root/sub/file2.txt"])
    );
    let scanned = seen.lock().unwrap().clone();
    assert_eq!(set(&scanned), pathset(&["/root/file1.txt", "/root/sub/file2.txt"]));
    assert_eq!(results.summary.bytes_read, 20);
}

#[test]
fn files_without_the_text_are_dropped_but_still_counted() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .text("test")
        .content_matcher(FixedContent::new(false, 7))
        .run()
        .unwrap();

    assert!(results.paths.is_empty());
    assert_eq!(results.summary.bytes_read, 14);
    assert!(results.summary.to_string().contains("and read"));
}

#[test]
fn scan_errors_are_streamed() {
    let results = search()
        .root("/root")
        .walker(ScriptedWalker::small_tree())
        .text("test")
        .content_matcher(FailingContent)
        .run()
        .unwrap();

    assert!(results.paths.is_empty());
    assert_eq!(results.errors.len(), 2);
    assert!(results.errors.iter().all(|e| matches!(e, SearchError::Read { .. })));
    assert_eq!(results.summary.bytes_read, 6);
}

#[test]
fn traversal_and_scan_errors_share_one_stream() {
    let walker = ScriptedWalker(vec![
        Ok(("/root/a.txt", EntryKind::File)),
        Err("/root/locked"),
    ]);
    let results = search()
        .root("/root")
        .walker(walker)
        .text("test")
        .content_matcher(FailingContent)
        .run()
        .unwrap();

    assert_eq!(results.errors.len(), 2);
    assert!(results.errors.iter().any(|e| matches!(e, SearchError::PermissionDenied(_))));
    assert!(results.errors.iter().any(|e| matches!(e, SearchError::Read { .. })));
}

#[test]
fn worker_pool_handles_many_candidates() {
    let results = search()
        .root("/wide")
        .walker(WideWalker(1_000))
        .text("x")
        .workers(8)
        .content_matcher(FixedContent::new(true, 1))
        .run()
        .unwrap();

    assert_eq!(results.matches(), 1_000);
    assert_eq!(set(&results.paths).len(), 1_000, "no duplicates");
    assert_eq!(results.summary.bytes_read, 1_000);
    assert_eq!(results.summary.files, 1_000);
}

#[test]
fn content_runs_are_repeatable() {
    let run = || {
        search()
            .root("/wide")
            .walker(WideWalker(200))
            .text("x")
            .content_matcher(FixedContent::new(true, 1))
            .run()
            .unwrap()
    };
    assert_eq!(set(&run().paths), set(&run().paths));
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn cancelling_before_the_walk_yields_nothing() {
    for text in [None, Some("test")] {
        let token = CancelToken::new();
        token.cancel();

        let mut builder = search()
            .root("/root")
            .walker(ScriptedWalker::small_tree())
            .content_matcher(FixedContent::new(true, 1))
            .cancel_token(token);
        if let Some(t) = text {
            builder = builder.text(t);
        }
        let results = builder.run().unwrap();

        assert!(results.paths.is_empty());
        assert!(results.errors.is_empty(), "cancellation is not an error");
        assert!(results.cancelled);
        assert_eq!(results.summary.visited(), 0);
    }
}

#[test]
fn cancelling_mid_walk_keeps_partial_results() {
    let token = CancelToken::new();
    let handle = search()
        .root("/wide")
        .walker(WideWalker(100))
        .with_filter(CancelAfter { after: 3, seen: 0, token: token.clone() })
        .cancel_token(token)
        .start()
        .unwrap();

    let paths: Vec<_> = handle.paths().iter().collect();
    let done = handle.wait();

    assert!(done.is_cancelled());
    assert_eq!(paths.len(), 3);
    assert_eq!(done.summary.files, 3);
}

#[test]
fn cancelling_a_content_search_winds_down_the_workers() {
    let token = CancelToken::new();
    let handle = search()
        .root("/wide")
        .walker(WideWalker(10_000))
        .with_filter(CancelAfter { after: 10, seen: 0, token: token.clone() })
        .text("x")
        .content_matcher(FixedContent::new(true, 1))
        .cancel_token(token)
        .start()
        .unwrap();

    let paths: Vec<_> = handle.paths().iter().collect();
    let errors: Vec<_> = handle.errors().iter().collect();
    let done = handle.wait();

    assert!(done.is_cancelled());
    assert!(paths.len() <= 10);
    assert!(errors.is_empty());
    assert_eq!(done.summary.files, 10);
}

#[test]
fn cancelling_after_the_walk_still_reports_cancelled() {
    let scanned = Arc::new(Mutex::new(0));
    let results = search()
        .root("/wide")
        .walker(WideWalker(10))
        .text("x")
        .workers(1)
        .content_matcher(SlowThenCancel { scanned: Arc::clone(&scanned) })
        .run()
        .unwrap();

    // The whole walk fits in the candidate queue before the first scan ends.
    assert_eq!(results.summary.files, 10);
    assert_eq!(*scanned.lock().unwrap(), 1);
    assert_eq!(results.paths.len(), 1);
    assert!(results.cancelled, "unscanned candidates must not look like a full run");
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn rejects_zero_workers() {
    let err = search().root("/root").workers(0).run().unwrap_err();
    assert!(matches!(err, SearchError::InvalidWorkerCount(0)));
}

#[test]
fn requires_a_root() {
    let err = search().walker(ScriptedWalker::small_tree()).run().unwrap_err();
    assert!(matches!(err, SearchError::InvalidRoot(_)));
}
