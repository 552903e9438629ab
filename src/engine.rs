use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::entry::Entry;
use crate::error::SearchError;
use crate::results::{Summary, SummaryRecorder};
use crate::traits::{ContentMatcher, EntryFilter, Walker};

/// Scan workers used when the caller doesn't pick a number.
pub const DEFAULT_WORKERS: usize = 4;

/// Candidate channel slots per worker. Bounds how far the walk may run ahead
/// of content scanning.
const CANDIDATES_PER_WORKER: usize = 16;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub config:  Arc<SearchConfig>,
    pub workers: usize,
    pub walker:  Arc<dyn Walker>,
    pub filter:  Box<dyn EntryFilter>,
    pub content: Arc<dyn ContentMatcher>,
    pub cancel:  CancelToken,
}

/// The two output streams, as seen by the producers.
pub(crate) struct Streams {
    pub paths:  Sender<PathBuf>,
    pub errors: Sender<SearchError>,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// How a run ended.
#[derive(Debug)]
pub struct Completion {
    /// Counts and timing, stamped after every producer finished.
    pub summary: Summary,

    /// `Ok` for a full walk, `Err(SearchError::Cancelled)` when the cancel
    /// token stopped it, or the walker's own fatal error.
    pub status: Result<(), SearchError>,
}

impl Completion {
    pub fn is_cancelled(&self) -> bool {
        matches!(&self.status, Err(e) if e.is_cancelled())
    }
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Execute one search over `root`.
///
/// Name/type-only searches send matches straight from the traversal to the
/// caller. Content searches put a pool of scan workers between the two.
/// Both streams close when `streams` and every clone of it are dropped, which
/// happens only after the traversal and all workers are done.
pub(crate) fn run(root: &Path, opts: EngineOptions, streams: Streams) -> Completion {
    let EngineOptions { config, workers, walker, mut filter, content, cancel } = opts;
    let recorder = SummaryRecorder::start();

    if config.exclude_text.as_deref().is_some_and(|t| !t.is_empty()) {
        debug!("exclude-text is accepted but not applied to content filtering");
    }

    let status = match config.needle() {
        None => {
            debug!(root = %root.display(), "starting name search");
            let traversal = Traversal {
                walker: walker.as_ref(),
                filter: filter.as_mut(),
                recorder: &recorder,
                cancel: &cancel,
                content_search: false,
            };
            traversal.run(root, &streams.paths, &streams.errors)
        }
        Some(needle) => {
            debug!(root = %root.display(), workers, "starting content search");
            let traversal = Traversal {
                walker: walker.as_ref(),
                filter: filter.as_mut(),
                recorder: &recorder,
                cancel: &cancel,
                content_search: true,
            };
            let pool = ScanPool {
                workers,
                needle,
                content: content.as_ref(),
                recorder: &recorder,
                cancel: &cancel,
            };
            pool.run(root, traversal, &streams)
        }
    };

    let summary = recorder.finish();
    drop(streams);

    match &status {
        Ok(()) => info!(
            dirs = summary.directories,
            files = summary.files,
            bytes = summary.bytes_read,
            elapsed_ms = summary.elapsed().as_millis() as u64,
            "search completed"
        ),
        Err(e) if e.is_cancelled() => info!("search cancelled"),
        Err(e) => warn!(error = %e, "search aborted"),
    }

    Completion { summary, status }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// The single producer. Owns the filter for the duration of the walk.
struct Traversal<'a> {
    walker:         &'a dyn Walker,
    filter:         &'a mut dyn EntryFilter,
    recorder:       &'a SummaryRecorder,
    cancel:         &'a CancelToken,
    content_search: bool,
}

impl Traversal<'_> {
    /// Walk `root`, sending candidates to `out` and per-entry failures to
    /// `errors`.
    fn run(self, root: &Path, out: &Sender<PathBuf>, errors: &Sender<SearchError>) -> Result<(), SearchError> {
        let Traversal { walker, filter, recorder, cancel, content_search } = self;

        // Some walkers touch the filesystem before their first visit.
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        walker.walk(root, &mut |res: Result<Entry, SearchError>| {
            if cancel.is_cancelled() {
                return Err(SearchError::Cancelled);
            }

            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable entry");
                    // The caller may have stopped listening; the walk goes on.
                    let _ = errors.send(e);
                    return Ok(());
                }
            };

            let is_dir = entry.is_dir();
            recorder.record_entry(is_dir);

            if !filter.is_match(&entry) {
                return Ok(());
            }
            // Directories never reach the content scanner, whatever the filter says.
            if content_search && is_dir {
                return Ok(());
            }

            if out.send(entry.path).is_err() && content_search {
                // Every scan worker is gone.
                return Err(if cancel.is_cancelled() {
                    SearchError::Cancelled
                } else {
                    SearchError::WorkerPanicked
                });
            }
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// ScanPool
// ---------------------------------------------------------------------------

/// Fan-out of traversal candidates to a fixed set of content-scan workers.
struct ScanPool<'a> {
    workers:  usize,
    needle:   &'a str,
    content:  &'a dyn ContentMatcher,
    recorder: &'a SummaryRecorder,
    cancel:   &'a CancelToken,
}

impl ScanPool<'_> {
    fn run(self, root: &Path, traversal: Traversal<'_>, streams: &Streams) -> Result<(), SearchError> {
        let (candidates_tx, candidates_rx) = bounded::<PathBuf>(self.workers * CANDIDATES_PER_WORKER);

        thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.workers);
            for id in 0..self.workers {
                let worker = ScanWorker {
                    id,
                    candidates: candidates_rx.clone(),
                    paths: streams.paths.clone(),
                    errors: streams.errors.clone(),
                    needle: self.needle,
                    content: self.content,
                    recorder: self.recorder,
                    cancel: self.cancel,
                };
                let spawned = thread::Builder::new()
                    .name(format!("dirsearch-scan-{id}"))
                    .spawn_scoped(s, move || worker.run());
                match spawned {
                    Ok(h) => handles.push(h),
                    Err(e) => {
                        warn!(worker = id, error = %e, "failed to spawn scan worker");
                        break;
                    }
                }
            }
            // Workers hold the only receivers from here on.
            drop(candidates_rx);

            if handles.is_empty() {
                return Err(SearchError::WorkerPanicked);
            }

            // Traversal errors share the error stream through their own sender
            // clone, so neither side can close it early.
            let walked = traversal.run(root, &candidates_tx, &streams.errors);
            drop(candidates_tx);

            let mut panicked = false;
            for h in handles {
                panicked |= h.join().is_err();
            }

            match walked {
                Ok(()) if panicked => Err(SearchError::WorkerPanicked),
                // Workers drop queued candidates once the token trips, so a
                // walk that finished cleanly can still have unscanned files.
                Ok(()) if self.cancel.is_cancelled() => Err(SearchError::Cancelled),
                other => other,
            }
        })
    }
}

struct ScanWorker<'a> {
    id:         usize,
    candidates: Receiver<PathBuf>,
    paths:      Sender<PathBuf>,
    errors:     Sender<SearchError>,
    needle:     &'a str,
    content:    &'a dyn ContentMatcher,
    recorder:   &'a SummaryRecorder,
    cancel:     &'a CancelToken,
}

impl ScanWorker<'_> {
    fn run(self) {
        let mut scanned = 0u64;
        for path in self.candidates.iter() {
            if self.cancel.is_cancelled() {
                break;
            }
            scanned += 1;
            match self.content.scan_file(&path, self.needle, self.cancel) {
                Ok(outcome) => {
                    self.recorder.add_bytes(outcome.bytes_read);
                    if outcome.found {
                        let _ = self.paths.send(path);
                    }
                }
                Err(e) => {
                    self.recorder.add_bytes(e.bytes_read());
                    let _ = self.errors.send(e);
                }
            }
        }
        debug!(worker = self.id, scanned, "scan worker finished");
    }
}
