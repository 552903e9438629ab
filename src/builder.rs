use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, unbounded};

use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::engine::{Completion, DEFAULT_WORKERS, EngineOptions, Streams, run};
use crate::error::SearchError;
use crate::filter::PathFilter;
use crate::results::{Results, Summary};
use crate::scanner::FileContentMatcher;
use crate::traits::{ContentMatcher, EntryFilter, Walker};
use crate::walker::FsWalker;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`dirsearch::search()`](crate::search). Configure with chained
/// builder methods, then call [`start()`](SearchBuilder::start) to stream
/// results or [`run()`](SearchBuilder::run) to collect them.
///
/// # Example
///
/// ```rust,ignore
/// let results = dirsearch::search()
///     .root("/src/project")
///     .include_names(["*.rs"])
///     .exclude_names([".git", "target"])
///     .text("unsafe")
///     .run()?;
/// ```
pub struct SearchBuilder {
    root:     Option<PathBuf>,
    config:   SearchConfig,
    workers:  usize,
    walker:   Option<Arc<dyn Walker>>,
    filter:   Option<Box<dyn EntryFilter>>,
    content:  Option<Arc<dyn ContentMatcher>>,
    cancel:   CancelToken,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            root:    None,
            config:  SearchConfig {
                include_directories: true,
                include_files: true,
                ..SearchConfig::default()
            },
            workers: DEFAULT_WORKERS,
            walker:  None,
            filter:  None,
            content: None,
            cancel:  CancelToken::new(),
        }
    }
}

impl SearchBuilder {
    // ── Root ──────────────────────────────────────────────────────────────

    /// Directory to search. Required.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    // ── Name and type filtering ───────────────────────────────────────────

    /// Replace the whole configuration at once.
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Glob patterns an entry's final path segment must match.
    /// No patterns means no name restriction.
    pub fn include_names<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.include_names = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Glob patterns that reject an entry. A rejected directory also rejects
    /// everything below it.
    pub fn exclude_names<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude_names = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Report directories. On by default.
    pub fn directories(mut self, yes: bool) -> Self {
        self.config.include_directories = yes;
        self
    }

    /// Report files. On by default.
    pub fn files(mut self, yes: bool) -> Self {
        self.config.include_files = yes;
        self
    }

    // ── Content ───────────────────────────────────────────────────────────

    /// Only report files with a line containing `text`. Turns on the
    /// concurrent content-scan stage; directories are never reported.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.config.include_text = Some(text.into());
        self
    }

    /// Recorded in the configuration but not applied.
    pub fn exclude_text(mut self, text: impl Into<String>) -> Self {
        self.config.exclude_text = Some(text.into());
        self
    }

    /// Number of content-scan workers. Defaults to 4. Ignored for name-only
    /// searches, which never spawn workers.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    // ── Collaborators ─────────────────────────────────────────────────────

    /// Replace the filesystem walker.
    pub fn walker(mut self, w: impl Walker + 'static) -> Self {
        self.walker = Some(Arc::new(w));
        self
    }

    /// Replace the name/type filter. The default is a [`PathFilter`] built
    /// from the configuration.
    pub fn with_filter(mut self, f: impl EntryFilter + 'static) -> Self {
        self.filter = Some(Box::new(f));
        self
    }

    /// Replace the content scanner used for `.text()` searches.
    pub fn content_matcher(mut self, m: impl ContentMatcher + 'static) -> Self {
        self.content = Some(Arc::new(m));
        self
    }

    /// Share a cancellation token with the run, e.g. to trip it from a
    /// signal handler.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Start the search on a background thread and return its streams.
    ///
    /// # Errors
    ///
    /// Returns `Err` for configuration problems (no root, zero workers) or
    /// when the coordinator thread can't be spawned. Everything that happens
    /// during the walk is reported through the handle.
    pub fn start(self) -> Result<SearchHandle, SearchError> {
        let root = match self.root {
            Some(r) if !r.as_os_str().is_empty() => r,
            other => return Err(SearchError::InvalidRoot(other.unwrap_or_default())),
        };
        if self.workers == 0 {
            return Err(SearchError::InvalidWorkerCount(0));
        }

        let filter: Box<dyn EntryFilter> = match self.filter {
            Some(f) => f,
            None    => Box::new(PathFilter::new(&self.config)),
        };
        let walker: Arc<dyn Walker> = match self.walker {
            Some(w) => w,
            None    => Arc::new(FsWalker),
        };
        let content: Arc<dyn ContentMatcher> = match self.content {
            Some(m) => m,
            None    => Arc::new(FileContentMatcher),
        };

        let opts = EngineOptions {
            config:  Arc::new(self.config),
            workers: self.workers,
            walker,
            filter,
            content,
            cancel:  self.cancel.clone(),
        };

        let (paths_tx, paths_rx) = unbounded();
        let (errors_tx, errors_rx) = unbounded();
        let streams = Streams { paths: paths_tx, errors: errors_tx };

        let coordinator = thread::Builder::new()
            .name("dirsearch-walk".into())
            .spawn(move || run(&root, opts, streams))
            .map_err(SearchError::Spawn)?;

        Ok(SearchHandle {
            paths:  paths_rx,
            errors: errors_rx,
            cancel: self.cancel,
            coordinator,
        })
    }

    /// Run the search to completion and collect everything it produced.
    ///
    /// # Errors
    ///
    /// Configuration errors as for [`start()`](SearchBuilder::start), plus the
    /// walker's fatal error if the walk itself failed. Cancellation is not an
    /// error: it is reported through [`Results::cancelled`].
    pub fn run(self) -> Result<Results, SearchError> {
        let handle = self.start()?;

        // Both streams are unbounded, so draining one at a time can't stall
        // the producers.
        let paths: Vec<PathBuf> = handle.paths().iter().collect();
        let errors: Vec<SearchError> = handle.errors().iter().collect();

        let Completion { summary, status } = handle.wait();
        let cancelled = match status {
            Ok(()) => false,
            Err(SearchError::Cancelled) => true,
            Err(e) => return Err(e),
        };

        Ok(Results {
            paths,
            errors,
            summary,
            cancelled,
        })
    }
}

// ---------------------------------------------------------------------------
// SearchHandle
// ---------------------------------------------------------------------------

/// A running search.
///
/// `paths()` and `errors()` stream results as they are found. Each stream ends
/// once nothing more will be written to it. Neither stream has a guaranteed
/// order when content search is active.
pub struct SearchHandle {
    paths:       Receiver<PathBuf>,
    errors:      Receiver<SearchError>,
    cancel:      CancelToken,
    coordinator: JoinHandle<Completion>,
}

impl SearchHandle {
    /// Matched paths.
    pub fn paths(&self) -> &Receiver<PathBuf> {
        &self.paths
    }

    /// Per-entry failures. The walk carries on after each one.
    pub fn errors(&self) -> &Receiver<SearchError> {
        &self.errors
    }

    /// Ask the run to stop. Already-streamed results stay valid.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the run is over and return its summary and terminal status.
    pub fn wait(self) -> Completion {
        match self.coordinator.join() {
            Ok(done) => done,
            Err(_) => {
                let now = Instant::now();
                Completion {
                    summary: Summary {
                        directories: 0,
                        files: 0,
                        bytes_read: 0,
                        started: now,
                        finished: now,
                    },
                    status: Err(SearchError::WorkerPanicked),
                }
            }
        }
    }
}
