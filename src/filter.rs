use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::SearchConfig;
use crate::entry::Entry;
use crate::pattern::NamePatterns;
use crate::traits::EntryFilter;

// ---------------------------------------------------------------------------
// PathFilter
// ---------------------------------------------------------------------------

/// Name and type filtering for one run.
///
/// Owns the list of directories rejected by an exclude pattern. Anything
/// below one of them is rejected without looking at its own name, so the
/// filter must see a directory before its descendants.
#[derive(Debug)]
pub struct PathFilter {
    include_names: NamePatterns,
    exclude_names: NamePatterns,
    include_directories: bool,
    include_files: bool,
    content_search: bool,

    /// Append-only for the lifetime of the run.
    excluded_dirs: Vec<PathBuf>,
}

impl PathFilter {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            include_names: NamePatterns::new(&config.include_names),
            exclude_names: NamePatterns::new(&config.exclude_names),
            include_directories: config.include_directories,
            include_files: config.include_files,
            content_search: config.is_content_search(),
            excluded_dirs: Vec::new(),
        }
    }

    /// Decide whether `path` passes name and type filtering. First rule wins.
    ///
    /// A passing file still has to clear the content check downstream when
    /// the run is a content search.
    pub fn check(&mut self, path: &Path, is_dir: bool) -> bool {
        if self.is_pruned(path) {
            return false;
        }
        if !self.exclude_names.is_empty() && self.exclude_names.matches(path) {
            if is_dir {
                trace!(path = %path.display(), "pruning excluded directory");
                self.excluded_dirs.push(path.to_path_buf());
            }
            return false;
        }
        if is_dir && !self.include_directories {
            return false;
        }
        if !is_dir && !self.include_files {
            return false;
        }
        if !self.include_names.is_empty() && !self.include_names.matches(path) {
            return false;
        }
        // Directories never satisfy a content predicate.
        if self.content_search && is_dir {
            return false;
        }
        true
    }

    /// Directories rejected so far, in the order they were seen.
    pub fn excluded_dirs(&self) -> &[PathBuf] {
        &self.excluded_dirs
    }

    fn is_pruned(&self, path: &Path) -> bool {
        self.excluded_dirs.iter().any(|dir| path.starts_with(dir))
    }
}

impl EntryFilter for PathFilter {
    fn is_match(&mut self, entry: &Entry) -> bool {
        self.check(&entry.path, entry.is_dir())
    }
}
