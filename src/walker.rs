use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::entry::{Entry, EntryKind};
use crate::error::SearchError;
use crate::traits::{Visit, Walker};

// ---------------------------------------------------------------------------
// FsWalker
// ---------------------------------------------------------------------------

/// Default [`Walker`] over the local filesystem.
///
/// Single-threaded and sorted by file name within each directory, so two walks
/// over an unchanged tree visit the same entries in the same order. No ignore
/// files are honoured, hidden entries are included and links are not followed.
/// The root is visited as an entry of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker;

impl Walker for FsWalker {
    fn walk(&self, root: &Path, visit: &mut Visit<'_>) -> Result<(), SearchError> {
        // A root we can't stat is a walk failure, not a skipped entry.
        std::fs::symlink_metadata(root).map_err(|e| map_io_error(root.to_path_buf(), e))?;

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for result in walker {
            match result {
                Ok(dent) => {
                    let Some(ft) = dent.file_type() else {
                        continue;
                    };
                    let kind = EntryKind::from_file_type(ft);
                    let depth = dent.depth();
                    visit(Ok(Entry::new(dent.into_path(), kind, depth)))?;
                }
                Err(e) => visit(Err(map_ignore_error(e)))?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to SearchError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> SearchError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => map_io_error(path, io_err),
            other => SearchError::Io {
                path,
                source: io::Error::new(io::ErrorKind::Other, other.to_string()),
            },
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::Loop { child, .. } => SearchError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => map_io_error(PathBuf::new(), io_err),
        other => SearchError::Walk(other.to_string()),
    }
}

fn map_io_error(path: PathBuf, source: io::Error) -> SearchError {
    match source.kind() {
        io::ErrorKind::PermissionDenied => SearchError::PermissionDenied(path),
        io::ErrorKind::NotFound => SearchError::NotFound(path),
        _ => SearchError::Io { path, source },
    }
}
