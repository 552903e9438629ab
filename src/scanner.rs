use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use memchr::memmem::Finder;

use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::traits::ContentMatcher;

/// Read buffer for content scans. Longer lines are reassembled across reads.
const READ_BUFFER_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// ScanOutcome
// ---------------------------------------------------------------------------

/// Result of scanning one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    /// Some line contained the needle.
    pub found: bool,

    /// Line bytes consumed, terminators excluded.
    pub bytes_read: u64,
}

/// A read failure partway through a stream.
#[derive(Debug)]
pub struct ScanError {
    pub bytes_read: u64,
    pub source: io::Error,
}

// ---------------------------------------------------------------------------
// scan()
// ---------------------------------------------------------------------------

/// Search `reader` line by line for `needle` as a literal byte substring.
///
/// Stops at the first containing line. The token is checked before each
/// line; a cancelled scan returns what it has read so far as a non-match.
pub fn scan<R: Read>(reader: R, needle: &[u8], cancel: &CancelToken) -> Result<ScanOutcome, ScanError> {
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, reader);
    let finder = Finder::new(needle);
    let mut line = Vec::new();
    let mut bytes_read = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Ok(ScanOutcome { found: false, bytes_read });
        }

        line.clear();
        let n = match reader.read_until(b'\n', &mut line) {
            Ok(n) => n,
            Err(source) => {
                // Partial bytes of the failed line still count as consumed.
                bytes_read += trim_terminator(&line).len() as u64;
                return Err(ScanError { bytes_read, source });
            }
        };
        if n == 0 {
            return Ok(ScanOutcome { found: false, bytes_read });
        }

        let content = trim_terminator(&line);
        bytes_read += content.len() as u64;
        if finder.find(content).is_some() {
            return Ok(ScanOutcome { found: true, bytes_read });
        }
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_terminator(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => line,
    }
}

// ---------------------------------------------------------------------------
// FileContentMatcher
// ---------------------------------------------------------------------------

/// Default [`ContentMatcher`]: opens the file from disk and runs [`scan`] over it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileContentMatcher;

impl ContentMatcher for FileContentMatcher {
    fn scan_file(&self, path: &Path, needle: &str, cancel: &CancelToken) -> Result<ScanOutcome, SearchError> {
        let file = File::open(path).map_err(|source| SearchError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        scan(file, needle.as_bytes(), cancel).map_err(|e| SearchError::Read {
            path: path.to_path_buf(),
            bytes_read: e.bytes_read,
            source: e.source,
        })
    }
}
