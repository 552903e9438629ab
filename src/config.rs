// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// What a run is looking for. Built once, read-only for the whole run.
///
/// The zero value includes neither files nor directories, so it matches
/// nothing. The [`SearchBuilder`](crate::SearchBuilder) starts from friendlier
/// defaults (both kinds included).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Glob patterns an entry's name must match. Empty = no restriction.
    pub include_names: Vec<String>,

    /// Glob patterns that reject an entry, and prune everything below a
    /// rejected directory.
    pub exclude_names: Vec<String>,

    pub include_directories: bool,
    pub include_files: bool,

    /// Literal text a file must contain, matched line by line.
    pub include_text: Option<String>,

    /// Accepted and reported, but has no effect on content filtering.
    pub exclude_text: Option<String>,
}

impl SearchConfig {
    /// A content search routes file candidates through the scanner workers.
    pub fn is_content_search(&self) -> bool {
        self.include_text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The needle for content search, when there is one.
    pub fn needle(&self) -> Option<&str> {
        self.include_text.as_deref().filter(|t| !t.is_empty())
    }
}
