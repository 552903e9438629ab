use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::warn;

/// Shell-style glob matching, case-sensitive, no recursive `**`.
/// Separators never occur in the tested segment anyway.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

// ---------------------------------------------------------------------------
// NamePatterns
// ---------------------------------------------------------------------------

/// A set of glob patterns tested against the final segment of a path.
///
/// Patterns are compiled once. A malformed pattern is kept in the count but
/// can never match, so `["[oops"]` is a non-empty set that rejects everything.
#[derive(Debug, Clone, Default)]
pub struct NamePatterns {
    compiled: Vec<Pattern>,
    supplied: usize,
}

impl NamePatterns {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        let mut supplied = 0;
        for raw in patterns {
            supplied += 1;
            let Some(normalized) = normalize(raw.as_ref()) else {
                warn!(pattern = raw.as_ref(), "ignoring glob pattern with a dangling escape");
                continue;
            };
            match Pattern::new(&normalized) {
                Ok(p) => compiled.push(p),
                Err(e) => warn!(pattern = raw.as_ref(), error = %e, "ignoring malformed glob pattern"),
            }
        }
        Self { compiled, supplied }
    }

    /// `true` when the caller supplied no patterns at all, meaning
    /// "no restriction" to the path filter.
    pub fn is_empty(&self) -> bool {
        self.supplied == 0
    }

    /// Returns `true` if any pattern matches the last segment of `path`.
    pub fn matches(&self, path: &Path) -> bool {
        let name = final_segment(path);
        self.compiled
            .iter()
            .any(|p| p.matches_with(&name, MATCH_OPTIONS))
    }
}

/// Rewrites fnmatch syntax into the dialect `glob::Pattern` accepts.
///
/// Runs of `*` collapse to one, since `**` is only legal to `glob` as a
/// whole path component. A backslash escapes the next character; the
/// metacharacters become one-member classes. A leading `^` in a class
/// negates like `!`. Class bodies are otherwise copied as written.
/// Returns `None` for a trailing lone backslash.
fn normalize(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.next_if_eq(&'*').is_some() {}
                out.push('*');
            }
            '\\' => match chars.next()? {
                m @ ('*' | '?' | '[' | ']') => {
                    out.push('[');
                    out.push(m);
                    out.push(']');
                }
                lit => out.push(lit),
            },
            '[' => {
                out.push('[');
                if chars.next_if_eq(&'^').is_some() {
                    out.push('!');
                } else if chars.next_if_eq(&'!').is_some() {
                    out.push('!');
                }
                // A `]` straight after the opener is a member, not the close.
                if chars.next_if_eq(&']').is_some() {
                    out.push(']');
                }
                for m in chars.by_ref() {
                    out.push(m);
                    if m == ']' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Text after the last separator. The filesystem root has an empty name.
fn final_segment(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default()
}

/// One-shot form of [`NamePatterns::matches`] for callers holding raw strings.
pub fn matches<S: AsRef<str>>(patterns: &[S], path: &Path) -> bool {
    NamePatterns::new(patterns).matches(path)
}
