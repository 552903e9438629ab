use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cooperative cancellation flag.
///
/// Cloning is cheap and every clone observes the same flag. Nothing is
/// interrupted preemptively: the traversal checks the token once per entry and
/// the content scanner once per line.
///
/// ```rust
/// let token = dirsearch::CancelToken::new();
/// let handler_copy = token.clone();
/// handler_copy.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
