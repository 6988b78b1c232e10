//! Coalescing bursts of change events into one settle.
//!
//! ```text
//! events:   a   b   c   d                     e
//!           │   │   │   │                     │
//! time ms:  0   30  60  90 ─── quiet ───► 190 340 ─── quiet ───► 440
//!                               settle [a,b,c,d]     settle [e]
//! ```
//!
//! Every event pushes the single pending deadline to `now + DEBOUNCE_WINDOW`.
//! The batch settles once the deadline passes without another event.

use std::time::Duration;

use camino::Utf8PathBuf;
use tokio::time::Instant;

use crate::events::ChangeBatch;

/// Quiet period after the last event before a batch settles.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// Owns the pending [`ChangeBatch`] and its settle deadline.
///
/// # Examples
///
/// ```
/// use hr_watcher::Debouncer;
/// use camino::Utf8PathBuf;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut debouncer = Debouncer::new();
/// debouncer.push(Utf8PathBuf::from("app/a.js"));
/// debouncer.push(Utf8PathBuf::from("app/b.js"));
///
/// let batch = debouncer.settled().await;
/// assert_eq!(batch.len(), 2);
/// assert!(!debouncer.is_armed());
/// # }
/// ```
#[derive(Debug)]
pub struct Debouncer {
    batch: ChangeBatch,
    deadline: Option<Instant>,
    window: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    /// Creates a debouncer with the standard 100 ms window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEBOUNCE_WINDOW)
    }

    /// Creates a debouncer with a custom quiet period.
    #[must_use]
    pub fn with_window(window: Duration) -> Self {
        Self {
            batch: ChangeBatch::new(),
            deadline: None,
            window,
        }
    }

    /// Records a compile-relevant path and rearms the deadline.
    pub fn push(&mut self, path: Utf8PathBuf) {
        self.batch.push(path);
        self.touch();
    }

    /// Rearms the deadline without recording a path.
    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    /// Returns `true` while a settle is pending.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Paths recorded since the last settle.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> &ChangeBatch {
        &self.batch
    }

    /// Waits for the deadline and drains the batch.
    ///
    /// Never resolves while no deadline is armed. Cancel-safe: dropping the
    /// future before it resolves leaves the batch and deadline untouched, so
    /// it can be polled from a `tokio::select!` loop.
    pub async fn settled(&mut self) -> ChangeBatch {
        let Some(deadline) = self.deadline else {
            return std::future::pending().await;
        };

        tokio::time::sleep_until(deadline).await;

        self.deadline = None;
        std::mem::take(&mut self.batch)
    }
}
