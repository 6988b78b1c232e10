//! Error types for the hr-watcher crate.

use camino::Utf8PathBuf;

/// Errors that can occur while watching a tree.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): fatal, the watcher cannot run
/// - **Path not found** ([`WatchError::PathNotFound`]): fatal, the root must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): fatal, the consumer is gone
/// - **I/O errors** ([`WatchError::Io`]): fatal
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The notify backend failed to start or watch.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The watch root does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The watcher task went away.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// Canonicalizing the watch root failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if watching can continue after this error.
    ///
    /// Every variant stops the watcher; per-event problems such as non-UTF-8
    /// paths are dropped before they become errors.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }

    /// Returns `true` if watching must stop.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) => Some(path),
            Self::Notify(_) | Self::ChannelClosed | Self::Io(_) => None,
        }
    }
}
