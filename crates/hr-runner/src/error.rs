//! Runner error types.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that end a run.
///
/// Per-file compile and copy failures never show up here: they are logged
/// with the pass summary and the loop carries on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] hr_core::ConfigError),

    /// The file watcher failed to start.
    #[error("watcher error: {0}")]
    Watcher(#[from] hr_watcher::WatchError),

    /// Signal handlers could not be installed, or the one-shot child failed.
    #[error("process error: {0}")]
    Process(#[from] hr_supervisor::SuperviseError),

    /// A compile-only pass panicked on the blocking pool.
    #[error("compile pass aborted: {0}")]
    Pass(#[from] tokio::task::JoinError),

    /// The working directory is not valid UTF-8.
    #[error("working directory is not valid UTF-8: {}", _0.display())]
    NonUtf8Cwd(std::path::PathBuf),

    /// The working directory could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Watcher(e) => e.path(),
            _ => None,
        }
    }
}
