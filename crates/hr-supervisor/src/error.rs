//! Error types for the hr-supervisor crate.

/// Errors that can occur while supervising the child process.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SuperviseError {
    /// The child could not be started. No child is left running.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// The executable that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A termination signal handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    /// Waiting on the child failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SuperviseError {
    /// Creates a new [`SuperviseError::Spawn`] error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Returns `true` if the supervisor can keep going after this error.
    ///
    /// A failed spawn leaves the slot empty; the next restart may succeed.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_spawn_is_recoverable() {
        let err = SuperviseError::spawn("node", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_recoverable());
        assert!(err.to_string().starts_with("failed to start 'node'"));
    }

    #[test]
    fn test_signal_is_fatal() {
        let err = SuperviseError::Signal(io::Error::other("no handler"));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "failed to install signal handler: no handler");
    }
}
