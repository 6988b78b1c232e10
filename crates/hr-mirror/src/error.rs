//! Error types for the hr-mirror crate.
//!
//! This module provides the [`MirrorError`] type for errors that can occur
//! while listing the source tree and writing the runtime tree.

use camino::Utf8PathBuf;

use crate::compiler::CompileError;

/// Errors that can occur while mirroring the source tree.
///
/// # Error Recovery Strategy
///
/// - **Walker errors** ([`MirrorError::Walk`]): the unreadable entry is skipped
/// - **I/O errors** ([`MirrorError::Io`]): the file is skipped, the batch continues
/// - **Transform errors** ([`MirrorError::Transform`]): the mirror stays stale,
///   the batch continues
/// - **Non-UTF-8 paths** ([`MirrorError::NonUtf8Path`]): the entry is skipped
///
/// # Examples
///
/// ```
/// use hr_mirror::MirrorError;
///
/// fn handle_error(err: MirrorError) {
///     match err {
///         MirrorError::Walk(e) => eprintln!("Walk error: {e}"),
///         MirrorError::Io { path, .. } => eprintln!("I/O error: {path}"),
///         MirrorError::Transform { path, .. } => eprintln!("Compile error: {path}"),
///         MirrorError::NonUtf8Path(p) => eprintln!("Invalid path: {}", p.display()),
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Failed to list a directory entry.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to stat, read, or write a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path being read or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external compiler rejected a file.
    #[error("failed to compile {path}: {source}")]
    Transform {
        /// The source file that failed to compile.
        path: Utf8PathBuf,
        /// The underlying compiler error.
        #[source]
        source: CompileError,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl MirrorError {
    /// Creates a new [`MirrorError::Io`] error.
    #[inline]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`MirrorError::Transform`] error.
    #[inline]
    pub fn transform(path: impl Into<Utf8PathBuf>, source: CompileError) -> Self {
        Self::Transform {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error only affects a single file.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Transform { .. })
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Io { path, .. } | Self::Transform { path, .. } => Some(path),
            Self::Walk(_) | Self::NonUtf8Path(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_mirror_error_io() {
        let err = MirrorError::io(
            "app/a.js",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("app/a.js"));
        assert!(err.to_string().contains("app/a.js"));
    }

    #[test]
    fn test_mirror_error_transform() {
        let err = MirrorError::transform(
            "app/b.js",
            CompileError::Failed {
                program: "babel".to_owned(),
                code: Some(1),
                stderr: "SyntaxError: Unexpected token".to_owned(),
            },
        );
        assert!(err.is_recoverable());
        assert_eq!(err.path().map(|p| p.as_str()), Some("app/b.js"));
        assert!(err.to_string().starts_with("failed to compile app/b.js"));
    }

    #[test]
    fn test_mirror_error_non_utf8() {
        let err = MirrorError::NonUtf8Path(std::path::PathBuf::from("bad"));
        assert!(err.is_fatal());
        assert!(err.path().is_none());
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
