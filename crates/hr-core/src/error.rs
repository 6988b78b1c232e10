//! Configuration errors.

use camino::Utf8PathBuf;

/// Why a configuration could not be loaded or was rejected.
///
/// # Examples
///
/// ```
/// use hr_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::InvalidPath {
///     path: Utf8PathBuf::new(),
///     reason: "runtime directory must not be empty".to_owned(),
/// };
/// assert!(error.to_string().contains("must not be empty"));
/// assert!(error.is_fatal());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A directory setting is unusable.
    #[error("bad path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path.
        path: Utf8PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A setting has a value hotrun cannot work with.
    #[error("bad value for '{option}': {reason}")]
    InvalidOption {
        /// Dotted setting name, e.g. `compiler.program`.
        option: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The config file exists but could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for [`Config`](crate::Config).
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Config errors always abort startup.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }

    /// Returns `true`; see [`is_recoverable`](Self::is_recoverable).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// The offending path, if the error is about one.
    #[must_use]
    pub const fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::InvalidPath { path, .. } => Some(path),
            _ => None,
        }
    }
}
