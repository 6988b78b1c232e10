//! Mapping between the source tree and the runtime tree.
//!
//! Every runtime path is derived from a source path by replacing the source
//! root with the runtime root. The relative suffix is never touched:
//!
//! ```text
//! app/controllers/home.js  ──►  runtime/controllers/home.js
//! ```

use camino::{Utf8Path, Utf8PathBuf};

/// Replaces the first occurrence of `source_root` in `path` with `runtime_root`.
///
/// This is plain string substitution. A path that does not contain
/// `source_root` is returned unchanged, as is any path when `source_root`
/// is empty.
///
/// # Examples
///
/// ```
/// use hr_core::to_runtime;
///
/// assert_eq!(to_runtime("app/index.js", "app", "runtime"), "runtime/index.js");
/// assert_eq!(to_runtime("lib/index.js", "app", "runtime"), "lib/index.js");
/// ```
#[must_use]
pub fn to_runtime(path: &str, source_root: &str, runtime_root: &str) -> Utf8PathBuf {
    if source_root.is_empty() {
        return Utf8PathBuf::from(path);
    }
    Utf8PathBuf::from(path.replacen(source_root, runtime_root, 1))
}

/// A source root paired with its runtime root.
///
/// Paths under the source root are mapped component-wise, so a root named
/// `app` never matches inside a parent directory such as `/home/apps`.
/// Paths outside the source root fall back to [`to_runtime`].
///
/// # Examples
///
/// ```
/// use hr_core::PathMirror;
/// use camino::Utf8Path;
///
/// let mirror = PathMirror::new("/srv/apps/app", "/srv/apps/runtime");
/// assert_eq!(
///     mirror.to_runtime(Utf8Path::new("/srv/apps/app/models/user.js")),
///     "/srv/apps/runtime/models/user.js",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathMirror {
    source_root: Utf8PathBuf,
    runtime_root: Utf8PathBuf,
}

impl PathMirror {
    /// Creates a mirror from the two tree roots.
    pub fn new(source_root: impl Into<Utf8PathBuf>, runtime_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            runtime_root: runtime_root.into(),
        }
    }

    /// Returns the source tree root.
    #[inline]
    #[must_use]
    pub fn source_root(&self) -> &Utf8Path {
        &self.source_root
    }

    /// Returns the runtime tree root.
    #[inline]
    #[must_use]
    pub fn runtime_root(&self) -> &Utf8Path {
        &self.runtime_root
    }

    /// Maps a source path to its runtime counterpart.
    #[must_use]
    pub fn to_runtime(&self, path: &Utf8Path) -> Utf8PathBuf {
        match path.strip_prefix(&self.source_root) {
            Ok(rest) if rest.as_str().is_empty() => self.runtime_root.clone(),
            Ok(rest) => self.runtime_root.join(rest),
            Err(_) => to_runtime(
                path.as_str(),
                self.source_root.as_str(),
                self.runtime_root.as_str(),
            ),
        }
    }

    /// Returns `true` if `path` lies inside the source tree.
    #[inline]
    #[must_use]
    pub fn is_source(&self, path: &Utf8Path) -> bool {
        path.starts_with(&self.source_root)
    }
}
