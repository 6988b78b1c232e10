//! Filtering of watch events before they reach the event channel.
//!
//! The loop never wants to hear about its own writes into the runtime tree
//! while compiling, nor about OS metadata files such as `.DS_Store`.
//!
//! ```
//! use hr_watcher::{CompositeFilter, ExcludeTreeFilter, FileFilter, NameDenylistFilter};
//! use camino::Utf8Path;
//!
//! let filter = CompositeFilter::new()
//!     .and(ExcludeTreeFilter::new("/srv/runtime"))
//!     .and(NameDenylistFilter::new(&[".DS_Store"]));
//!
//! assert!(filter.should_process(Utf8Path::new("/srv/app/a.js")));
//! assert!(!filter.should_process(Utf8Path::new("/srv/runtime/a.js")));
//! assert!(!filter.should_process(Utf8Path::new("/srv/app/.DS_Store")));
//! ```

use camino::{Utf8Path, Utf8PathBuf};

/// A predicate deciding which changed paths are forwarded.
///
/// Filters run on the watcher's blocking thread, hence the bounds.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the change at `path` should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// Forwards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Drops every path inside one directory tree.
///
/// Used to ignore the runtime tree when it is nested inside the watched tree.
#[derive(Debug, Clone)]
pub struct ExcludeTreeFilter {
    root: Utf8PathBuf,
}

impl ExcludeTreeFilter {
    /// Creates a filter that rejects `root` and everything below it.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileFilter for ExcludeTreeFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        !path.starts_with(&self.root)
    }
}

/// Drops paths whose file name is in a fixed list.
#[derive(Debug, Clone)]
pub struct NameDenylistFilter {
    names: Vec<String>,
}

impl NameDenylistFilter {
    /// Creates a filter rejecting the given file names.
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl FileFilter for NameDenylistFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        path.file_name()
            .is_none_or(|name| !self.names.iter().any(|n| n == name))
    }
}

/// Combines filters with AND logic. Empty accepts everything.
pub struct CompositeFilter {
    filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
    /// Creates an empty composite filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Adds a filter to the composite.
    #[must_use]
    pub fn and<F: FileFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl Default for CompositeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FileFilter for CompositeFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.filters.iter().all(|f| f.should_process(path))
    }
}

impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all_filter() {
        assert!(AcceptAllFilter.should_process(Utf8Path::new("anything.txt")));
        assert!(AcceptAllFilter.should_process(Utf8Path::new("")));
    }

    #[test]
    fn test_exclude_tree_is_component_wise() {
        let filter = ExcludeTreeFilter::new("/srv/runtime");
        assert!(!filter.should_process(Utf8Path::new("/srv/runtime")));
        assert!(!filter.should_process(Utf8Path::new("/srv/runtime/a/b.js")));
        assert!(filter.should_process(Utf8Path::new("/srv/runtime-old/a.js")));
        assert!(filter.should_process(Utf8Path::new("/srv/app/a.js")));
    }

    #[test]
    fn test_name_denylist() {
        let filter = NameDenylistFilter::new(&[".DS_Store", "Thumbs.db"]);
        assert!(!filter.should_process(Utf8Path::new("app/.DS_Store")));
        assert!(!filter.should_process(Utf8Path::new("app/img/Thumbs.db")));
        assert!(filter.should_process(Utf8Path::new("app/DS_Store.js")));
        assert!(filter.should_process(Utf8Path::new("/")));
    }

    #[test]
    fn test_composite_filter_empty_accepts() {
        assert!(CompositeFilter::new().should_process(Utf8Path::new("x")));
    }

    #[test]
    fn test_composite_filter_and() {
        let filter = CompositeFilter::new()
            .and(ExcludeTreeFilter::new("app/runtime"))
            .and(NameDenylistFilter::new(&["desktop.ini"]));

        assert!(filter.should_process(Utf8Path::new("app/a.js")));
        assert!(!filter.should_process(Utf8Path::new("app/runtime/a.js")));
        assert!(!filter.should_process(Utf8Path::new("app/desktop.ini")));
    }

    #[test]
    fn test_boxed_filter() {
        let filter: Box<dyn FileFilter> = Box::new(ExcludeTreeFilter::new("runtime"));
        assert!(!filter.should_process(Utf8Path::new("runtime/a.js")));
    }
}
