//! Change events and the batch they accumulate into.
//!
//! ```text
//! notify event ──► FileEvent ──► Debouncer::push ──► ChangeBatch ──► settle
//! ```

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// One path reported by the watcher.
///
/// Create, modify, rename and remove are not told apart: every kind of change
/// means the same thing downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the file that changed.
    pub path: Utf8PathBuf,
    /// When the event was received.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates an event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self {
            path,
            timestamp: Instant::now(),
        }
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// Paths accumulated between two settles, in arrival order.
///
/// Duplicates are kept: a file saved twice inside one window is listed twice
/// and processed twice. Use [`ChangeBatch::unique_paths`] for reporting.
///
/// # Examples
///
/// ```
/// use hr_watcher::ChangeBatch;
/// use camino::Utf8PathBuf;
///
/// let mut batch = ChangeBatch::new();
/// batch.push(Utf8PathBuf::from("app/a.js"));
/// batch.push(Utf8PathBuf::from("app/b.js"));
/// batch.push(Utf8PathBuf::from("app/a.js"));
///
/// assert_eq!(batch.len(), 3);
/// assert_eq!(batch.unique_paths().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    paths: SmallVec<[Utf8PathBuf; 8]>,
}

impl ChangeBatch {
    /// Creates an empty batch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a path.
    #[inline]
    pub fn push(&mut self, path: Utf8PathBuf) {
        self.paths.push(path);
    }

    /// Number of recorded paths, duplicates included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterates the paths in arrival order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Utf8Path> {
        self.paths.iter().map(Utf8PathBuf::as_path)
    }

    /// Returns each distinct path once, in order of first arrival.
    #[must_use]
    pub fn unique_paths(&self) -> Vec<&Utf8Path> {
        let mut seen = FxHashSet::default();
        self.iter().filter(|path| seen.insert(*path)).collect()
    }
}

impl IntoIterator for ChangeBatch {
    type Item = Utf8PathBuf;
    type IntoIter = smallvec::IntoIter<[Utf8PathBuf; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl FromIterator<Utf8PathBuf> for ChangeBatch {
    fn from_iter<T: IntoIterator<Item = Utf8PathBuf>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(paths: &[&str]) -> ChangeBatch {
        paths.iter().map(|p| Utf8PathBuf::from(*p)).collect()
    }

    #[test]
    fn test_file_event_file_name() {
        let event = FileEvent::new(Utf8PathBuf::from("/srv/app/controllers/home.js"));
        assert_eq!(event.file_name(), Some("home.js"));
    }

    #[test]
    fn test_batch_keeps_arrival_order_and_duplicates() {
        let b = batch(&["app/c.js", "app/a.js", "app/c.js"]);
        let paths: Vec<&str> = b.iter().map(Utf8Path::as_str).collect();
        assert_eq!(paths, vec!["app/c.js", "app/a.js", "app/c.js"]);
    }

    #[test]
    fn test_unique_paths_first_arrival_order() {
        let b = batch(&["app/c.js", "app/a.js", "app/c.js", "app/b.js", "app/a.js"]);
        let unique: Vec<&str> = b.unique_paths().into_iter().map(Utf8Path::as_str).collect();
        assert_eq!(unique, vec!["app/c.js", "app/a.js", "app/b.js"]);
    }

    #[test]
    fn test_empty_batch() {
        let b = ChangeBatch::new();
        assert!(b.is_empty());
        assert!(b.unique_paths().is_empty());
    }

    #[test]
    fn test_into_iter_spills_past_inline_capacity() {
        let names: Vec<String> = (0..12).map(|i| format!("app/{i}.js")).collect();
        let b: ChangeBatch = names.iter().map(Utf8PathBuf::from).collect();
        let out: Vec<Utf8PathBuf> = b.into_iter().collect();
        assert_eq!(out.len(), 12);
        assert_eq!(out[11], "app/11.js");
    }
}
