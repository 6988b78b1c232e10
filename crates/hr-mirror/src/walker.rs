//! Directory traversal of the source tree.
//!
//! [`TreeWalker`] uses the `ignore` crate's iterative walker with every filter
//! turned off: hidden files and `.gitignore`d files are listed too, because
//! the runtime tree has to mirror the source tree exactly.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::error::MirrorError;

/// Files found by a walk, plus the entries that could not be read.
#[derive(Debug, Default)]
pub struct WalkResult {
    /// Regular files, in no particular order.
    pub paths: Vec<Utf8PathBuf>,
    /// Entries that failed to list. Each one is skipped, the walk goes on.
    pub errors: Vec<MirrorError>,
}

/// Lists every regular file under a directory.
///
/// A missing root is not an error and yields an empty result.
///
/// # Examples
///
/// ```no_run
/// use hr_mirror::TreeWalker;
/// use camino::Utf8Path;
///
/// let result = TreeWalker::new(Utf8Path::new("app")).walk();
/// for path in &result.paths {
///     println!("Found: {path}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: Utf8PathBuf,
    follow_links: bool,
}

impl TreeWalker {
    /// Creates a walker rooted at `root`.
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            follow_links: false,
        }
    }

    /// Configures whether to follow symbolic links. Off by default.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Walks the tree and collects every regular file.
    pub fn walk(&self) -> WalkResult {
        let mut result = WalkResult::default();

        if !self.root.exists() {
            tracing::debug!(root = %self.root, "Walk root does not exist");
            return result;
        }

        for entry in self.build_walker() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable entry");
                    result.errors.push(MirrorError::Walk(e));
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            match Utf8Path::from_path(entry.path()) {
                Some(path) => result.paths.push(path.to_owned()),
                None => result
                    .errors
                    .push(MirrorError::NonUtf8Path(entry.path().to_owned())),
            }
        }

        result
    }

    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(self.follow_links)
            .build()
    }
}

/// Lists every regular file under `dir`.
///
/// Shorthand for `TreeWalker::new(dir).walk()`.
pub fn walk(dir: &Utf8Path) -> WalkResult {
    TreeWalker::new(dir).walk()
}
