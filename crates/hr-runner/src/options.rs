//! Run options and the on-disk layout they resolve to.

use camino::{Utf8Path, Utf8PathBuf};
use hr_core::{PathMirror, PathsConfig, to_runtime};

/// Entry script used when none is given.
pub const DEFAULT_ENTRY: &str = "index.js";

/// What to run and how.
///
/// # Examples
///
/// ```
/// use hr_core::PathsConfig;
/// use hr_runner::RunOptions;
/// use camino::Utf8PathBuf;
///
/// let options = RunOptions::new(Some(Utf8PathBuf::from("src/server.js")), None, &PathsConfig::default())
///     .watch(true)
///     .compile(true);
///
/// assert_eq!(options.source_dir, "src");
/// assert_eq!(options.runtime_dir, "runtime");
/// assert_eq!(options.runtime_entry(), "runtime/server.js");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Entry script inside the source tree, relative to the working directory.
    pub script: Utf8PathBuf,
    /// Source tree root: the script's directory.
    pub source_dir: Utf8PathBuf,
    /// Runtime tree root.
    pub runtime_dir: Utf8PathBuf,
    /// Keep running and restart on changes.
    pub watch: bool,
    /// Compile the source tree into the runtime tree.
    pub compile: bool,
}

impl RunOptions {
    /// Resolves the script and tree roots, falling back to `paths`.
    ///
    /// The source tree is the script's directory, or `paths.source_dir` for a
    /// bare file name. A missing script defaults to `index.js` in the
    /// configured source tree.
    #[must_use]
    pub fn new(
        script: Option<Utf8PathBuf>,
        runtime_dir: Option<Utf8PathBuf>,
        paths: &PathsConfig,
    ) -> Self {
        let script = script.unwrap_or_else(|| paths.source_dir.join(DEFAULT_ENTRY));
        let source_dir = script
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .map_or_else(|| paths.source_dir.clone(), Utf8Path::to_path_buf);

        Self {
            script,
            source_dir,
            runtime_dir: runtime_dir.unwrap_or_else(|| paths.runtime_dir.clone()),
            watch: false,
            compile: false,
        }
    }

    /// Sets watch mode.
    #[must_use]
    pub const fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Sets compile mode.
    #[must_use]
    pub const fn compile(mut self, compile: bool) -> Self {
        self.compile = compile;
        self
    }

    /// The entry file in the runtime tree, relative to the working directory.
    #[must_use]
    pub fn runtime_entry(&self) -> Utf8PathBuf {
        to_runtime(
            self.script.as_str(),
            self.source_dir.as_str(),
            self.runtime_dir.as_str(),
        )
    }
}

/// Absolute paths a run works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Working directory everything is resolved against.
    pub cwd: Utf8PathBuf,
    /// Absolute source and runtime roots.
    pub mirror: PathMirror,
    /// Absolute entry file in the runtime tree.
    pub entry: Utf8PathBuf,
}

impl Layout {
    /// Resolves `options` against `cwd`.
    ///
    /// Existing roots are canonicalized so they match the absolute paths the
    /// file watcher reports.
    #[must_use]
    pub fn resolve(options: &RunOptions, cwd: &Utf8Path) -> Self {
        let source_root = absolute(cwd, &options.source_dir);
        let runtime_root = absolute(cwd, &options.runtime_dir);
        let entry = PathMirror::new(cwd.join(&options.source_dir), cwd.join(&options.runtime_dir))
            .to_runtime(&cwd.join(&options.script));

        Self {
            cwd: cwd.to_owned(),
            mirror: PathMirror::new(source_root, runtime_root),
            entry,
        }
    }
}

fn absolute(cwd: &Utf8Path, dir: &Utf8Path) -> Utf8PathBuf {
    let joined = cwd.join(dir);
    joined.canonicalize_utf8().unwrap_or(joined)
}
