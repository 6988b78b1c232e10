//! Compile-or-copy of single files into the runtime tree.
//!
//! # Rules
//!
//! ```text
//! a directory?           ──yes──►  nothing                           (Skipped)
//!        │
//!        no
//!        ▼
//! suffix in extensions?  ──yes──►  mkdir -p, compile, write mirror   (Transformed)
//!        │
//!        no
//!        ▼
//! basename denylisted?   ──yes──►  nothing                           (Skipped)
//!        │
//!        no
//!        ▼
//! mirror already exists? ──no───►  nothing                           (Skipped)
//!        │
//!        yes
//!        ▼
//! mkdir -p, copy bytes                                               (Copied)
//! ```
//!
//! Non-transformable files are only copied over an existing mirror, so assets
//! are not materialised by the very first build. This is long-standing
//! behaviour of the tool and is kept as is.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use hr_core::{CompilerConfig, PathMirror};

use crate::compiler::Compiler;
use crate::error::MirrorError;
use crate::stale::detect_changed;
use crate::stats::PassReport;

/// OS metadata files that are never copied.
pub const DENYLIST: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file is OS metadata.
    Denylisted,
    /// The file is copy-only and has no mirror yet.
    MirrorAbsent,
    /// The path is a directory.
    NotAFile,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The compiler output was written to `runtime`.
    Transformed {
        /// The mirror path that was written.
        runtime: Utf8PathBuf,
    },
    /// The raw bytes were copied to `runtime`.
    Copied {
        /// The mirror path that was written.
        runtime: Utf8PathBuf,
    },
    /// Nothing was written.
    Skipped(SkipReason),
}

/// Compiles or copies source files into their runtime mirror.
///
/// # Examples
///
/// ```no_run
/// use hr_core::PathMirror;
/// use hr_mirror::{CompileError, FileTransformer, Outcome};
/// use camino::Utf8Path;
///
/// let identity = |_: &Utf8Path, src: &[u8]| -> Result<String, CompileError> {
///     Ok(String::from_utf8_lossy(src).into_owned())
/// };
/// let transformer = FileTransformer::new(PathMirror::new("app", "runtime"), identity);
///
/// let outcome = transformer.process(Utf8Path::new("app/index.js"))?;
/// assert!(matches!(outcome, Outcome::Transformed { .. }));
/// # Ok::<(), hr_mirror::MirrorError>(())
/// ```
#[derive(Debug)]
pub struct FileTransformer<C> {
    mirror: PathMirror,
    compiler: C,
    extensions: Vec<String>,
    display_root: Option<Utf8PathBuf>,
}

impl<C: Compiler> FileTransformer<C> {
    /// Creates a transformer with the default transformable suffixes.
    pub fn new(mirror: PathMirror, compiler: C) -> Self {
        Self {
            mirror,
            compiler,
            extensions: CompilerConfig::default().extensions,
            display_root: None,
        }
    }

    /// Replaces the transformable suffixes (e.g. `[".js", ".jsx"]`).
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Logs paths relative to `root` (normally the working directory).
    #[must_use]
    pub fn with_display_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.display_root = Some(root.into());
        self
    }

    /// Returns the path mirror.
    #[inline]
    #[must_use]
    pub fn mirror(&self) -> &PathMirror {
        &self.mirror
    }

    /// Returns `true` if `path` goes through the compiler.
    ///
    /// Case-sensitive suffix match on the full path.
    #[must_use]
    pub fn is_transformable(&self, path: &Utf8Path) -> bool {
        self.extensions
            .iter()
            .any(|ext| path.as_str().ends_with(ext.as_str()))
    }

    /// Compiles or copies one file.
    pub fn process(&self, file: &Utf8Path) -> Result<Outcome, MirrorError> {
        if file.is_dir() {
            tracing::trace!(path = %file, "Skipping directory");
            return Ok(Outcome::Skipped(SkipReason::NotAFile));
        }

        let runtime = self.mirror.to_runtime(file);

        if !self.is_transformable(file) {
            if file.file_name().is_some_and(|name| DENYLIST.contains(&name)) {
                tracing::trace!(path = %file, "Skipping OS metadata file");
                return Ok(Outcome::Skipped(SkipReason::Denylisted));
            }
            return self.copy(file, runtime);
        }

        ensure_parent(&runtime)?;
        let source = std::fs::read(file).map_err(|e| MirrorError::io(file, e))?;
        let output = self
            .compiler
            .compile(file, &source)
            .map_err(|e| MirrorError::transform(file, e))?;
        std::fs::write(&runtime, output).map_err(|e| MirrorError::io(&runtime, e))?;

        tracing::info!(path = %self.display(file), "Compiled");
        Ok(Outcome::Transformed { runtime })
    }

    fn copy(&self, file: &Utf8Path, runtime: Utf8PathBuf) -> Result<Outcome, MirrorError> {
        if !runtime.exists() {
            tracing::trace!(path = %file, "No mirror yet, not copying");
            return Ok(Outcome::Skipped(SkipReason::MirrorAbsent));
        }

        ensure_parent(&runtime)?;
        let bytes = std::fs::read(file).map_err(|e| MirrorError::io(file, e))?;
        std::fs::write(&runtime, bytes).map_err(|e| MirrorError::io(&runtime, e))?;

        tracing::info!(path = %self.display(file), "Copied");
        Ok(Outcome::Copied { runtime })
    }

    /// Processes every file in order. Failures are collected, never fatal.
    pub fn process_batch<'a, I>(&self, files: I) -> PassReport
    where
        I: IntoIterator<Item = &'a Utf8Path>,
    {
        let started = Instant::now();
        let mut report = PassReport::default();

        for file in files {
            match self.process(file) {
                Ok(outcome) => report.stats.record(&outcome),
                Err(e) => {
                    tracing::warn!(path = %self.display(file), error = %e, "File not mirrored");
                    report.stats.record_failure();
                    report.errors.push(e);
                }
            }
        }

        report.elapsed = started.elapsed();
        report
    }

    /// Detects every stale file under the source root and processes it.
    pub fn full_pass(&self) -> PassReport {
        let started = Instant::now();
        let scan = detect_changed(self.mirror.source_root(), &self.mirror);

        let mut report = self.process_batch(scan.stale.iter().map(Utf8PathBuf::as_path));
        for _ in &scan.errors {
            report.stats.record_failure();
        }
        report.errors.extend(scan.errors);
        report.elapsed = started.elapsed();
        report
    }

    fn display<'p>(&self, path: &'p Utf8Path) -> &'p Utf8Path {
        self.display_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }
}

fn ensure_parent(path: &Utf8Path) -> Result<(), MirrorError> {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| MirrorError::io(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileError;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        app: Utf8PathBuf,
        runtime: Utf8PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("temp dir");
            let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf-8 temp dir");
            let app = root.join("app");
            fs::create_dir_all(&app).expect("mkdir app");
            Self {
                runtime: root.join("runtime"),
                app,
                _dir: dir,
            }
        }

        fn mirror(&self) -> PathMirror {
            PathMirror::new(&self.app, &self.runtime)
        }

        fn write_app(&self, rel: &str, content: &str) -> Utf8PathBuf {
            let path = self.app.join(rel);
            ensure_parent(&path).expect("mkdir");
            fs::write(&path, content).expect("write");
            path
        }
    }

    fn tagging(_: &Utf8Path, src: &[u8]) -> Result<String, CompileError> {
        Ok(format!("/* compiled */ {}", String::from_utf8_lossy(src)))
    }

    fn failing_on_b(path: &Utf8Path, src: &[u8]) -> Result<String, CompileError> {
        if path.file_name() == Some("b.js") {
            return Err(CompileError::Other("SyntaxError".to_owned()));
        }
        tagging(path, src)
    }

    #[test]
    fn test_is_transformable() {
        let t = FileTransformer::new(PathMirror::new("app", "runtime"), tagging);
        for path in ["a.js", "a.jsx", "a.es6", "a.es", "dir/x.min.js"] {
            assert!(t.is_transformable(Utf8Path::new(path)), "{path}");
        }
        for path in ["a.json", "a.JS", "a.ts", "a.js.map", "Makefile"] {
            assert!(!t.is_transformable(Utf8Path::new(path)), "{path}");
        }
    }

    #[test]
    fn test_transform_creates_parent_dirs() {
        let f = Fixture::new();
        let src = f.write_app("controllers/deep/home.js", "let a = 1;");
        let t = FileTransformer::new(f.mirror(), tagging);

        let outcome = t.process(&src).expect("process");
        let expected = f.runtime.join("controllers/deep/home.js");
        assert_eq!(outcome, Outcome::Transformed { runtime: expected.clone() });
        assert_eq!(
            fs::read_to_string(expected).expect("read"),
            "/* compiled */ let a = 1;"
        );
    }

    #[test]
    fn test_copy_only_if_mirror_exists() {
        let f = Fixture::new();
        let src = f.write_app("config.json", "{\"a\":1}");
        let t = FileTransformer::new(f.mirror(), tagging);

        let outcome = t.process(&src).expect("process");
        assert_eq!(outcome, Outcome::Skipped(SkipReason::MirrorAbsent));
        assert!(!f.runtime.join("config.json").exists());
    }

    #[test]
    fn test_copy_preserves_bytes() {
        let f = Fixture::new();
        let src = f.app.join("logo.bin");
        let bytes: Vec<u8> = (0..=255).collect();
        fs::write(&src, &bytes).expect("write");
        fs::create_dir_all(&f.runtime).expect("mkdir");
        fs::write(f.runtime.join("logo.bin"), b"old").expect("write");

        let t = FileTransformer::new(f.mirror(), tagging);
        let outcome = t.process(&src).expect("process");

        assert!(matches!(outcome, Outcome::Copied { .. }));
        assert_eq!(fs::read(f.runtime.join("logo.bin")).expect("read"), bytes);
    }

    #[test]
    fn test_denylisted_file_is_skipped() {
        let f = Fixture::new();
        let src = f.write_app(".DS_Store", "meta");
        fs::create_dir_all(&f.runtime).expect("mkdir");
        fs::write(f.runtime.join(".DS_Store"), "old").expect("write");

        let t = FileTransformer::new(f.mirror(), tagging);
        assert_eq!(
            t.process(&src).expect("process"),
            Outcome::Skipped(SkipReason::Denylisted)
        );
        assert_eq!(fs::read_to_string(f.runtime.join(".DS_Store")).expect("read"), "old");
    }

    #[test]
    fn test_compile_failure_leaves_mirror_unwritten() {
        let f = Fixture::new();
        let src = f.write_app("b.js", "let = ;");
        let t = FileTransformer::new(f.mirror(), failing_on_b);

        let err = t.process(&src).expect_err("compile must fail");
        assert!(matches!(err, MirrorError::Transform { .. }));
        assert_eq!(err.path(), Some(&src));
        assert!(!f.runtime.join("b.js").exists());
    }

    #[test]
    fn test_batch_isolates_failures() {
        let f = Fixture::new();
        let a = f.write_app("a.js", "a");
        let b = f.write_app("b.js", "b");
        let c = f.write_app("c.js", "c");
        let t = FileTransformer::new(f.mirror(), failing_on_b);

        let report = t.process_batch([a.as_path(), b.as_path(), c.as_path()]);

        assert_eq!(report.stats.transformed, 2);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(f.runtime.join("a.js").exists());
        assert!(!f.runtime.join("b.js").exists());
        assert!(f.runtime.join("c.js").exists());
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let f = Fixture::new();
        let t = FileTransformer::new(f.mirror(), tagging);
        let err = t.process(&f.app.join("deleted.js")).expect_err("must fail");
        assert!(matches!(err, MirrorError::Io { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_full_pass_is_idempotent() {
        let f = Fixture::new();
        f.write_app("a.js", "a");
        f.write_app("lib/b.jsx", "b");
        let t = FileTransformer::new(f.mirror(), tagging);

        let first = t.full_pass();
        assert_eq!(first.stats.transformed, 2);

        let second = t.full_pass();
        assert_eq!(second.stats.writes(), 0);
        assert_eq!(second.stats.total(), 0);
    }

    #[test]
    fn test_scenario_json_materialises_only_after_mirror_exists() {
        let f = Fixture::new();
        let a = f.write_app("a.js", "export default 1;");
        let b = f.write_app("b.json", "{\"v\":1}");
        let t = FileTransformer::new(f.mirror(), tagging);

        let report = t.full_pass();
        assert!(report.is_clean());
        assert_eq!(
            fs::read_to_string(f.runtime.join("a.js")).expect("read"),
            tagging(&a, b"export default 1;").expect("compile")
        );
        assert!(!f.runtime.join("b.json").exists());

        fs::write(f.runtime.join("b.json"), "placeholder").expect("write");
        fs::write(&b, "{\"v\":2}").expect("write");

        let report = t.process_batch([b.as_path()]);
        assert_eq!(report.stats.copied, 1);
        assert_eq!(
            fs::read(f.runtime.join("b.json")).expect("read"),
            b"{\"v\":2}".to_vec()
        );
    }

    #[test]
    fn test_directory_with_mirror_is_skipped_quietly() {
        let f = Fixture::new();
        let dir = f.app.join("views");
        fs::create_dir_all(&dir).expect("mkdir views");
        fs::create_dir_all(f.runtime.join("views")).expect("mkdir mirror");
        let legacy = f.app.join("legacy.js");
        fs::create_dir_all(&legacy).expect("mkdir legacy.js");
        let t = FileTransformer::new(f.mirror(), tagging);

        let report = t.process_batch([dir.as_path(), legacy.as_path()]);

        assert!(report.errors.is_empty());
        assert_eq!(report.stats.skipped, 2);
        assert_eq!(
            t.process(&dir).expect("process"),
            Outcome::Skipped(SkipReason::NotAFile)
        );
        assert!(!f.runtime.join("legacy.js").exists());
    }

    #[test]
    fn test_display_relative_to_root() {
        let t = FileTransformer::new(PathMirror::new("app", "runtime"), tagging)
            .with_display_root("/work");
        assert_eq!(t.display(Utf8Path::new("/work/app/a.js")), "app/a.js");
        assert_eq!(t.display(Utf8Path::new("/elsewhere/a.js")), "/elsewhere/a.js");
    }
}
