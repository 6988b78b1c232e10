//! Modification-time comparison between the source and runtime trees.
//!
//! A source file is stale when its runtime mirror is missing or was modified
//! strictly earlier. Equal timestamps count as fresh: an extra skipped
//! rebuild is preferred over a rebuild storm on filesystems with coarse
//! timestamps.

use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use hr_core::PathMirror;

use crate::error::MirrorError;
use crate::walker::walk;

/// A path with its modification time, read fresh from the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// The file path.
    pub path: Utf8PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileRecord {
    /// Reads the modification time of `path`.
    pub fn stat(path: &Utf8Path) -> Result<Self, MirrorError> {
        let modified = path
            .metadata()
            .and_then(|meta| meta.modified())
            .map_err(|e| MirrorError::io(path, e))?;
        Ok(Self {
            path: path.to_owned(),
            modified,
        })
    }

    /// Like [`FileRecord::stat`], but a missing file yields `None`.
    pub fn stat_if_exists(path: &Utf8Path) -> Result<Option<Self>, MirrorError> {
        match Self::stat(path) {
            Ok(record) => Ok(Some(record)),
            Err(MirrorError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Returns `true` if `runtime` is missing or strictly older than `source`.
pub fn is_stale(source: &Utf8Path, runtime: &Utf8Path) -> Result<bool, MirrorError> {
    let source = FileRecord::stat(source)?;
    Ok(match FileRecord::stat_if_exists(runtime)? {
        Some(mirror) => mirror.modified < source.modified,
        None => true,
    })
}

/// Result of a staleness scan.
#[derive(Debug, Default)]
pub struct StaleScan {
    /// Source files that need to be compiled or copied.
    pub stale: Vec<Utf8PathBuf>,
    /// Entries that could not be listed or stat'ed. Each one is skipped.
    pub errors: Vec<MirrorError>,
}

/// Walks `source_dir` and returns every file whose runtime mirror is stale.
pub fn detect_changed(source_dir: &Utf8Path, mirror: &PathMirror) -> StaleScan {
    let listing = walk(source_dir);
    let mut scan = StaleScan {
        stale: Vec::with_capacity(listing.paths.len()),
        errors: listing.errors,
    };

    for path in listing.paths {
        let runtime = mirror.to_runtime(&path);
        match is_stale(&path, &runtime) {
            Ok(true) => scan.stale.push(path),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Could not compare modification times");
                scan.errors.push(e);
            }
        }
    }

    tracing::debug!(
        source = %source_dir,
        stale = scan.stale.len(),
        errors = scan.errors.len(),
        "Staleness scan complete"
    );
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    struct Trees {
        _dir: tempfile::TempDir,
        app: Utf8PathBuf,
        runtime: Utf8PathBuf,
    }

    fn trees() -> Trees {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).expect("utf-8 temp dir");
        let app = root.join("app");
        let runtime = root.join("runtime");
        fs::create_dir_all(&app).expect("mkdir app");
        fs::create_dir_all(&runtime).expect("mkdir runtime");
        Trees {
            _dir: dir,
            app,
            runtime,
        }
    }

    fn set_mtime(path: &Utf8Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .and_then(|f| f.set_modified(time))
            .expect("set mtime");
    }

    #[test]
    fn test_missing_mirror_is_stale() {
        let t = trees();
        fs::write(t.app.join("a.js"), "1").expect("write");

        let scan = detect_changed(&t.app, &PathMirror::new(&t.app, &t.runtime));
        assert_eq!(scan.stale, vec![t.app.join("a.js")]);
    }

    #[test]
    fn test_older_mirror_is_stale() {
        let t = trees();
        let now = SystemTime::now();
        fs::write(t.app.join("a.js"), "1").expect("write");
        fs::write(t.runtime.join("a.js"), "1").expect("write");
        set_mtime(&t.app.join("a.js"), now);
        set_mtime(&t.runtime.join("a.js"), now - Duration::from_secs(10));

        assert!(is_stale(&t.app.join("a.js"), &t.runtime.join("a.js")).expect("stat"));
    }

    #[test]
    fn test_newer_mirror_is_fresh() {
        let t = trees();
        let now = SystemTime::now();
        fs::write(t.app.join("a.js"), "1").expect("write");
        fs::write(t.runtime.join("a.js"), "1").expect("write");
        set_mtime(&t.app.join("a.js"), now - Duration::from_secs(10));
        set_mtime(&t.runtime.join("a.js"), now);

        let scan = detect_changed(&t.app, &PathMirror::new(&t.app, &t.runtime));
        assert!(scan.stale.is_empty());
    }

    #[test]
    fn test_equal_mtime_is_not_stale() {
        let t = trees();
        let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        fs::write(t.app.join("a.js"), "1").expect("write");
        fs::write(t.runtime.join("a.js"), "1").expect("write");
        set_mtime(&t.app.join("a.js"), stamp);
        set_mtime(&t.runtime.join("a.js"), stamp);

        assert!(!is_stale(&t.app.join("a.js"), &t.runtime.join("a.js")).expect("stat"));
        let scan = detect_changed(&t.app, &PathMirror::new(&t.app, &t.runtime));
        assert!(scan.stale.is_empty());
    }

    #[test]
    fn test_missing_source_dir_has_nothing_stale() {
        let t = trees();
        let scan = detect_changed(&t.app.join("gone"), &PathMirror::new(&t.app, &t.runtime));
        assert!(scan.stale.is_empty());
        assert!(scan.errors.is_empty());
    }

    #[test]
    fn test_stat_if_exists_missing() {
        let t = trees();
        let record = FileRecord::stat_if_exists(&t.runtime.join("nope.js")).expect("stat");
        assert!(record.is_none());
    }
}
