//! Recursive tree watcher bridged into tokio.
//!
//! ```text
//! ┌──────────────────── blocking thread ────────────────────┐
//! │ RecommendedWatcher ──► callback (drop Access, non-UTF-8, │
//! │                                  filtered paths)         │
//! └──────────────────────────────┬───────────────────────────┘
//!                                │ blocking_send
//!                                ▼
//!                 mpsc::Receiver<FileEvent> ──► orchestrator
//! ```
//!
//! Events are forwarded raw. Coalescing is the job of
//! [`Debouncer`](crate::Debouncer), which lives on the async side.

use camino::{Utf8Path, Utf8PathBuf};
use hr_core::WatchConfig;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::WatchError;
use crate::events::FileEvent;
use crate::filter::FileFilter;

/// Default channel capacity for file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Watches a directory tree and streams changed paths.
///
/// Dropping the watcher signals the background thread to stop.
///
/// # Examples
///
/// ```no_run
/// use hr_watcher::{AcceptAllFilter, FileWatcher};
/// use hr_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), hr_watcher::WatchError> {
/// let mut watcher =
///     FileWatcher::new(Utf8Path::new("app"), &WatchConfig::default(), AcceptAllFilter)?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("Changed: {}", event.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,
    event_rx: mpsc::Receiver<FileEvent>,
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Starts watching `path`, which must exist.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the path doesn't exist.
    pub fn new<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Like [`FileWatcher::new`] with a custom channel capacity.
    pub fn with_capacity<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }

        // Event paths come back absolute, so the root is made absolute too.
        let watch_path = path.canonicalize_utf8()?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let recursive = config.recursive;
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(&task_path, recursive, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next changed path.
    ///
    /// Returns `None` once the watcher thread has stopped. Cancel-safe.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Returns the canonical root being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` while the background thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for its thread.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Converts one notify event into the paths worth forwarding.
fn changed_paths<'a, F: FileFilter>(
    event: Event,
    filter: &'a F,
) -> impl Iterator<Item = Utf8PathBuf> + 'a {
    let relevant = !matches!(event.kind, EventKind::Access(_));
    event
        .paths
        .into_iter()
        .filter(move |_| relevant)
        .filter_map(|path| match Utf8PathBuf::try_from(path) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(
                    path = %e.into_path_buf().display(),
                    "Skipping non-UTF-8 path in file event"
                );
                None
            }
        })
        .filter(move |path| {
            let keep = filter.should_process(path);
            if !keep {
                tracing::trace!(path = %path, "Filtered out file event");
            }
            keep
        })
}

fn run_watcher_loop<F: FileFilter>(
    path: &Utf8Path,
    recursive: bool,
    event_tx: mpsc::Sender<FileEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for changed in changed_paths(event, &filter) {
                if event_tx.blocking_send(FileEvent::new(changed)).is_err() {
                    tracing::debug!("Event channel closed, dropping file event");
                    return;
                }
            }
        }
        Err(error) => tracing::warn!(error = %error, "Watcher error"),
    })?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(path.as_std_path(), mode)?;

    tracing::info!(path = %path, recursive, "File watcher started");

    let _ = shutdown_rx.blocking_recv();

    tracing::info!(path = %path, "File watcher stopped");
    Ok(())
}
