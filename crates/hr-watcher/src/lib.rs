//! Filesystem watching and event debouncing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────── blocking thread ────────────┐
//! │ notify::RecommendedWatcher ──► filter   │
//! └────────────────────┬────────────────────┘
//!                      │ mpsc (FileEvent)
//!                      ▼
//! ┌──────────── orchestrator task ──────────┐
//! │ FileWatcher::recv ──► Debouncer::push    │
//! │                        │ 100 ms quiet    │
//! │                        ▼                 │
//! │              Debouncer::settled ──► ChangeBatch
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! hr-cli ──► hr-runner ──► hr-mirror ─────► hr-core
//!                     ├─► hr-watcher ────►
//!                     └─► hr-supervisor ─►
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use hr_watcher::{AcceptAllFilter, Debouncer, FileWatcher};
//! use hr_core::WatchConfig;
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), hr_watcher::WatchError> {
//! let mut watcher =
//!     FileWatcher::new(Utf8Path::new("app"), &WatchConfig::default(), AcceptAllFilter)?;
//! let mut debouncer = Debouncer::new();
//!
//! loop {
//!     tokio::select! {
//!         Some(event) = watcher.recv() => debouncer.push(event.path),
//!         batch = debouncer.settled() => {
//!             println!("{} files changed", batch.unique_paths().len());
//!         }
//!     }
//! }
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod debouncer;
pub mod error;
pub mod events;
pub mod filter;
pub mod watcher;

pub use debouncer::{DEBOUNCE_WINDOW, Debouncer};
pub use error::WatchError;
pub use events::{ChangeBatch, FileEvent};
pub use filter::{AcceptAllFilter, CompositeFilter, ExcludeTreeFilter, FileFilter, NameDenylistFilter};
pub use watcher::FileWatcher;
