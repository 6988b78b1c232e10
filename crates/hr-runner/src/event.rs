//! Events driving the orchestrator loop.
//!
//! # Event Sources
//!
//! - **File watcher**: a path changed in the watched tree
//! - **Debouncer**: the quiet period after the last change elapsed
//! - **Supervisor**: the child exited without being asked to
//! - **Signals**: SIGTERM or SIGINT

use hr_supervisor::{ChildExit, TermSignal};
use hr_watcher::{ChangeBatch, FileEvent};

/// One input to [`Orchestrator::handle`](crate::Orchestrator::handle).
#[derive(Debug)]
#[non_exhaustive]
pub enum Event {
    /// A path changed in the watched tree.
    FileChanged(FileEvent),

    /// A burst of changes settled.
    Settled(ChangeBatch),

    /// The current child exited on its own.
    ChildExited(ChildExit),

    /// A termination signal arrived.
    Signal(TermSignal),
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A termination signal arrived.
    Signal(TermSignal),
    /// The child exited on its own with this code.
    ChildExited(Option<i32>),
    /// A compile-only run finished its pass.
    Completed,
}
