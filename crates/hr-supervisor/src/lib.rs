//! Supervision of the single long-lived child process.
//!
//! [`ProcessSupervisor`] owns one child slot: it spawns
//! `<interpreter> <args…> <entry>`, kills and respawns it on demand, and
//! reports exits the child made on its own. [`ShutdownSignals`] delivers the
//! termination signals that end the loop.
//!
//! ```text
//! restart() ──► stop() ──kill_tx──► monitor(gen n)   ──► ChildExit{n, Killed}      (ignored)
//!          └──► start() ─────────► monitor(gen n+1) ──► ChildExit{n+1, SelfExited} ──► next_exit()
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod process;
pub mod signal;

pub use error::SuperviseError;
pub use process::{ChildExit, ChildState, ExitReason, ProcessSupervisor, SupervisorStats};
pub use signal::{ShutdownSignals, TermSignal};
