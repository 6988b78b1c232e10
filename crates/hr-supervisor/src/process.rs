//! The single supervised child.
//!
//! # Lifecycle
//!
//! ```text
//!              start                 stop / restart
//! NotStarted ────────► Running{gen} ────────────────► Exited(Killed)
//!                          │                               │ start
//!                          │ child exits on its own        ▼
//!                          └────────────────────► Exited(SelfExited{code})
//! ```
//!
//! Each spawned child gets a fresh generation number and a monitor task. The
//! monitor waits for either the child's exit or a kill request and reports a
//! [`ChildExit`] tagged with the generation. Reports from older generations,
//! and reports of children we killed ourselves, are dropped by
//! [`ProcessSupervisor::next_exit`].

use std::process::Stdio;

use camino::Utf8Path;
use hr_core::ProcessConfig;
use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::SuperviseError;

/// Why a child stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The supervisor killed it.
    Killed,
    /// It exited without being asked to. `code` is `None` for a signal death.
    SelfExited {
        /// Exit status code, if any.
        code: Option<i32>,
    },
}

/// State of the child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    /// No child was ever started.
    NotStarted,
    /// A child is running.
    Running {
        /// Spawn counter value for this child.
        generation: u64,
        /// OS process id.
        pid: Option<u32>,
    },
    /// The last child is gone.
    Exited(ExitReason),
}

impl ChildState {
    /// Returns `true` if a child is running.
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Exit report sent by a monitor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// Generation of the child that exited.
    pub generation: u64,
    /// How it exited.
    pub reason: ExitReason,
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SupervisorStats {
    /// Successful spawns.
    pub starts: u64,
    /// Kills of a running child.
    pub stops: u64,
}

#[derive(Debug)]
struct Monitor {
    kill_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns the child slot. At most one child runs at any time.
///
/// # Examples
///
/// ```no_run
/// use hr_core::ProcessConfig;
/// use hr_supervisor::ProcessSupervisor;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), hr_supervisor::SuperviseError> {
/// let env = vec![("APP".to_owned(), "runtime".to_owned())];
/// let mut supervisor = ProcessSupervisor::new(&ProcessConfig::default());
///
/// supervisor.start(Utf8Path::new("runtime/index.js"), &env)?;
/// supervisor.restart(Utf8Path::new("runtime/index.js"), &env)?;
/// supervisor.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ProcessSupervisor {
    interpreter: String,
    args: Vec<String>,
    state: ChildState,
    generation: u64,
    current: Option<Monitor>,
    reaping: Vec<JoinHandle<()>>,
    exit_tx: mpsc::UnboundedSender<ChildExit>,
    exit_rx: mpsc::UnboundedReceiver<ChildExit>,
    stats: SupervisorStats,
}

impl ProcessSupervisor {
    /// Creates a supervisor that runs `<interpreter> <args…> <entry>`.
    #[must_use]
    pub fn new(config: &ProcessConfig) -> Self {
        let (exit_tx, exit_rx) = mpsc::unbounded_channel();
        Self {
            interpreter: config.interpreter.clone(),
            args: config.args.clone(),
            state: ChildState::NotStarted,
            generation: 0,
            current: None,
            reaping: Vec::new(),
            exit_tx,
            exit_rx,
            stats: SupervisorStats::default(),
        }
    }

    /// Returns the state of the child slot.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ChildState {
        self.state
    }

    /// Returns the lifetime counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> SupervisorStats {
        self.stats
    }

    fn command(&self, entry: &Utf8Path, env: &[(String, String)]) -> Command {
        let mut command = Command::new(&self.interpreter);
        command
            .args(&self.args)
            .arg(entry.as_std_path())
            .envs(env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    /// Spawns a child for `entry` with `env` added to the inherited environment.
    ///
    /// A running child is stopped first. Must be called from within a tokio
    /// runtime.
    pub fn start(&mut self, entry: &Utf8Path, env: &[(String, String)]) -> Result<(), SuperviseError> {
        if self.state.is_running() {
            self.stop();
        }

        let child = self
            .command(entry, env)
            .spawn()
            .map_err(|e| SuperviseError::spawn(&self.interpreter, e))?;

        self.generation += 1;
        let generation = self.generation;
        let pid = child.id();

        let (kill_tx, kill_rx) = oneshot::channel();
        let handle = tokio::spawn(monitor(child, generation, kill_rx, self.exit_tx.clone()));

        self.current = Some(Monitor { kill_tx, handle });
        self.state = ChildState::Running { generation, pid };
        self.stats.starts += 1;

        tracing::info!(entry = %entry, generation, pid = ?pid, "Process started");
        Ok(())
    }

    /// Kills the running child, if any. Does not wait for it to die.
    pub fn stop(&mut self) {
        self.reaping.retain(|handle| !handle.is_finished());

        let Some(monitor) = self.current.take() else {
            return;
        };
        let _ = monitor.kill_tx.send(());
        self.reaping.push(monitor.handle);

        if let ChildState::Running { generation, .. } = self.state {
            self.state = ChildState::Exited(ExitReason::Killed);
            self.stats.stops += 1;
            tracing::debug!(generation, "Process stopped");
        }
    }

    /// Stops the running child and starts a new one.
    pub fn restart(&mut self, entry: &Utf8Path, env: &[(String, String)]) -> Result<(), SuperviseError> {
        self.stop();
        self.start(entry, env)
    }

    /// Waits for the current child to exit on its own.
    ///
    /// Kills and exits of earlier generations are skipped. Cancel-safe.
    pub async fn next_exit(&mut self) -> ChildExit {
        loop {
            let Some(exit) = self.exit_rx.recv().await else {
                return std::future::pending().await;
            };

            let current = matches!(
                self.state,
                ChildState::Running { generation, .. } if generation == exit.generation
            );
            if !current || exit.reason == ExitReason::Killed {
                tracing::trace!(generation = exit.generation, "Ignoring stale exit report");
                continue;
            }

            if let Some(monitor) = self.current.take() {
                self.reaping.push(monitor.handle);
            }
            self.state = ChildState::Exited(exit.reason);
            return exit;
        }
    }

    /// Stops the child and waits until every spawned child has been reaped.
    pub async fn shutdown(&mut self) {
        self.stop();
        for handle in self.reaping.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Process monitor failed");
            }
        }
    }

    /// Spawns one child for `entry` and waits for it, without supervision.
    ///
    /// Returns the child's exit code.
    pub async fn run_once(
        &self,
        entry: &Utf8Path,
        env: &[(String, String)],
    ) -> Result<Option<i32>, SuperviseError> {
        let mut child = self
            .command(entry, env)
            .spawn()
            .map_err(|e| SuperviseError::spawn(&self.interpreter, e))?;

        tracing::info!(entry = %entry, pid = ?child.id(), "Process started");
        let status = child.wait().await?;
        Ok(status.code())
    }
}

async fn monitor(
    mut child: Child,
    generation: u64,
    mut kill_rx: oneshot::Receiver<()>,
    exit_tx: mpsc::UnboundedSender<ChildExit>,
) {
    let reason = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => {
                tracing::info!(generation, code = ?status.code(), "Process exited");
                ExitReason::SelfExited { code: status.code() }
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "Failed to wait on process");
                ExitReason::SelfExited { code: None }
            }
        },
        // A dropped sender also lands here, so the child never outlives the slot.
        _ = &mut kill_rx => {
            if let Err(e) = child.kill().await {
                tracing::warn!(generation, error = %e, "Failed to kill process");
            }
            ExitReason::Killed
        }
    };

    let _ = exit_tx.send(ChildExit { generation, reason });
}
