//! The watch, recompile and restart loop.
//!
//! # States
//!
//! ```text
//! Starting ──► Running ──settle──► Settling ──► Running ──signal / child exit──► Stopped
//!   │                                                                               ▲
//!   └─ full pass (compile mode), start child                                        │
//!                                                   shutdown: kill and reap child ──┘
//! ```
//!
//! One task owns the orchestrator and multiplexes every source with
//! `tokio::select!`, so no two handlers ever run at the same time. Compile
//! passes run on the blocking pool and are awaited before the restart.

use std::sync::Arc;

use camino::Utf8Path;
use hr_core::WatchConfig;
use hr_mirror::{Compiler, DENYLIST, FileTransformer};
use hr_supervisor::{ExitReason, ProcessSupervisor, ShutdownSignals};
use hr_watcher::{
    ChangeBatch, CompositeFilter, Debouncer, ExcludeTreeFilter, FileEvent, FileWatcher,
    NameDenylistFilter,
};
use tokio::task::JoinError;
use tracing::{debug, error, info, trace, warn};

use crate::error::RunError;
use crate::event::{Event, StopReason};
use crate::options::Layout;

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial pass and first spawn.
    Starting,
    /// Waiting for changes.
    Running,
    /// Recompiling a settled batch and restarting.
    Settling,
    /// The run is over.
    Stopped,
}

/// Drives the mirror, the watcher and the child process.
pub struct Orchestrator<C> {
    layout: Layout,
    env: Vec<(String, String)>,
    compile: bool,
    transformer: Arc<FileTransformer<C>>,
    supervisor: ProcessSupervisor,
    debouncer: Debouncer,
    phase: Phase,
    settles: u64,
}

impl<C> std::fmt::Debug for Orchestrator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("layout", &self.layout)
            .field("compile", &self.compile)
            .field("phase", &self.phase)
            .field("settles", &self.settles)
            .finish_non_exhaustive()
    }
}

impl<C: Compiler + 'static> Orchestrator<C> {
    /// Creates an orchestrator. `env` is added to every child's environment.
    pub fn new(
        layout: Layout,
        transformer: FileTransformer<C>,
        supervisor: ProcessSupervisor,
        env: Vec<(String, String)>,
        compile: bool,
    ) -> Self {
        Self {
            layout,
            env,
            compile,
            transformer: Arc::new(transformer),
            supervisor,
            debouncer: Debouncer::new(),
            phase: Phase::Starting,
            settles: 0,
        }
    }

    /// Returns the current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of settles handled so far.
    #[inline]
    #[must_use]
    pub fn settles(&self) -> u64 {
        self.settles
    }

    /// Returns the process supervisor.
    #[inline]
    #[must_use]
    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Returns the resolved layout.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The tree whose changes trigger a restart.
    ///
    /// The source tree when compiling, the runtime tree otherwise.
    #[must_use]
    pub fn watch_root(&self) -> &Utf8Path {
        if self.compile {
            self.layout.mirror.source_root()
        } else {
            self.layout.mirror.runtime_root()
        }
    }

    fn watch_filter(&self) -> CompositeFilter {
        let filter = CompositeFilter::new().and(NameDenylistFilter::new(DENYLIST));
        if self.compile {
            // Our own writes must not retrigger the loop.
            filter.and(ExcludeTreeFilter::new(self.layout.mirror.runtime_root().to_owned()))
        } else {
            filter
        }
    }

    async fn full_pass(&self) -> Result<(), JoinError> {
        let transformer = Arc::clone(&self.transformer);
        let report = tokio::task::spawn_blocking(move || transformer.full_pass()).await?;
        report.log_summary("Initial build");
        Ok(())
    }

    /// Runs the initial pass when compiling, then starts the child.
    ///
    /// Neither an aborted pass nor a spawn failure is fatal: both are logged
    /// and the slot stays empty until the next settle if the spawn failed.
    pub async fn start(&mut self) {
        self.phase = Phase::Starting;
        if self.compile {
            if let Err(e) = self.full_pass().await {
                error!(error = %e, "Initial build aborted");
            }
        }
        if let Err(e) = self.supervisor.start(&self.layout.entry, &self.env) {
            error!(error = %e, entry = %self.layout.entry, "Failed to start process");
        }
        self.phase = Phase::Running;
    }

    /// Handles one event. Returns the stop reason once the run should end.
    pub async fn handle(&mut self, event: Event) -> Option<StopReason> {
        match event {
            Event::FileChanged(changed) => {
                self.on_change(changed);
                None
            }
            Event::Settled(batch) => {
                self.settle(batch).await;
                None
            }
            Event::ChildExited(exit) => {
                let code = match exit.reason {
                    ExitReason::SelfExited { code } => code,
                    ExitReason::Killed => None,
                };
                info!(code = ?code, generation = exit.generation, "Process exited on its own, stopping");
                Some(StopReason::ChildExited(code))
            }
            Event::Signal(signal) => {
                info!(%signal, "Received termination signal");
                Some(StopReason::Signal(signal))
            }
        }
    }

    fn on_change(&mut self, changed: FileEvent) {
        if self.compile && self.layout.mirror.is_source(&changed.path) {
            trace!(path = %changed.path, "Queued for rebuild");
            self.debouncer.push(changed.path);
        } else {
            trace!(path = %changed.path, "Change noted");
            self.debouncer.touch();
        }
    }

    async fn settle(&mut self, batch: ChangeBatch) {
        self.phase = Phase::Settling;

        if !batch.is_empty() {
            debug!(files = batch.unique_paths().len(), events = batch.len(), "Changes settled");
            let transformer = Arc::clone(&self.transformer);
            match tokio::task::spawn_blocking(move || transformer.process_batch(batch.iter())).await {
                Ok(report) => report.log_summary("Rebuild"),
                Err(e) => error!(error = %e, "Rebuild aborted"),
            }
        }

        if let Err(e) = self.supervisor.restart(&self.layout.entry, &self.env) {
            error!(error = %e, entry = %self.layout.entry, "Failed to restart process");
        }

        self.settles += 1;
        self.phase = Phase::Running;
    }

    /// Starts everything and loops until a signal or a self-exited child.
    ///
    /// The child is always reaped before this returns.
    pub async fn watch(mut self, config: &WatchConfig) -> Result<StopReason, RunError> {
        let mut signals = ShutdownSignals::new()?;
        self.start().await;

        let mut watcher = FileWatcher::new(self.watch_root(), config, self.watch_filter())?;
        info!(path = %watcher.watch_path(), "Watching for changes");

        let reason = self.event_loop(&mut signals, &mut watcher).await;

        self.phase = Phase::Stopped;
        self.supervisor.shutdown().await;
        if let Err(e) = watcher.shutdown().await {
            warn!(error = %e, "Error shutting down watcher");
        }
        Ok(reason)
    }

    async fn event_loop(
        &mut self,
        signals: &mut ShutdownSignals,
        watcher: &mut FileWatcher,
    ) -> StopReason {
        loop {
            let event = tokio::select! {
                signal = signals.recv() => Event::Signal(signal),
                Some(changed) = watcher.recv() => Event::FileChanged(changed),
                batch = self.debouncer.settled() => Event::Settled(batch),
                exit = self.supervisor.next_exit() => Event::ChildExited(exit),
            };

            if let Some(reason) = self.handle(event).await {
                return reason;
            }
        }
    }

    /// Runs without watching.
    ///
    /// Compile mode runs one full pass and returns without starting the
    /// child. Otherwise the child is started once and awaited.
    pub async fn run_once(mut self) -> Result<StopReason, RunError> {
        if self.compile {
            self.full_pass().await?;
            self.phase = Phase::Stopped;
            return Ok(StopReason::Completed);
        }

        let mut signals = ShutdownSignals::new()?;
        let reason = tokio::select! {
            code = self.supervisor.run_once(&self.layout.entry, &self.env) => {
                StopReason::ChildExited(code?)
            }
            signal = signals.recv() => StopReason::Signal(signal),
        };

        self.phase = Phase::Stopped;
        Ok(reason)
    }
}
