//! The hotrun development loop.
//!
//! Ties the workspace together: an initial build of the runtime tree, a
//! supervised child process, and a watch loop that recompiles and restarts
//! after every burst of changes.
//!
//! # Architecture
//!
//! ```text
//! crates/hr-runner/src/
//!   lib.rs           # run() entry point
//!   options.rs       # RunOptions and the resolved Layout
//!   orchestrator.rs  # State machine and select! loop
//!   event.rs         # Event and StopReason
//!   error.rs         # RunError
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use hr_core::Config;
//! use hr_runner::{RunOptions, run};
//! use camino::Utf8PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hr_runner::RunError> {
//!     let config = Config::default();
//!     let options = RunOptions::new(Some(Utf8PathBuf::from("app/index.js")), None, &config.paths)
//!         .watch(true)
//!         .compile(true);
//!
//!     let reason = run(&config, &options).await?;
//!     println!("stopped: {reason:?}");
//!     Ok(())
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod options;
pub mod orchestrator;

use camino::Utf8PathBuf;
use hr_core::Config;
use hr_mirror::{CommandCompiler, FileTransformer};
use hr_supervisor::ProcessSupervisor;
use tracing::info;

pub use error::RunError;
pub use event::{Event, StopReason};
pub use options::{DEFAULT_ENTRY, Layout, RunOptions};
pub use orchestrator::{Orchestrator, Phase};

/// Runs hotrun in the current working directory.
///
/// With `watch`, blocks until a termination signal or until the child exits
/// on its own. Without it, either runs one compile pass (`compile`) or runs
/// the child once and waits for it.
///
/// # Errors
///
/// Returns an error if the working directory cannot be resolved, the watcher
/// or signal handlers fail to start, or a compile-only pass panics. Per-file
/// compile failures are logged, never returned.
pub async fn run(config: &Config, options: &RunOptions) -> Result<StopReason, RunError> {
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(RunError::NonUtf8Cwd)?;
    let layout = Layout::resolve(options, &cwd);

    info!(
        source = %options.source_dir,
        runtime = %options.runtime_dir,
        entry = %options.runtime_entry(),
        watch = options.watch,
        compile = options.compile,
        "Starting"
    );

    let transformer = FileTransformer::new(
        layout.mirror.clone(),
        CommandCompiler::from_config(&config.compiler),
    )
    .with_extensions(config.compiler.extensions.clone())
    .with_display_root(cwd);

    let env = vec![(config.paths.env_var.clone(), options.runtime_dir.to_string())];
    let orchestrator = Orchestrator::new(
        layout,
        transformer,
        ProcessSupervisor::new(&config.process),
        env,
        options.compile,
    );

    if options.watch {
        orchestrator.watch(&config.watch).await
    } else {
        orchestrator.run_once().await
    }
}
