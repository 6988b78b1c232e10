//! CLI entry point for hotrun.
//!
//! # Usage
//!
//! ```bash
//! # Compile app/ into runtime/, start runtime/index.js, restart on changes
//! hotrun start app/index.js --watch --compile
//!
//! # Compile into a custom runtime directory and exit
//! hotrun start app/index.js --compile --runtime dist
//!
//! # Restart on changes to an already-built runtime tree
//! hotrun start app/index.js --watch
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use hr_core::Config;
use hr_core::config::DEFAULT_CONFIG_FILE;
use hr_runner::{RunOptions, StopReason};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Compile a source tree into a runtime tree and keep a process running on it.
#[derive(Parser)]
#[command(name = "hotrun", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    ///
    /// Defaults to `./hotrun.json`; a missing default file means built-in
    /// settings.
    #[arg(long, global = true, env = "HOTRUN_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start a script, optionally compiling and restarting on changes.
    Start {
        /// Entry script inside the source tree (e.g. `app/index.js`).
        script: Option<Utf8PathBuf>,

        /// Restart the process when a file is modified.
        #[arg(short, long, env = "HOTRUN_WATCH")]
        watch: bool,

        /// Compile changed files into the runtime tree.
        #[arg(short, long, env = "HOTRUN_COMPILE")]
        compile: bool,

        /// Runtime directory to compile into and start from.
        #[arg(short, long, value_name = "DIR", env = "HOTRUN_RUNTIME")]
        runtime: Option<Utf8PathBuf>,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose`, or
/// `info`, with `notify` held at `warn`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn,notify=warn"))
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_ansi(use_ansi))
        .with(filter)
        .init();
}

/// Loads the configuration file.
///
/// An explicitly named file must exist.
fn load_config(path: Option<&Utf8Path>) -> color_eyre::Result<Config> {
    let config = match path {
        Some(path) if !path.exists() => {
            return Err(color_eyre::eyre::eyre!("Config file does not exist: {path}"));
        }
        Some(path) => Config::load(path)?,
        None => Config::load(Utf8Path::new(DEFAULT_CONFIG_FILE))?,
    };
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

async fn run_start(config: &Config, options: RunOptions) -> color_eyre::Result<()> {
    let reason = hr_runner::run(config, &options).await?;

    match reason {
        StopReason::Signal(signal) => info!(%signal, "Stopped"),
        StopReason::ChildExited(code) => info!(code = ?code, "Process exited"),
        StopReason::Completed => info!("Build complete"),
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Start {
            script,
            watch,
            compile,
            runtime,
        } => {
            let options = RunOptions::new(script, runtime, &config.paths)
                .watch(watch)
                .compile(compile);
            run_start(&config, options).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_start_flags() {
        let cli = Cli::try_parse_from(["hotrun", "start", "app/index.js", "-w", "-c", "-r", "dist"])
            .expect("parse");
        match cli.command {
            Commands::Start {
                script,
                watch,
                compile,
                runtime,
            } => {
                assert_eq!(script.as_deref(), Some(Utf8Path::new("app/index.js")));
                assert!(watch);
                assert!(compile);
                assert_eq!(runtime.as_deref(), Some(Utf8Path::new("dist")));
            }
        }
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        assert!(load_config(Some(Utf8Path::new("/nonexistent/hotrun.json"))).is_err());
    }
}
