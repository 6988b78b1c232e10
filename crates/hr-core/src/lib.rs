//! Core configuration, errors, and path mirroring for hotrun.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Config`] and its sections, loadable from an optional JSON file
//! - [`ConfigError`] for configuration failures
//! - [`PathMirror`] for mapping source-tree paths onto the runtime tree
//!
//! # Crate Dependencies
//!
//! ```text
//! hr-cli ──► hr-runner ──► hr-mirror ─────► hr-core
//!                      ├─► hr-watcher ────►
//!                      └─► hr-supervisor
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod mirror;

pub use config::{CompilerConfig, Config, PathsConfig, ProcessConfig, WatchConfig};
pub use error::ConfigError;
pub use mirror::{PathMirror, to_runtime};
