//! Staleness detection and incremental compile/copy into the runtime tree.
//!
//! This crate keeps the runtime tree in step with the source tree. Files with
//! a transformable suffix go through an external [`Compiler`]; everything else
//! is copied byte-for-byte.
//!
//! # Overview
//!
//! - [`walk`] / [`TreeWalker`]: iterative listing of every regular file
//! - [`detect_changed`]: files whose runtime mirror is missing or older
//! - [`FileTransformer`]: compile or copy one file, or a whole batch
//! - [`PassStats`] / [`PassReport`]: per-pass counters and per-file errors
//!
//! # Example
//!
//! ```no_run
//! use hr_core::{CompilerConfig, PathMirror};
//! use hr_mirror::{CommandCompiler, FileTransformer};
//!
//! let mirror = PathMirror::new("app", "runtime");
//! let compiler = CommandCompiler::from_config(&CompilerConfig::default());
//! let transformer = FileTransformer::new(mirror, compiler);
//!
//! let report = transformer.full_pass();
//! println!("{} compiled, {} failed", report.stats.transformed, report.stats.failed);
//! ```
//!
//! # Error Handling
//!
//! Every failure is scoped to one file. A batch always runs to the end and
//! the failures are returned in [`PassReport::errors`].

#![deny(clippy::all)]
#![warn(missing_docs)]

mod compiler;
mod error;
mod stale;
mod stats;
mod transform;
mod walker;

pub use compiler::{CommandCompiler, CompileError, Compiler};
pub use error::MirrorError;
pub use stale::{FileRecord, StaleScan, detect_changed, is_stale};
pub use stats::{PassReport, PassStats};
pub use transform::{DENYLIST, FileTransformer, Outcome, SkipReason};
pub use walker::{TreeWalker, WalkResult, walk};
