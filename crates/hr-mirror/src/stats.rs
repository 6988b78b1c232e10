//! Per-pass counters and reports.
//!
//! A pass is one run of the transformer over a list of files: the initial
//! full build, or the batch drained at a settle.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MirrorError;
use crate::transform::Outcome;

/// Counters for one pass.
///
/// # Examples
///
/// ```
/// use hr_mirror::PassStats;
///
/// let stats = PassStats::default();
/// assert_eq!(stats.total(), 0);
/// assert_eq!(stats.writes(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassStats {
    /// Files written through the compiler.
    pub transformed: u64,
    /// Files copied byte-for-byte.
    pub copied: u64,
    /// Files left untouched (denylisted or no existing mirror).
    pub skipped: u64,
    /// Files that failed to compile, read, or write.
    pub failed: u64,
}

impl PassStats {
    /// Records a successful outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Transformed { .. } => self.transformed += 1,
            Outcome::Copied { .. } => self.copied += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }

    /// Records a per-file failure.
    #[inline]
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of files that were written to the runtime tree.
    #[inline]
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.transformed + self.copied
    }

    /// Number of files the pass looked at.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.transformed + self.copied + self.skipped + self.failed
    }
}

/// The result of a pass: counters plus every per-file error.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Outcome counters.
    pub stats: PassStats,
    /// Failures, in processing order.
    pub errors: Vec<MirrorError>,
    /// Wall time spent in the pass.
    pub elapsed: Duration,
}

impl PassReport {
    /// Returns `true` if every file was handled without error.
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Logs a one-line summary, and each failure at `warn`.
    pub fn log_summary(&self, label: &str) {
        for error in &self.errors {
            tracing::warn!(error = %error, "{label}: file skipped");
        }
        tracing::info!(
            transformed = self.stats.transformed,
            copied = self.stats.copied,
            skipped = self.stats.skipped,
            failed = self.stats.failed,
            elapsed_ms = u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            "{label} complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::SkipReason;
    use camino::Utf8PathBuf;

    #[test]
    fn test_record_outcomes() {
        let mut stats = PassStats::default();
        stats.record(&Outcome::Transformed {
            runtime: Utf8PathBuf::from("runtime/a.js"),
        });
        stats.record(&Outcome::Copied {
            runtime: Utf8PathBuf::from("runtime/b.json"),
        });
        stats.record(&Outcome::Skipped(SkipReason::MirrorAbsent));
        stats.record_failure();

        assert_eq!(stats.transformed, 1);
        assert_eq!(stats.copied, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.writes(), 2);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = PassStats {
            transformed: 3,
            ..PassStats::default()
        };
        let json = serde_json::to_string(&stats).expect("serialize");
        assert_eq!(
            json,
            r#"{"transformed":3,"copied":0,"skipped":0,"failed":0}"#
        );
    }

    #[test]
    fn test_empty_report_is_clean() {
        assert!(PassReport::default().is_clean());
    }
}
