//! Run statistics: what a conversion run produced and how long it took.
//!
//! [`ConversionStats`] is a small one-directional state machine:
//!
//! ```text
//! Idle ──begin()──▶ Running ──finish()──▶ Complete
//! ```
//!
//! A fresh run resets the aggregate back to Idle and immediately to Running;
//! once Complete the stats are read-only until the next run. Elapsed time is
//! defined only for a Complete run and reads as zero before that, so a live
//! UI polling mid-run never displays a garbage duration.
//!
//! Byte totals come from re-stat-ing each file immediately after it is
//! written, not from encoder-reported buffer sizes, so the numbers always
//! match what is actually on disk.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lifecycle state of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run in progress; all counters zeroed.
    #[default]
    Idle,
    /// A run has started; `started_at` is fixed.
    Running,
    /// The run ended (success or failure); `finished_at` is fixed.
    Complete,
}

/// Accumulated statistics for one conversion run.
///
/// Created fresh at the start of each run, mutated incrementally as each
/// page is encoded, finalised when the run ends. Read by the CLI summary
/// and by UI hosts through [`ConversionStats::report`].
#[derive(Debug, Default)]
pub struct ConversionStats {
    state: RunState,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    /// Pages successfully encoded and written.
    pub pages_converted: usize,
    /// Pages skipped after an encode/write failure.
    pub pages_failed: usize,
    /// Sum of on-disk sizes of all files in `files_created`.
    pub total_bytes: u64,
    /// Output paths in write order.
    pub files_created: Vec<PathBuf>,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Reset all counters and transition Idle → Running.
    ///
    /// Calling this on a Complete aggregate starts the next run; the previous
    /// run's numbers are discarded.
    pub fn begin(&mut self) {
        *self = Self {
            state: RunState::Running,
            started_at: Some(Instant::now()),
            ..Self::default()
        };
    }

    /// Record one successfully written page, re-stat-ing the file for its
    /// on-disk size.
    pub fn record_page(&mut self, path: &Path) -> std::io::Result<u64> {
        let size = std::fs::metadata(path)?.len();
        self.pages_converted += 1;
        self.total_bytes += size;
        self.files_created.push(path.to_path_buf());
        Ok(size)
    }

    /// Record a page that was skipped after a failure.
    pub fn record_failure(&mut self) {
        self.pages_failed += 1;
    }

    /// Fix the end time and transition Running → Complete.
    ///
    /// Idempotent: finishing twice keeps the first end time.
    pub fn finish(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Complete;
            self.finished_at = Some(Instant::now());
        }
    }

    /// Wall-clock duration of the run. Zero unless the run is Complete.
    pub fn elapsed(&self) -> Duration {
        match (self.state, self.started_at, self.finished_at) {
            (RunState::Complete, Some(start), Some(end)) => end.duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Serialisable snapshot for `--json` output and UI display.
    pub fn report(&self) -> ConversionReport {
        ConversionReport {
            pages_converted: self.pages_converted,
            pages_failed: self.pages_failed,
            total_bytes: self.total_bytes,
            elapsed_ms: self.elapsed().as_millis() as u64,
            files_created: self.files_created.clone(),
        }
    }
}

/// Plain-data snapshot of a [`ConversionStats`] aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub pages_converted: usize,
    pub pages_failed: usize,
    pub total_bytes: u64,
    pub elapsed_ms: u64,
    pub files_created: Vec<PathBuf>,
}

/// Result of a batch run over a directory tree.
#[derive(Debug)]
pub struct BatchStats {
    /// Documents converted without a fatal error.
    pub succeeded: usize,
    /// Documents found (and attempted, unless cancelled).
    pub total: usize,
    /// Wall-clock duration of the whole batch.
    pub elapsed: Duration,
    /// Merged per-page statistics across all documents.
    pub pages: ConversionReport,
}
