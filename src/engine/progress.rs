//! Progress reporting between subvolume tasks and the caller.
//!
//! Each task owns the only [`ProgressWriter`] for its counter; the
//! orchestrator keeps the matching [`ProgressCounter`] and reads it while
//! polling. Counters hold an integer percentage and only move forward.

use crate::util::{CorrDistError, CorrDistResult};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Receives overall progress values.
///
/// Values arrive on the thread that called the engine, never from workers.
pub trait ProgressSink {
    /// Called with the current progress, already mapped into the configured
    /// `[initial_progress, final_progress]` interval.
    fn report(&mut self, progress: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, progress: f64) {
        self(progress)
    }
}

/// Sink that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: f64) {}
}

/// Read side of a per-task percentage counter.
#[derive(Debug, Default)]
pub(crate) struct ProgressCounter {
    value: Arc<AtomicU8>,
}

impl ProgressCounter {
    /// Returns the write handle to hand to the owning task.
    pub(crate) fn writer(&self) -> ProgressWriter {
        ProgressWriter {
            value: Arc::clone(&self.value),
        }
    }

    pub(crate) fn get(&self) -> u8 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Write side of a per-task percentage counter.
#[derive(Debug)]
pub(crate) struct ProgressWriter {
    value: Arc<AtomicU8>,
}

impl ProgressWriter {
    pub(crate) fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    /// Raises the counter to `percent`; lower values are ignored.
    pub(crate) fn advance(&self, percent: u8) {
        self.value.fetch_max(percent.min(100), Ordering::Relaxed);
    }
}

/// All counters of one run plus the interval they are mapped into.
pub(crate) struct ProgressBoard {
    counters: Vec<ProgressCounter>,
    initial: f64,
    last: f64,
}

impl ProgressBoard {
    pub(crate) fn new(tasks: usize, initial: f64, last: f64) -> Self {
        Self {
            counters: (0..tasks).map(|_| ProgressCounter::default()).collect(),
            initial,
            last,
        }
    }

    /// Write handle for `task`'s counter.
    ///
    /// A missing counter means the board and the tile list disagree, which is
    /// an engine fault rather than bad input.
    pub(crate) fn writer(&self, task: usize) -> CorrDistResult<ProgressWriter> {
        self.counters
            .get(task)
            .map(ProgressCounter::writer)
            .ok_or_else(|| {
                CorrDistError::WorkerPool(format!("no progress counter for subvolume {task}"))
            })
    }

    /// Fraction of all cells done, in `[0, 1]`.
    pub(crate) fn fraction(&self) -> f64 {
        if self.counters.is_empty() {
            return 1.0;
        }
        let sum: u64 = self.counters.iter().map(|c| u64::from(c.get())).sum();
        sum as f64 / (100 * self.counters.len()) as f64
    }

    /// Current progress mapped into `[initial, last]`.
    pub(crate) fn mapped(&self) -> f64 {
        map_progress(self.fraction(), self.initial, self.last)
    }
}

pub(crate) fn map_progress(fraction: f64, initial: f64, last: f64) -> f64 {
    if fraction >= 1.0 {
        return last;
    }
    (initial + (last - initial) * fraction.max(0.0)).min(last)
}
