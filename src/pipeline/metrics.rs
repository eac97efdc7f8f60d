//! Pipeline counters.
//!
//! Superseded frames are dropped silently by design; these counters exist
//! so operators can still see how hard the gate is working.  They are a
//! read-only side channel — nothing in the pipeline consults them, and the
//! drop counter is bumped strictly after the dropped frame is released.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters shared by the gate and the processor.
///
/// All counts are monotonic since pipeline construction.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    offered: AtomicU64,
    admitted: AtomicU64,
    dropped: AtomicU64,
    unusable: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

impl PipelineMetrics {
    /// Frames offered to the gate.
    pub fn offered(&self) -> u64 {
        self.offered.load(Ordering::Relaxed)
    }

    /// Frames admitted into a recognition cycle.
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    /// Frames dropped because the pipeline was busy.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Empty frames released without entering the pipeline.
    pub fn unusable(&self) -> u64 {
        self.unusable.load(Ordering::Relaxed)
    }

    /// Cycles whose recognition succeeded (including blank results).
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Cycles whose recognition failed.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Cycles whose recognition timed out.
    pub fn timed_out(&self) -> u64 {
        self.timed_out.load(Ordering::Relaxed)
    }

    pub(crate) fn record_offered(&self) {
        self.offered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unusable(&self) {
        self.unusable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }
}
