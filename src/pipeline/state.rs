//! Pipeline state and the shared single-flight flag.
//!
//! [`PipelineState`] has exactly two values — a recognition request is
//! either outstanding or it is not.  The flag behind it is the *only*
//! mutable state shared between the frame-delivery context and the
//! recognition-completion context, so it is a single atomic:
//!
//! ```text
//! idle ──try_acquire (gate admits a frame)──▶ busy
//! busy ──release (cycle guard drops)────────▶ idle
//! ```
//!
//! No other transitions exist; `busy` is never re-entered from `busy`
//! because [`try_acquire`](PipelineFlag::try_acquire) is a compare-exchange
//! that fails while the flag is held.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Whether a recognition request is currently outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// No frame in flight; the next offered frame will be admitted.
    #[default]
    Idle,

    /// Exactly one frame is in flight; offered frames are dropped.
    Busy,
}

impl PipelineState {
    /// `true` while a recognition cycle is running.
    ///
    /// ```
    /// use scene_to_text::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Busy.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineState::Busy)
    }
}

// ---------------------------------------------------------------------------
// PipelineFlag
// ---------------------------------------------------------------------------

/// Atomic single-flight flag shared by the gate and the processor.
///
/// The gate calls [`try_acquire`](Self::try_acquire) on the delivery
/// context; the processor's cycle guard calls [`release`](Self::release)
/// on the completion context.  Acquire/release orderings make the frame
/// handoff visible across the two.
#[derive(Debug, Default)]
pub struct PipelineFlag {
    busy: AtomicBool,
}

impl PipelineFlag {
    /// Create a flag in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt the `idle → busy` transition.
    ///
    /// Returns `true` when this caller won the transition, `false` when the
    /// pipeline was already busy.  Atomic with respect to concurrent
    /// callers — at most one can win until the next [`release`](Self::release).
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Perform the `busy → idle` transition.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Current state of the pipeline.
    pub fn state(&self) -> PipelineState {
        if self.busy.load(Ordering::Acquire) {
            PipelineState::Busy
        } else {
            PipelineState::Idle
        }
    }
}

/// Thread-safe handle to the single-flight flag.  Cheap to clone.
pub type SharedFlag = Arc<PipelineFlag>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
