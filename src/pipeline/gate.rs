//! Backpressure gate — keep-only-latest admission control.
//!
//! The camera produces frames faster than recognition can consume them.
//! [`BackpressureGate::offer`] admits at most one frame at a time and
//! releases everything else on the spot, so under load the pipeline always
//! processes the most recent reality instead of a backlog of stale frames.
//!
//! The gate never queues: it holds the notion of "currently busy" (the
//! shared [`PipelineFlag`]) and a capacity-1 handoff channel to the
//! processor, nothing more.  Memory use is bounded by construction.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::camera::Frame;
use crate::pipeline::metrics::PipelineMetrics;
use crate::pipeline::state::{PipelineState, SharedFlag};

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Outcome of offering one frame to the gate.
///
/// Exactly one of release-or-forward happens per offered frame, whatever
/// the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The frame was forwarded to the processor; the pipeline is now busy.
    Admitted,

    /// The pipeline was busy; the frame was released immediately.
    Dropped,

    /// The frame carried no pixel data; released immediately with no state
    /// transition.
    Unusable,
}

// ---------------------------------------------------------------------------
// BackpressureGate
// ---------------------------------------------------------------------------

/// Admits at most one frame at a time into the pipeline.
///
/// `offer` is called on the frame-delivery context, once per produced
/// frame, never concurrently with itself.  The `idle → busy` transition is
/// atomic with admission: by the time `offer` returns [`Admission::Admitted`]
/// the flag is already held, so no second frame can slip in.
pub struct BackpressureGate {
    flag: SharedFlag,
    tx: mpsc::Sender<Frame>,
    metrics: Arc<PipelineMetrics>,
}

impl BackpressureGate {
    /// Build a gate over the shared flag and the processor's frame channel.
    ///
    /// `tx` must be the sending half of a capacity-1 channel whose receiver
    /// is consumed by a [`FrameProcessor`](crate::pipeline::FrameProcessor).
    pub fn new(flag: SharedFlag, tx: mpsc::Sender<Frame>, metrics: Arc<PipelineMetrics>) -> Self {
        Self { flag, tx, metrics }
    }

    /// Offer one frame for recognition.
    ///
    /// Every path releases or forwards the frame exactly once:
    /// - empty frame → released, [`Admission::Unusable`], state untouched;
    /// - pipeline busy → released, [`Admission::Dropped`];
    /// - pipeline idle → flag acquired, frame forwarded,
    ///   [`Admission::Admitted`].
    pub fn offer(&self, frame: Frame) -> Admission {
        self.metrics.record_offered();

        if frame.is_empty() {
            log::debug!("gate: frame {} is unusable, releasing", frame.sequence());
            frame.release();
            self.metrics.record_unusable();
            return Admission::Unusable;
        }

        if !self.flag.try_acquire() {
            log::trace!("gate: busy, dropping frame {}", frame.sequence());
            frame.release();
            self.metrics.record_dropped();
            return Admission::Dropped;
        }

        // The channel has capacity 1 and we hold the flag, so the only
        // failure mode is a processor that has shut down.
        if let Err(e) = self.tx.try_send(frame) {
            let frame = match e {
                TrySendError::Full(frame) | TrySendError::Closed(frame) => frame,
            };
            log::warn!(
                "gate: processor unavailable, releasing frame {}",
                frame.sequence()
            );
            frame.release();
            self.flag.release();
            self.metrics.record_dropped();
            return Admission::Dropped;
        }

        self.metrics.record_admitted();
        Admission::Admitted
    }

    /// Current pipeline state as seen from the gate.
    pub fn state(&self) -> PipelineState {
        self.flag.state()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FramePool;
    use crate::pipeline::state::PipelineFlag;

    fn make_gate(capacity: usize) -> (BackpressureGate, mpsc::Receiver<Frame>, SharedFlag) {
        let flag: SharedFlag = Arc::new(PipelineFlag::new());
        let (tx, rx) = mpsc::channel(capacity);
        let gate = BackpressureGate::new(
            Arc::clone(&flag),
            tx,
            Arc::new(PipelineMetrics::default()),
        );
        (gate, rx, flag)
    }

    #[tokio::test]
    async fn idle_frame_is_admitted_and_forwarded() {
        let (gate, mut rx, flag) = make_gate(1);
        let pool = FramePool::new(2);
        let frame = pool.acquire(vec![1, 2, 3], 0).unwrap();
        let sequence = frame.sequence();

        assert_eq!(gate.offer(frame), Admission::Admitted);
        assert!(flag.state().is_busy());

        let forwarded = rx.try_recv().expect("frame should be on the channel");
        assert_eq!(forwarded.sequence(), sequence);
        assert_eq!(pool.outstanding(), 1); // still leased — processor owns it
    }

    #[tokio::test]
    async fn busy_pipeline_drops_and_releases() {
        let (gate, mut rx, _flag) = make_gate(1);
        let pool = FramePool::new(4);

        assert_eq!(
            gate.offer(pool.acquire(vec![1], 0).unwrap()),
            Admission::Admitted
        );
        assert_eq!(
            gate.offer(pool.acquire(vec![2], 0).unwrap()),
            Admission::Dropped
        );
        assert_eq!(
            gate.offer(pool.acquire(vec![3], 0).unwrap()),
            Admission::Dropped
        );

        // Only the admitted frame is still leased; drops went straight back.
        assert_eq!(pool.outstanding(), 1);
        assert_eq!(gate.metrics.dropped(), 2);

        // And only one frame ever reached the channel — nothing was queued.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_frame_is_unusable_and_leaves_state_alone() {
        let (gate, mut rx, flag) = make_gate(1);
        let pool = FramePool::new(1);

        let admission = gate.offer(pool.acquire(Vec::new(), 0).unwrap());
        assert_eq!(admission, Admission::Unusable);
        assert_eq!(flag.state(), PipelineState::Idle);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(gate.metrics.unusable(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stopped_processor_drops_and_reopens_the_flag() {
        let (gate, rx, flag) = make_gate(1);
        drop(rx); // processor gone

        let pool = FramePool::new(1);
        let admission = gate.offer(pool.acquire(vec![1], 0).unwrap());

        assert_eq!(admission, Admission::Dropped);
        assert_eq!(flag.state(), PipelineState::Idle);
        assert_eq!(pool.outstanding(), 0);
    }

    #[tokio::test]
    async fn gate_readmits_after_the_flag_is_released() {
        let (gate, mut rx, flag) = make_gate(1);
        let pool = FramePool::new(4);

        assert_eq!(
            gate.offer(pool.acquire(vec![1], 0).unwrap()),
            Admission::Admitted
        );
        assert_eq!(
            gate.offer(pool.acquire(vec![2], 0).unwrap()),
            Admission::Dropped
        );

        // Simulate cycle completion: processor consumed and released the
        // frame, then reset the flag.
        rx.try_recv().unwrap().release();
        flag.release();

        assert_eq!(
            gate.offer(pool.acquire(vec![3], 0).unwrap()),
            Admission::Admitted
        );
        assert_eq!(gate.metrics.admitted(), 2);
    }

    #[tokio::test]
    async fn every_offered_frame_is_accounted_for() {
        let (gate, mut rx, _flag) = make_gate(1);
        let pool = FramePool::new(8);

        for i in 0..6u8 {
            let pixels = if i == 3 { Vec::new() } else { vec![i] };
            gate.offer(pool.acquire(pixels, 0).unwrap());
        }

        let m = &gate.metrics;
        assert_eq!(m.offered(), 6);
        assert_eq!(m.admitted() + m.dropped() + m.unusable(), 6);

        // No leak: only the single admitted frame is still outstanding.
        assert_eq!(pool.outstanding(), 1);
        rx.try_recv().unwrap().release();
        assert_eq!(pool.outstanding(), 0);
    }
}
