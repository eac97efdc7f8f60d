//! Frame handles and the capture buffer pool.
//!
//! A [`Frame`] is an opaque handle to one captured image plus its metadata
//! (rotation, sequence number).  Frames are leased from a fixed-capacity
//! [`FramePool`] that models the capture driver's buffer ring: while a frame
//! is outstanding its buffer slot is unavailable, and a frame that is never
//! returned stalls capture.
//!
//! Return-exactly-once is enforced by RAII — the lease inside the frame
//! gives the slot back when the frame is dropped, on every code path.
//! [`Frame::release`] is provided so call sites can name the operation
//! explicitly.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

// ---------------------------------------------------------------------------
// FrameError
// ---------------------------------------------------------------------------

/// Errors that can occur when leasing a frame from the pool.
#[derive(Debug, Clone, Error)]
pub enum FrameError {
    /// All buffer slots are leased out — the capture pipeline is stalled
    /// until at least one outstanding frame is released.
    #[error("frame pool exhausted — all {0} buffer slots are outstanding")]
    PoolExhausted(usize),
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One captured image plus metadata, leased from a [`FramePool`].
///
/// Ownership is single-owner and transfers linearly: the source creates the
/// frame, the gate either releases it or forwards it, and the processor
/// releases it after recognition.  Dropping the frame returns its slot to
/// the pool; this happens exactly once because `Drop` runs exactly once.
pub struct Frame {
    pixels: Vec<u8>,
    rotation_degrees: u16,
    sequence: u64,
    _lease: FrameLease,
}

impl Frame {
    /// Raw pixel data of the captured image.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Capture orientation in integer degrees (0, 90, 180, 270).
    pub fn rotation_degrees(&self) -> u16 {
        self.rotation_degrees
    }

    /// Monotonically increasing capture sequence number, unique per pool.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// `true` when the frame carries no pixel data and cannot be recognized.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Return the frame's buffer slot to the pool.
    ///
    /// Equivalent to dropping the frame — this method exists so the gate and
    /// processor can name the release explicitly at the call site.
    pub fn release(self) {}
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("sequence", &self.sequence)
            .field("rotation_degrees", &self.rotation_degrees)
            .field("len", &self.pixels.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// FrameLease
// ---------------------------------------------------------------------------

/// RAII lease on one pool slot.  Dropping it decrements the pool's
/// outstanding count.
struct FrameLease {
    pool: Arc<PoolInner>,
}

impl Drop for FrameLease {
    fn drop(&mut self) {
        self.pool.outstanding.fetch_sub(1, Ordering::AcqRel);
    }
}

// ---------------------------------------------------------------------------
// FramePool
// ---------------------------------------------------------------------------

struct PoolInner {
    capacity: usize,
    outstanding: AtomicUsize,
    next_sequence: AtomicU64,
}

/// Fixed-capacity lease accounting for frame buffers.
///
/// Cheap to clone (`Arc` clone) so the capture task and tests can share it.
///
/// # Example
///
/// ```rust
/// use scene_to_text::camera::FramePool;
///
/// let pool = FramePool::new(2);
/// let a = pool.acquire(vec![1, 2, 3], 0).unwrap();
/// let b = pool.acquire(vec![4, 5, 6], 0).unwrap();
/// assert!(pool.acquire(vec![7], 0).is_err()); // exhausted
///
/// a.release();
/// assert_eq!(pool.outstanding(), 1);
/// drop(b);
/// assert_eq!(pool.outstanding(), 0);
/// ```
#[derive(Clone)]
pub struct FramePool {
    inner: Arc<PoolInner>,
}

impl FramePool {
    /// Create a pool with `capacity` buffer slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                capacity,
                outstanding: AtomicUsize::new(0),
                next_sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Lease a slot and wrap `pixels` in a new [`Frame`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PoolExhausted`] when every slot is already
    /// leased out — the caller should skip this capture tick rather than
    /// block.
    pub fn acquire(&self, pixels: Vec<u8>, rotation_degrees: u16) -> Result<Frame, FrameError> {
        let inner = &self.inner;
        inner
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < inner.capacity).then_some(n + 1)
            })
            .map_err(|_| FrameError::PoolExhausted(inner.capacity))?;

        let sequence = inner.next_sequence.fetch_add(1, Ordering::Relaxed);
        Ok(Frame {
            pixels,
            rotation_degrees,
            sequence,
            _lease: FrameLease {
                pool: Arc::clone(inner),
            },
        })
    }

    /// Number of frames currently leased out.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Total number of buffer slots.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl std::fmt::Debug for FramePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePool")
            .field("capacity", &self.inner.capacity)
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// `Frame` must be `Send` so it can move from the capture task to the
    /// processor task.
    #[test]
    fn frame_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Frame>();
    }

    #[test]
    fn acquire_populates_metadata() {
        let pool = FramePool::new(4);
        let frame = pool.acquire(vec![0u8; 16], 90).unwrap();
        assert_eq!(frame.pixels().len(), 16);
        assert_eq!(frame.rotation_degrees(), 90);
        assert!(!frame.is_empty());
    }

    #[test]
    fn empty_pixels_make_an_empty_frame() {
        let pool = FramePool::new(1);
        let frame = pool.acquire(Vec::new(), 0).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn sequence_numbers_are_monotonic() {
        let pool = FramePool::new(4);
        let a = pool.acquire(vec![1], 0).unwrap();
        let b = pool.acquire(vec![2], 0).unwrap();
        let c = pool.acquire(vec![3], 0).unwrap();
        assert!(a.sequence() < b.sequence());
        assert!(b.sequence() < c.sequence());
    }

    #[test]
    fn sequence_numbers_survive_release() {
        let pool = FramePool::new(1);
        let a = pool.acquire(vec![1], 0).unwrap();
        let first = a.sequence();
        a.release();
        let b = pool.acquire(vec![2], 0).unwrap();
        assert!(b.sequence() > first);
    }

    #[test]
    fn exhausted_pool_refuses_acquire() {
        let pool = FramePool::new(2);
        let _a = pool.acquire(vec![1], 0).unwrap();
        let _b = pool.acquire(vec![2], 0).unwrap();
        let err = pool.acquire(vec![3], 0).unwrap_err();
        assert!(matches!(err, FrameError::PoolExhausted(2)));
    }

    #[test]
    fn release_returns_the_slot() {
        let pool = FramePool::new(1);
        let a = pool.acquire(vec![1], 0).unwrap();
        assert_eq!(pool.outstanding(), 1);
        a.release();
        assert_eq!(pool.outstanding(), 0);
        assert!(pool.acquire(vec![2], 0).is_ok());
    }

    #[test]
    fn drop_is_equivalent_to_release() {
        let pool = FramePool::new(1);
        {
            let _frame = pool.acquire(vec![1], 0).unwrap();
            assert_eq!(pool.outstanding(), 1);
        }
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn outstanding_counts_multiple_leases() {
        let pool = FramePool::new(8);
        let frames: Vec<Frame> = (0..5)
            .map(|i| pool.acquire(vec![i as u8], 0).unwrap())
            .collect();
        assert_eq!(pool.outstanding(), 5);
        drop(frames);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn pool_exhausted_display_names_capacity() {
        let e = FrameError::PoolExhausted(4);
        assert!(e.to_string().contains('4'));
    }
}
