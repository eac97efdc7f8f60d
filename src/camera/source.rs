//! Frame sources and the test-pattern generator.
//!
//! [`FrameSource`] is the seam between the pipeline and whatever produces
//! live video.  Call [`FrameSource::start`] with a [`FrameHandler`] to begin
//! delivery; the returned [`SourceHandle`] is a RAII guard — dropping it
//! detaches the source and stops delivery.
//!
//! Physical camera capture is outside this crate.  [`TestPatternSource`]
//! synthesises frames at a configurable rate so the binary and the tests
//! can exercise the pipeline without hardware.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::camera::frame::{Frame, FramePool};
use crate::config::CameraConfig;

// ---------------------------------------------------------------------------
// FrameHandler
// ---------------------------------------------------------------------------

/// Callback invoked once per produced frame, in capture order, never
/// concurrently with itself.  The handler takes ownership of the frame.
pub type FrameHandler = Arc<dyn Fn(Frame) + Send + Sync>;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while attaching a frame source.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid capture configuration: {0}")]
    InvalidConfig(String),
}

// ---------------------------------------------------------------------------
// FrameSource
// ---------------------------------------------------------------------------

/// A producer of live video frames.
///
/// # Contract
///
/// - `deliver` is called once per frame, in capture order.
/// - Deliveries never interleave: the next frame is only produced after the
///   handler has returned for the previous one.
/// - Dropping the [`SourceHandle`] detaches the source; no further
///   deliveries happen afterwards.
pub trait FrameSource {
    /// Begin delivering frames to `deliver`.
    fn start(&mut self, deliver: FrameHandler) -> Result<SourceHandle, CaptureError>;
}

// ---------------------------------------------------------------------------
// SourceHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps a frame source attached.
///
/// Dropping this value stops the delivery task.
pub struct SourceHandle {
    task: Option<JoinHandle<()>>,
}

impl SourceHandle {
    /// Wrap a spawned delivery task.
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// TestPatternSource
// ---------------------------------------------------------------------------

/// Synthetic frame source producing a shifting grayscale test pattern.
///
/// Frames are leased from an internal [`FramePool`] sized by
/// `CameraConfig::buffer_count`; when the pool is exhausted the tick is
/// skipped and a warning is logged, mirroring a real capture driver running
/// out of buffers.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use scene_to_text::camera::{FrameHandler, FrameSource, TestPatternSource};
/// use scene_to_text::config::CameraConfig;
///
/// # async fn example() {
/// let mut source = TestPatternSource::new(&CameraConfig::default());
/// let deliver: FrameHandler = Arc::new(|frame| {
///     println!("frame {} ({} bytes)", frame.sequence(), frame.pixels().len());
/// });
/// let _handle = source.start(deliver).unwrap();
/// // `_handle` keeps the source attached; drop it to stop delivery.
/// # }
/// ```
pub struct TestPatternSource {
    pool: FramePool,
    config: CameraConfig,
}

impl TestPatternSource {
    /// Create a source from capture configuration.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            pool: FramePool::new(config.buffer_count),
            config: config.clone(),
        }
    }

    /// The buffer pool frames are leased from — exposed so callers can
    /// observe outstanding leases.
    pub fn pool(&self) -> &FramePool {
        &self.pool
    }
}

impl FrameSource for TestPatternSource {
    fn start(&mut self, deliver: FrameHandler) -> Result<SourceHandle, CaptureError> {
        if self.config.fps == 0 {
            return Err(CaptureError::InvalidConfig("fps must be non-zero".into()));
        }

        let pool = self.pool.clone();
        let rotation = self.config.rotation_degrees;
        let frame_len = (self.config.width as usize) * (self.config.height as usize);
        let period = Duration::from_secs_f64(1.0 / f64::from(self.config.fps));

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut shade: u8 = 0;

            loop {
                ticker.tick().await;
                // No await between acquire and deliver: abort only lands on
                // the tick above, so a leased frame is never stranded.
                match pool.acquire(vec![shade; frame_len], rotation) {
                    Ok(frame) => deliver(frame),
                    Err(e) => log::warn!("test pattern: capture stalled: {e}"),
                }
                shade = shade.wrapping_add(1);
            }
        });

        Ok(SourceHandle::from_task(task))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
