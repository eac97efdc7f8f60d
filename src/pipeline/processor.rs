//! Frame processor — runs exactly one recognition cycle at a time.
//!
//! [`FrameProcessor::run`] consumes admitted frames from the capacity-1
//! handoff channel and drives one cycle per frame:
//!
//! ```text
//! frame ──▶ RecognitionRequest ──▶ TextRecognizer::recognize (await)
//!             │
//!             ├─ Ok(non-blank) ──▶ ResultSink::update
//!             ├─ Ok(blank)     ──▶ no update (flicker suppression)
//!             └─ Err           ──▶ log::warn, no update
//!             │
//!             └─ always: release frame, reset flag to idle
//! ```
//!
//! The release + reset step is carried by a RAII guard wrapping the whole
//! cycle, so it runs on every exit path — success, failure, timeout, even a
//! panicking recognizer future.  Nothing propagates out of a cycle; the
//! pipeline self-heals on the next admitted frame.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::camera::Frame;
use crate::ocr::{OcrError, RecognitionRequest, TextRecognizer};
use crate::pipeline::metrics::PipelineMetrics;
use crate::pipeline::state::SharedFlag;
use crate::sink::ResultSink;

// ---------------------------------------------------------------------------
// CycleGuard
// ---------------------------------------------------------------------------

/// Owns the in-flight frame for the duration of one cycle.
///
/// On drop it releases the frame *first* and resets the flag *second*, so a
/// newly admitted frame can never coexist with a not-yet-released
/// predecessor.
struct CycleGuard {
    frame: Option<Frame>,
    flag: SharedFlag,
}

impl CycleGuard {
    fn new(frame: Frame, flag: SharedFlag) -> Self {
        Self {
            frame: Some(frame),
            flag,
        }
    }

    fn frame(&self) -> &Frame {
        self.frame.as_ref().expect("frame is held until drop")
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.frame.take();
        self.flag.release();
    }
}

// ---------------------------------------------------------------------------
// FrameProcessor
// ---------------------------------------------------------------------------

/// Owns the single in-flight recognition request.
///
/// # Precondition
///
/// At most one frame may be on the channel or inside a cycle at any time.
/// The [`BackpressureGate`](crate::pipeline::BackpressureGate) guarantees
/// this upstream by only forwarding a frame after winning the `idle → busy`
/// transition on the shared flag.
pub struct FrameProcessor {
    flag: SharedFlag,
    recognizer: Arc<dyn TextRecognizer>,
    sink: Arc<dyn ResultSink>,
    timeout: Option<Duration>,
    metrics: Arc<PipelineMetrics>,
}

impl FrameProcessor {
    /// Create a processor.
    ///
    /// `timeout` bounds a single recognition call; `None` means a slow
    /// engine keeps the pipeline busy indefinitely (frames offered in the
    /// meantime are still dropped promptly by the gate, so the feed itself
    /// never stalls).
    pub fn new(
        flag: SharedFlag,
        recognizer: Arc<dyn TextRecognizer>,
        sink: Arc<dyn ResultSink>,
        timeout: Option<Duration>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            flag,
            recognizer,
            sink,
            timeout,
            metrics,
        }
    }

    /// Process admitted frames until the channel closes.
    ///
    /// Spawn this as a tokio task; it returns once every sender (i.e. the
    /// gate) has been dropped and the final cycle has finished.
    pub async fn run(self, mut rx: mpsc::Receiver<Frame>) {
        while let Some(frame) = rx.recv().await {
            self.cycle(frame).await;
        }
        log::info!("processor: frame channel closed, shutting down");
    }

    /// One complete recognition cycle: `busy ──completion──▶ idle`.
    async fn cycle(&self, frame: Frame) {
        let sequence = frame.sequence();
        let guard = CycleGuard::new(frame, Arc::clone(&self.flag));
        let request = RecognitionRequest::from_frame(guard.frame());

        let outcome = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.recognizer.recognize(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(OcrError::Timeout),
                }
            }
            None => self.recognizer.recognize(request).await,
        };

        match outcome {
            Ok(text) if !text.trim().is_empty() => {
                log::debug!("frame {sequence}: recognized {} chars", text.len());
                self.sink.update(&text);
                self.metrics.record_completed();
            }
            Ok(_) => {
                // Blank result — suppress the update to avoid display
                // flicker on frames with no legible text.
                log::debug!("frame {sequence}: no legible text");
                self.metrics.record_completed();
            }
            Err(OcrError::Timeout) => {
                log::warn!("frame {sequence}: recognition timed out");
                self.metrics.record_timed_out();
            }
            Err(e) => {
                log::warn!("frame {sequence}: recognition failed: {e}");
                self.metrics.record_failed();
            }
        }
        // guard drops here: frame released, then flag reset to idle.
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
