//! Core text-recognizer trait and request/outcome types.
//!
//! [`TextRecognizer`] is the interface the pipeline calls.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn TextRecognizer>` and awaited from the processor task.
//!
//! [`RecognitionRequest`] is a borrowed view of a frame: it carries the
//! pixel data and rotation the engine needs without ever owning the frame's
//! lifecycle — the processor keeps the frame alive for the duration of the
//! call and releases it afterwards.
//!
//! [`MockRecognizer`] (available under `#[cfg(test)]`) returns a
//! pre-configured outcome after an optional delay, so pipeline tests can
//! simulate slow or failing engines without any network.

use async_trait::async_trait;
use thiserror::Error;

use crate::camera::Frame;

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

/// All errors that can arise from a recognition engine.
///
/// Blank text is deliberately *not* an error — a frame with no legible text
/// is a successful recognition that produces no display update.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// HTTP transport or connection error.
    #[error("OCR request failed: {0}")]
    Request(String),

    /// The engine did not respond within the configured timeout.
    #[error("OCR request timed out")]
    Timeout,

    /// The engine response could not be parsed as expected.
    #[error("failed to parse OCR response: {0}")]
    Parse(String),

    /// The engine itself reported a recognition failure.
    #[error("OCR engine error: {0}")]
    Engine(String),
}

// ---------------------------------------------------------------------------
// RecognitionRequest
// ---------------------------------------------------------------------------

/// Borrowed view of one frame, shaped for submission to a recognizer.
///
/// Lives only as long as the frame it was derived from; dropping the
/// request has no effect on the frame's lease.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionRequest<'a> {
    pixels: &'a [u8],
    rotation_degrees: u16,
    sequence: u64,
}

impl<'a> RecognitionRequest<'a> {
    /// Derive a request from a frame.
    pub fn from_frame(frame: &'a Frame) -> Self {
        Self {
            pixels: frame.pixels(),
            rotation_degrees: frame.rotation_degrees(),
            sequence: frame.sequence(),
        }
    }

    /// Raw image bytes to recognize.
    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    /// Capture orientation in integer degrees.
    pub fn rotation_degrees(&self) -> u16 {
        self.rotation_degrees
    }

    /// Sequence number of the source frame.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

// ---------------------------------------------------------------------------
// TextRecognizer trait
// ---------------------------------------------------------------------------

/// Async interface to an external text-recognition engine.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn TextRecognizer>`.  Latency is unbounded from the pipeline's
/// point of view; the pipeline never calls `recognize` while a previous
/// call is still outstanding.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text in `request`'s image.
    ///
    /// Returns the recognized text, which may be blank when the image
    /// contains nothing legible.
    async fn recognize(&self, request: RecognitionRequest<'_>) -> Result<String, OcrError>;
}

// Compile-time assertion: Box<dyn TextRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TextRecognizer>) {}
};

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured outcome, optionally after a
/// delay, and counts how many times it was called.
///
/// # Example
///
/// ```rust,ignore
/// let engine = MockRecognizer::ok("HELLO");
/// let outcome = engine.recognize(request).await;
/// assert_eq!(outcome.unwrap(), "HELLO");
/// assert_eq!(engine.calls(), 1);
/// ```
#[cfg(test)]
pub struct MockRecognizer {
    response: Result<String, OcrError>,
    delay: Option<std::time::Duration>,
    calls: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockRecognizer {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            delay: None,
            calls: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: OcrError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            calls: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Sleep for `delay` before responding, simulating a slow engine.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `recognize` calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl TextRecognizer for MockRecognizer {
    async fn recognize(&self, _request: RecognitionRequest<'_>) -> Result<String, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
