//! Text-recognition engines.
//!
//! This module provides:
//! * [`TextRecognizer`] — async trait implemented by all recognizer
//!   backends.
//! * [`RecognitionRequest`] — borrowed per-frame view handed to an engine.
//! * [`RemoteRecognizer`] — HTTP backend for an out-of-process OCR service.
//! * [`OcrError`] — error variants for recognition operations.
//!
//! The recognition algorithm itself lives outside this crate; everything
//! here is the request/response contract around it.

pub mod engine;
pub mod remote;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::{OcrError, RecognitionRequest, TextRecognizer};
pub use remote::RemoteRecognizer;

// test-only re-export so pipeline test modules can import MockRecognizer
// without `use crate::ocr::engine::MockRecognizer`.
#[cfg(test)]
pub use engine::MockRecognizer;
