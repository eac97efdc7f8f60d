//! scene-to-text — real-time camera OCR pipeline.
//!
//! A continuous video stream is sampled frame-by-frame, each sampled frame
//! is handed to an asynchronous, potentially slow, external recognition
//! engine, and results are surfaced to a display as they complete — without
//! ever falling behind the live stream or leaking frame buffers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   offer    ┌──────────────────┐  capacity-1  ┌────────────────┐
//! │ FrameSource  │──────────▶│ BackpressureGate  │─────────────▶│ FrameProcessor │
//! │ (camera /    │           │ keep-only-latest  │   channel    │ single cycle   │
//! │ test pattern)│           │ busy → drop frame │              │ at a time      │
//! └──────────────┘           └──────────────────┘              └───────┬────────┘
//!                                                                      │ await
//!                                                     ┌────────────────┴───────┐
//!                                                     │ TextRecognizer (HTTP)  │
//!                                                     └────────────────┬───────┘
//!                                                     non-blank text   │
//!                                                     ┌────────────────▼───────┐
//!                                                     │ ResultSink (TextPanel) │
//!                                                     └────────────────────────┘
//! ```
//!
//! Two guarantees hold on every code path:
//!
//! - at most one frame is in flight at any instant (atomic single-flight
//!   flag, acquired by the gate, released by the processor's cycle guard);
//! - every frame goes back to its buffer pool exactly once (RAII lease on
//!   the frame, cycle guard on the in-flight one).
//!
//! See [`pipeline`] for the quick-start example.

pub mod camera;
pub mod config;
pub mod ocr;
pub mod pipeline;
pub mod sink;
