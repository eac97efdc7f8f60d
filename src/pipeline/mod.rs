//! The frame-intake-and-backpressure pipeline.
//!
//! This module wires the flow from a live frame source through keep-only-
//! latest admission to an asynchronous recognition engine and out to a
//! display sink:
//!
//! ```text
//! FrameSource ─▶ BackpressureGate ─▶ FrameProcessor ─▶ TextRecognizer
//!                      │                   │                (await)
//!                      │ busy: release     └──▶ ResultSink (non-blank only)
//!                      ▼
//!                 frame dropped
//! ```
//!
//! # Invariants
//!
//! - **Single-flight**: at most one frame is ever between admission and
//!   completion; enforced by the atomic [`PipelineFlag`].
//! - **No leak**: every offered frame is released exactly once, carried by
//!   RAII on the frame's pool lease plus the processor's cycle guard.
//! - **Keep-only-latest**: the gate never queues; under load only the most
//!   recent frame is of interest and everything else is dropped.
//! - **Order preservation**: one cycle at a time means sink updates arrive
//!   in admission order by construction.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scene_to_text::camera::TestPatternSource;
//! use scene_to_text::config::AppConfig;
//! use scene_to_text::ocr::{RemoteRecognizer, TextRecognizer};
//! use scene_to_text::pipeline::Pipeline;
//! use scene_to_text::sink::{ResultSink, TextPanel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let recognizer: Arc<dyn TextRecognizer> =
//!         Arc::new(RemoteRecognizer::from_config(&config.ocr));
//!     let sink: Arc<dyn ResultSink> = Arc::new(TextPanel::new());
//!
//!     let mut pipeline = Pipeline::new(recognizer, sink, &config.pipeline);
//!     let mut source = TestPatternSource::new(&config.camera);
//!     pipeline.start(&mut source).unwrap();
//!
//!     tokio::signal::ctrl_c().await.unwrap();
//!     pipeline.stop().await;
//! }
//! ```

pub mod gate;
pub mod metrics;
pub mod processor;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use gate::{Admission, BackpressureGate};
pub use metrics::PipelineMetrics;
pub use processor::FrameProcessor;
pub use runner::Pipeline;
pub use state::{PipelineFlag, PipelineState, SharedFlag};
