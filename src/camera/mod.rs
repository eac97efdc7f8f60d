//! Frame intake: frame handles, buffer-pool accounting and frame sources.
//!
//! A frame is a scarce resource — the capture driver only has a handful of
//! buffer slots, so every [`Frame`] must go back to its [`FramePool`]
//! exactly once on every code path.  That guarantee is carried by RAII (the
//! lease inside the frame), never by caller discipline.
//!
//! [`FrameSource`] is the external-collaborator seam: anything that can
//! call a [`FrameHandler`] once per frame, in capture order, can feed the
//! pipeline.  [`TestPatternSource`] is the built-in hardware-free
//! implementation.

pub mod frame;
pub mod source;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use frame::{Frame, FrameError, FramePool};
pub use source::{CaptureError, FrameHandler, FrameSource, SourceHandle, TestPatternSource};
