//! Configuration: settings structs, defaults, and TOML persistence.

pub mod paths;
pub mod settings;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use paths::AppPaths;
pub use settings::{AppConfig, CameraConfig, OcrConfig, PipelineConfig};
