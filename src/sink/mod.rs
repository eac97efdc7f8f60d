//! Result sinks — where recognized text ends up.
//!
//! [`ResultSink`] is the fire-and-forget display seam: the processor calls
//! [`update`](ResultSink::update) at most once per completed cycle, and only
//! with non-blank text, so a sink never needs to filter flicker itself.
//!
//! [`TextPanel`] is the production sink: it stores the latest text behind a
//! mutex so a display loop can poll it, the same way a UI would redraw a
//! label from shared state.

use std::sync::Mutex;

// ---------------------------------------------------------------------------
// ResultSink
// ---------------------------------------------------------------------------

/// Receiver of display updates.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc<dyn ResultSink>` with the processor task.  `update` must not block
/// for long — it runs inline in the recognition-completion path.
pub trait ResultSink: Send + Sync {
    /// Accept one non-blank text update.  No acknowledgment, no retry.
    fn update(&self, text: &str);
}

// ---------------------------------------------------------------------------
// TextPanel
// ---------------------------------------------------------------------------

/// Latest-text holder for a display loop.
///
/// The processor overwrites the stored value on every update; readers poll
/// [`latest`](TextPanel::latest) and redraw when it changes.
///
/// # Example
///
/// ```rust
/// use scene_to_text::sink::{ResultSink, TextPanel};
///
/// let panel = TextPanel::new();
/// assert!(panel.latest().is_none());
///
/// panel.update("HELLO");
/// assert_eq!(panel.latest().as_deref(), Some("HELLO"));
/// ```
#[derive(Debug, Default)]
pub struct TextPanel {
    latest: Mutex<Option<String>>,
}

impl TextPanel {
    /// Create an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently displayed text, or `None` before the first update.
    pub fn latest(&self) -> Option<String> {
        self.latest.lock().unwrap().clone()
    }
}

impl ResultSink for TextPanel {
    fn update(&self, text: &str) {
        log::info!("display: {text}");
        *self.latest.lock().unwrap() = Some(text.to_string());
    }
}

// ---------------------------------------------------------------------------
// RecordingSink  (test-only)
// ---------------------------------------------------------------------------

/// Test double that records every update in arrival order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All updates received so far, oldest first.
    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ResultSink for RecordingSink {
    fn update(&self, text: &str) {
        self.updates.lock().unwrap().push(text.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn panel_starts_empty() {
        let panel = TextPanel::new();
        assert!(panel.latest().is_none());
    }

    #[test]
    fn panel_keeps_only_the_latest_text() {
        let panel = TextPanel::new();
        panel.update("first");
        panel.update("second");
        assert_eq!(panel.latest().as_deref(), Some("second"));
    }

    #[test]
    fn recording_sink_preserves_order() {
        let sink = RecordingSink::new();
        sink.update("a");
        sink.update("b");
        sink.update("c");
        assert_eq!(sink.updates(), vec!["a", "b", "c"]);
    }

    #[test]
    fn sinks_are_usable_as_trait_objects() {
        let sink: Arc<dyn ResultSink> = Arc::new(TextPanel::new());
        sink.update("via dyn");
    }
}
