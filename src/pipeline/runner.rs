//! Pipeline lifecycle — wiring and the start/stop surface.
//!
//! [`Pipeline`] owns everything between the frame source and the result
//! sink.  [`start`](Pipeline::start) builds the gate → processor plumbing
//! and attaches a [`FrameSource`]; [`stop`](Pipeline::stop) detaches the
//! source, closes the frame channel and waits for the processor to drain.
//!
//! ```text
//! FrameSource ──deliver──▶ BackpressureGate::offer
//!                               │ admitted (capacity-1 channel)
//!                               ▼
//!                      FrameProcessor::run  ← tokio task
//!                               │
//!                               ▼
//!                          ResultSink
//! ```
//!
//! Stopping is best-effort with respect to an in-flight cycle: `stop`
//! waits up to [`PipelineConfig::shutdown_grace_secs`] for the cycle to
//! finish, then aborts the processor task.  Either way the cycle guard
//! releases the frame and resets the state before `stop` returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::camera::{CaptureError, FrameHandler, FrameSource, SourceHandle};
use crate::config::PipelineConfig;
use crate::ocr::TextRecognizer;
use crate::pipeline::gate::BackpressureGate;
use crate::pipeline::metrics::PipelineMetrics;
use crate::pipeline::processor::FrameProcessor;
use crate::pipeline::state::{PipelineFlag, PipelineState, SharedFlag};
use crate::sink::ResultSink;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The assembled recognition pipeline.
///
/// Create with [`Pipeline::new`], then call [`start`](Self::start) with a
/// frame source.  Requires a tokio runtime (the processor runs as a
/// spawned task).
pub struct Pipeline {
    flag: SharedFlag,
    metrics: Arc<PipelineMetrics>,
    recognizer: Arc<dyn TextRecognizer>,
    sink: Arc<dyn ResultSink>,
    timeout: Option<Duration>,
    shutdown_grace: Duration,
    running: Option<Running>,
}

/// Live plumbing held between `start` and `stop`.
struct Running {
    gate: Arc<BackpressureGate>,
    source: SourceHandle,
    processor: JoinHandle<()>,
}

impl Pipeline {
    /// Create an idle pipeline.
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        sink: Arc<dyn ResultSink>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            flag: Arc::new(PipelineFlag::new()),
            metrics: Arc::new(PipelineMetrics::default()),
            recognizer,
            sink,
            timeout: config.recognition_timeout_secs.map(Duration::from_secs),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_secs),
            running: None,
        }
    }

    /// Attach `source` and begin accepting frames.
    ///
    /// Calling `start` while already running logs a warning and does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Propagates [`CaptureError`] when the source refuses to attach.
    pub fn start(&mut self, source: &mut dyn FrameSource) -> Result<(), CaptureError> {
        if self.running.is_some() {
            log::warn!("pipeline: start() called while already running");
            return Ok(());
        }

        let (tx, rx) = mpsc::channel(1);
        let gate = Arc::new(BackpressureGate::new(
            Arc::clone(&self.flag),
            tx,
            Arc::clone(&self.metrics),
        ));

        let processor = FrameProcessor::new(
            Arc::clone(&self.flag),
            Arc::clone(&self.recognizer),
            Arc::clone(&self.sink),
            self.timeout,
            Arc::clone(&self.metrics),
        );
        let task = tokio::spawn(processor.run(rx));

        let deliver: FrameHandler = {
            let gate = Arc::clone(&gate);
            Arc::new(move |frame| {
                gate.offer(frame);
            })
        };

        let handle = source.start(deliver)?;

        self.running = Some(Running {
            gate,
            source: handle,
            processor: task,
        });
        log::info!("pipeline: started");
        Ok(())
    }

    /// Detach the source and shut the pipeline down.
    ///
    /// Waits up to the configured shutdown grace for an in-flight cycle to
    /// finish, then aborts the processor task.  Dropping the cycle mid-flight
    /// still runs the cycle guard, so the frame is released and the state is
    /// reset before `stop` returns.  Calling `stop` while not running does
    /// nothing.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        // Detach the source, then drop our gate handle; once the delivery
        // closure inside the source task is gone too, the frame channel
        // closes and the processor drains out.
        drop(running.source);
        drop(running.gate);

        let mut processor = running.processor;
        match tokio::time::timeout(self.shutdown_grace, &mut processor).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if e.is_panic() {
                    log::error!("pipeline: processor task panicked during shutdown");
                }
            }
            Err(_) => {
                log::warn!(
                    "pipeline: in-flight recognition outlasted the {:?} shutdown grace, aborting",
                    self.shutdown_grace
                );
                processor.abort();
                // The abort tears the cycle down at its next await point;
                // wait for that so the frame release is observable.
                let _ = (&mut processor).await;
            }
        }
        log::info!("pipeline: stopped");
    }

    /// `true` between a successful [`start`](Self::start) and
    /// [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Current single-flight state.
    pub fn state(&self) -> PipelineState {
        self.flag.state()
    }

    /// Shared counters for drops, completions and failures.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::camera::TestPatternSource;
    use crate::config::CameraConfig;
    use crate::ocr::MockRecognizer;
    use crate::sink::RecordingSink;

    fn fast_camera() -> CameraConfig {
        CameraConfig {
            width: 4,
            height: 4,
            fps: 200,
            rotation_degrees: 0,
            buffer_count: 4,
        }
    }

    fn make_pipeline(
        recognizer: Arc<dyn TextRecognizer>,
        timeout: Option<u64>,
    ) -> (Pipeline, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let pipeline = Pipeline::new(
            recognizer,
            Arc::clone(&sink) as Arc<dyn ResultSink>,
            &PipelineConfig {
                recognition_timeout_secs: timeout,
                ..PipelineConfig::default()
            },
        );
        (pipeline, sink)
    }

    #[tokio::test]
    async fn end_to_end_recognitions_reach_the_sink() {
        let (mut pipeline, sink) = make_pipeline(Arc::new(MockRecognizer::ok("LIVE")), None);
        let mut source = TestPatternSource::new(&fast_camera());
        let pool = source.pool().clone();

        pipeline.start(&mut source).unwrap();
        assert!(pipeline.is_running());

        tokio::time::sleep(Duration::from_millis(150)).await;
        pipeline.stop().await;

        assert!(!pipeline.is_running());
        assert!(!sink.updates().is_empty());
        assert!(sink.updates().iter().all(|t| t == "LIVE"));

        // Shutdown leaves nothing leased and the state idle.
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let m = pipeline.metrics();
        assert!(m.offered() >= m.admitted());
        assert_eq!(m.admitted(), m.completed() + m.failed() + m.timed_out());
    }

    #[tokio::test]
    async fn stop_aborts_a_stalled_cycle_after_the_grace_period() {
        // An engine that never answers, no recognition timeout: without the
        // bounded grace, stop() would wait on the cycle forever.
        let recognizer = Arc::new(
            MockRecognizer::ok("NEVER").with_delay(Duration::from_secs(3600)),
        );
        let sink = Arc::new(RecordingSink::new());
        let mut pipeline = Pipeline::new(
            recognizer,
            Arc::clone(&sink) as Arc<dyn ResultSink>,
            &PipelineConfig {
                recognition_timeout_secs: None,
                shutdown_grace_secs: 0,
            },
        );
        let mut source = TestPatternSource::new(&fast_camera());
        let pool = source.pool().clone();

        pipeline.start(&mut source).unwrap();
        for _ in 0..200 {
            if pipeline.state().is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(pipeline.state().is_busy(), "no cycle ever started");

        pipeline.stop().await;

        // The aborted cycle still released its frame and reset the state.
        assert!(!pipeline.is_running());
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(sink.updates().is_empty());
    }

    #[tokio::test]
    async fn slow_engine_drops_frames_but_keeps_the_feed_alive() {
        let recognizer = Arc::new(
            MockRecognizer::ok("SLOW").with_delay(Duration::from_millis(120)),
        );
        let (mut pipeline, _sink) =
            make_pipeline(Arc::clone(&recognizer) as Arc<dyn TextRecognizer>, None);
        let mut source = TestPatternSource::new(&fast_camera());

        pipeline.start(&mut source).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        pipeline.stop().await;

        let m = pipeline.metrics();
        // The camera kept offering frames while recognition was outstanding;
        // the gate kept evaluating (and dropping) them.
        assert!(m.dropped() > 0, "expected drops, got {}", m.dropped());
        assert!(m.admitted() < m.offered());
        assert_eq!(source.pool().outstanding(), 0);
    }

    #[tokio::test]
    async fn double_start_is_a_no_op() {
        let (mut pipeline, _sink) = make_pipeline(Arc::new(MockRecognizer::ok("X")), None);
        let mut source = TestPatternSource::new(&fast_camera());
        let mut second = TestPatternSource::new(&fast_camera());

        pipeline.start(&mut source).unwrap();
        pipeline.start(&mut second).unwrap(); // warns, keeps first wiring

        // The second source was never attached, so it leases nothing.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(second.pool().outstanding(), 0);

        pipeline.stop().await;
    }

    #[tokio::test]
    async fn stop_without_start_is_harmless() {
        let (mut pipeline, _sink) = make_pipeline(Arc::new(MockRecognizer::ok("X")), None);
        pipeline.stop().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn pipeline_can_be_restarted_after_stop() {
        let (mut pipeline, sink) = make_pipeline(Arc::new(MockRecognizer::ok("AGAIN")), None);

        let mut source = TestPatternSource::new(&fast_camera());
        pipeline.start(&mut source).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        pipeline.stop().await;
        let after_first = sink.updates().len();
        assert!(after_first > 0);

        let mut source = TestPatternSource::new(&fast_camera());
        pipeline.start(&mut source).unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        pipeline.stop().await;

        assert!(sink.updates().len() > after_first);
    }

    #[tokio::test]
    async fn invalid_source_config_surfaces_from_start() {
        let (mut pipeline, _sink) = make_pipeline(Arc::new(MockRecognizer::ok("X")), None);
        let mut source = TestPatternSource::new(&CameraConfig {
            fps: 0,
            ..fast_camera()
        });

        let result = pipeline.start(&mut source);
        assert!(matches!(result, Err(CaptureError::InvalidConfig(_))));
        assert!(!pipeline.is_running());
    }
}
