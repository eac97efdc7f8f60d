//! Application entry point — scene-to-text.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the remote OCR engine ([`RemoteRecognizer`]) from config.
//! 4. Build the display sink ([`TextPanel`]).
//! 5. Start the [`Pipeline`] on a [`TestPatternSource`] (hardware capture
//!    lives outside this crate; any `FrameSource` can be plugged in).
//! 6. Poll the panel and print the latest text whenever it changes.
//! 7. Stop cleanly on Ctrl-C and log the pipeline counters.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use scene_to_text::{
    camera::TestPatternSource,
    config::AppConfig,
    ocr::{RemoteRecognizer, TextRecognizer},
    pipeline::Pipeline,
    sink::{ResultSink, TextPanel},
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    if AppConfig::is_first_run() {
        config.save()?;
        log::info!("wrote default settings.toml");
    }
    log::info!(
        "capture {}x{} @ {} fps, OCR endpoint {}",
        config.camera.width,
        config.camera.height,
        config.camera.fps,
        config.ocr.base_url
    );

    let recognizer: Arc<dyn TextRecognizer> =
        Arc::new(RemoteRecognizer::from_config(&config.ocr));
    let panel = Arc::new(TextPanel::new());

    let mut pipeline = Pipeline::new(
        recognizer,
        Arc::clone(&panel) as Arc<dyn ResultSink>,
        &config.pipeline,
    );
    let mut source = TestPatternSource::new(&config.camera);
    pipeline.start(&mut source)?;

    // Redraw loop: print the latest text whenever it changes.
    let display = {
        let panel = Arc::clone(&panel);
        tokio::spawn(async move {
            let mut shown: Option<String> = None;
            let mut ticker = tokio::time::interval(Duration::from_millis(250));
            loop {
                ticker.tick().await;
                let latest = panel.latest();
                if latest != shown {
                    if let Some(text) = &latest {
                        println!("{text}");
                    }
                    shown = latest;
                }
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");

    display.abort();
    pipeline.stop().await;

    let m = pipeline.metrics();
    log::info!(
        "frames: {} offered, {} admitted, {} dropped, {} unusable; cycles: {} completed, {} failed, {} timed out",
        m.offered(),
        m.admitted(),
        m.dropped(),
        m.unusable(),
        m.completed(),
        m.failed(),
        m.timed_out()
    );

    Ok(())
}
