use std::time::Duration;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::Level;

use heartbeat::{AppError, Configuration, HeartRateEngine, LumaFrame};

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

/// Synthetic camera: emits luminance frames whose ROI brightness follows a
/// noisy sinusoid at `bpm`, at `fps` frames per second. Stands in for the
/// platform camera layer, which owns device and session management.
async fn run_synthetic_camera(
    frames: tokio::sync::mpsc::Sender<LumaFrame>,
    fps: f32,
    bpm: f32,
) {
    // ThreadRng is not Send; a seeded StdRng can live across awaits.
    let mut rng = StdRng::from_os_rng();
    let period = Duration::from_secs_f32(1.0 / fps);
    let beat_hz = bpm / 60.0;
    let mut index: u64 = 0;
    loop {
        let t = index as f32 / fps;
        let noise: f32 = rng.random_range(-1.5..1.5);
        let luma = (128.0 + 24.0 * (std::f32::consts::TAU * beat_hz * t).sin() + noise)
            .clamp(0.0, 255.0) as u8;
        let frame = LumaFrame::from_packed(Bytes::from(vec![luma; 64 * 64]), 64, 64);
        if frames.send(frame).await.is_err() {
            break;
        }
        index += 1;
        tokio::time::sleep(period).await;
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let configuration = Configuration::load()?;
    let camera_fps = configuration.sampling_rate_hz * configuration.frame_skip as f32;

    let mut engine = HeartRateEngine::builder(configuration).build();
    let frames = engine.frame_sender();
    let estimates = engine.subscribe();
    engine.start()?;

    tracing::info!(camera_fps, "synthetic camera at 72 BPM");
    let camera = tokio::spawn(run_synthetic_camera(frames, camera_fps, 72.0));

    let mut estimates = BroadcastStream::new(estimates);
    let mut published = 0usize;
    while let Some(estimate) = estimates.next().await {
        let Ok(bpm) = estimate else { continue };
        tracing::info!(bpm, "tick");
        published += 1;
        if published >= 20 {
            break;
        }
    }

    engine.stop()?;
    camera.abort();
    tracing::info!(final_bpm = engine.current_estimate(), "done");
    Ok(())
}
