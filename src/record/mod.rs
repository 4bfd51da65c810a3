//! Recording of rendered frames into a downloadable video artifact.
//!
//! The recorder is a two-state machine: Idle and Recording. `start` while
//! Recording and `stop` while Idle are both no-ops, so callers never have
//! to track state themselves. The sampling loop runs as a spawned task
//! guarded by a child of the session's cancellation token: session
//! teardown stops it even if nobody calls `stop` explicitly.

mod avi;

pub use avi::AviEncoder;

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};
use crate::surface::{RasterSurface, encode_jpeg};
use crate::types::{Artifact, SampleRate};

const RECORD_JPEG_QUALITY: u8 = 80;

/// One in-flight recording: the sampling loop plus its stop handle.
/// Exists only between `start` and `stop`.
#[derive(Debug)]
struct RecordingSession {
    cancel: CancellationToken,
    sampler: JoinHandle<AviEncoder>,
}

/// Samples the raster surface into a live media encoder on demand.
#[derive(Debug)]
pub struct Recorder {
    cam_key: String,
    surface: Arc<Mutex<RasterSurface>>,
    session_cancel: CancellationToken,
    active: Mutex<Option<RecordingSession>>,
}

impl Recorder {
    /// Create an idle recorder bound to a session's surface and
    /// cancellation token.
    pub fn new(
        cam_key: impl Into<String>,
        surface: Arc<Mutex<RasterSurface>>,
        session_cancel: CancellationToken,
    ) -> Self {
        Self {
            cam_key: cam_key.into(),
            surface,
            session_cancel,
            active: Mutex::new(None),
        }
    }

    /// Whether a recording is currently active.
    pub fn is_recording(&self) -> bool {
        self.active.lock().expect("recorder lock poisoned").is_some()
    }

    /// Begin sampling the surface at `rate`.
    ///
    /// Idempotent: calling `start` while already recording is a no-op.
    /// Fails with [`FeedError::NoFrameAvailable`] before the first rendered
    /// frame and [`FeedError::RecorderUnavailable`] when the encoder cannot
    /// be constructed; both leave the recorder Idle.
    pub fn start(&self, rate: SampleRate) -> Result<()> {
        let mut active = self.active.lock().expect("recorder lock poisoned");
        if active.is_some() {
            debug!(cam_key = %self.cam_key, "start ignored, already recording");
            return Ok(());
        }

        let (width, height) = {
            let surface = self.surface.lock().expect("surface lock poisoned");
            if !surface.has_frame() {
                return Err(FeedError::NoFrameAvailable);
            }
            surface.dimensions()
        };

        let encoder = AviEncoder::new(width, height, rate.hz())?;
        let cancel = self.session_cancel.child_token();
        let sampler = tokio::spawn(sampling_loop(
            Arc::clone(&self.surface),
            encoder,
            rate,
            cancel.clone(),
        ));

        info!(cam_key = %self.cam_key, hz = rate.hz(), "recording started");
        *active = Some(RecordingSession { cancel, sampler });
        Ok(())
    }

    /// Stop the sampling loop and finalize the artifact.
    ///
    /// Always safe: returns `None` when Idle (including repeated calls and
    /// during session teardown). After `stop` returns, no further loop
    /// iteration executes.
    pub async fn stop(&self) -> Option<Artifact> {
        let session = self.active.lock().expect("recorder lock poisoned").take()?;
        session.cancel.cancel();

        let encoder = match session.sampler.await {
            Ok(encoder) => encoder,
            Err(err) => {
                warn!(cam_key = %self.cam_key, %err, "sampling task failed");
                return None;
            }
        };

        let samples = encoder.sample_count();
        let artifact =
            Artifact::new(Artifact::video_filename(&self.cam_key, unix_now()), encoder.finish());
        info!(
            cam_key = %self.cam_key,
            samples,
            bytes = artifact.data.len(),
            filename = %artifact.filename,
            "recording finished"
        );
        Some(artifact)
    }
}

/// Pushes one surface snapshot per tick into the encoder until cancelled.
///
/// The first sample lands one full interval after `start`; the loop checks
/// its token before every sample, so no iteration runs after `stop`.
async fn sampling_loop(
    surface: Arc<Mutex<RasterSurface>>,
    mut encoder: AviEncoder,
    rate: SampleRate,
    cancel: CancellationToken,
) -> AviEncoder {
    let period = rate.interval();
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    break;
                }
                let snapshot = {
                    let surface = surface.lock().expect("surface lock poisoned");
                    surface.snapshot()
                };
                if let Some(pixels) = snapshot {
                    match encode_jpeg(&pixels, RECORD_JPEG_QUALITY) {
                        Ok(jpeg) => encoder.push_sample(Bytes::from(jpeg)),
                        Err(err) => debug!(%err, "skipping unencodable sample"),
                    }
                }
            }
        }
    }

    debug!(samples = encoder.sample_count(), "sampling loop ended");
    encoder
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
