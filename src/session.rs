//! Stream session controller.
//!
//! One [`StreamSession`] owns everything for one camera's live view: the
//! network connection, the extractor/renderer pipeline (via the driver
//! task), the raster surface, and the capture/record units. Opening runs
//! the gate sequence (credential check, directory lookup, endpoint
//! resolution) before any byte flows; teardown cancels unconditionally
//! and leaves no background work running.

use std::sync::{Arc, Mutex};

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::directory::{Camera, CameraDirectory};
use crate::driver::{Driver, DriverChannels, SessionState};
use crate::error::{FeedError, Result};
use crate::extractor::FrameExtractor;
use crate::record::Recorder;
use crate::source::ByteSource;
use crate::sources::{HttpSource, ReplaySource};
use crate::stream::ThrottleExt;
use crate::surface::{FrameRenderer, RasterSurface};
use crate::types::{Artifact, SampleRate, StillFrame};
use crate::{capture, extractor};

/// Fixed display dimensions of a session's raster surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self { width: 640, height: 480 }
    }
}

/// A live (or replayed) viewing session for one camera.
#[derive(Debug)]
pub struct StreamSession {
    camera: Camera,
    surface: Arc<Mutex<RasterSurface>>,
    frames: watch::Receiver<Option<Arc<StillFrame>>>,
    state: watch::Receiver<SessionState>,
    recorder: Recorder,
    cancel: CancellationToken,
}

impl StreamSession {
    /// Open a live session against the camera's resolved stream endpoint.
    ///
    /// Gate sequence, in order and all before any network traffic:
    /// 1. a session credential must exist (`NotAuthenticated` otherwise);
    /// 2. the camera must be in the local directory (`CameraNotFound`
    ///    otherwise; a miss never triggers a request);
    /// 3. the endpoint comes from the config's resolver.
    pub async fn open(
        config: &FeedConfig,
        directory: &CameraDirectory,
        cam_key: &str,
        size: SurfaceSize,
    ) -> Result<Self> {
        if config.credentials().is_none() {
            return Err(FeedError::NotAuthenticated);
        }
        let camera = directory.require(cam_key)?.clone();
        let url = config.stream_url(&camera.cam_key)?;
        let source = HttpSource::open(config, url).await?;

        info!(cam_key, name = %camera.name, "live session opening");
        Ok(Self::start(camera, source, size))
    }

    /// Open a session over canned bytes instead of the network.
    ///
    /// Behaves identically to a live session from the extractor onward;
    /// used by tests and offline tooling.
    pub fn replay(camera: Camera, source: ReplaySource, size: SurfaceSize) -> Self {
        info!(cam_key = %camera.cam_key, "replay session opening");
        Self::start(camera, source, size)
    }

    fn start<S: ByteSource>(camera: Camera, source: S, size: SurfaceSize) -> Self {
        let surface = Arc::new(Mutex::new(RasterSurface::new(size.width, size.height)));
        let cancel = CancellationToken::new();

        let renderer = FrameRenderer::new(Arc::clone(&surface), cancel.clone());
        let extractor = FrameExtractor::new(extractor::DEFAULT_MAX_BUFFER);
        let DriverChannels { frames, state } =
            Driver::spawn(source, extractor, renderer, cancel.clone());

        let recorder = Recorder::new(camera.cam_key.clone(), Arc::clone(&surface), cancel.clone());

        Self { camera, surface, frames, state, recorder, cancel }
    }

    /// The camera this session is viewing.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Subscribe to rendered frames.
    ///
    /// The stream yields frames in extraction order and ends when the feed
    /// ends, fails, or the session is torn down. The channel carries `None`
    /// only before the first frame; it closes with the final frame still
    /// observable, so a subscriber never misses the last frame of a feed.
    pub fn frames(&self) -> impl Stream<Item = Arc<StillFrame>> + 'static {
        WatchStream::new(self.frames.clone()).filter_map(|opt| opt)
    }

    /// Subscribe to rendered frames, paced down to `rate` for display.
    ///
    /// When frames arrive faster than the rate, only the newest in each
    /// tick is yielded.
    pub fn frames_paced(&self, rate: SampleRate) -> impl Stream<Item = Arc<StillFrame>> + 'static {
        self.frames().paced(rate)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch lifecycle changes (Live → Ended/Failed).
    pub fn state_changes(&self) -> impl Stream<Item = SessionState> + 'static {
        WatchStream::new(self.state.clone())
    }

    /// Count of frames drawn to the surface so far.
    pub fn frames_rendered(&self) -> u64 {
        self.surface.lock().expect("surface lock poisoned").frames_rendered()
    }

    /// Save the surface's current contents as a one-shot JPEG artifact.
    ///
    /// Fails with a transient `NoFrameAvailable` until the first frame has
    /// rendered.
    pub fn capture(&self) -> Result<Artifact> {
        capture::capture(&self.surface, &self.camera.cam_key)
    }

    /// Begin recording the surface at `rate`. Idempotent while recording.
    pub fn start_recording(&self, rate: SampleRate) -> Result<()> {
        self.recorder.start(rate)
    }

    /// Stop recording and collect the video artifact, if one was active.
    pub async fn stop_recording(&self) -> Option<Artifact> {
        self.recorder.stop().await
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Tear the session down: cancel the stream read, stop any active
    /// recording, and discard buffers. Safe to call more than once; no
    /// render, capture, or sampling mutation happens afterward.
    pub async fn shutdown(&self) {
        debug!(cam_key = %self.camera.cam_key, "session teardown");
        self.cancel.cancel();
        // Drain the sampling task; its artifact is discarded on teardown.
        let _ = self.recorder.stop().await;
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        debug!(cam_key = %self.camera.cam_key, "dropping session");
        // Cancel tasks on drop for clean shutdown.
        self.cancel.cancel();
    }
}
