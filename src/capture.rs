//! Single-frame capture from the raster surface.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::error::{FeedError, Result};
use crate::surface::{RasterSurface, encode_jpeg};
use crate::types::Artifact;

const CAPTURE_JPEG_QUALITY: u8 = 90;

/// Snapshot the surface's current contents into one downloadable JPEG.
///
/// The read is synchronous: whatever frame is on the surface at call time
/// is what ends up in the artifact. Fails with
/// [`FeedError::NoFrameAvailable`] before the first successful render;
/// callers surface that as a transient notice, not a failure state.
pub fn capture(surface: &Mutex<RasterSurface>, cam_key: &str) -> Result<Artifact> {
    capture_with_timestamp(surface, cam_key, unix_now())
}

/// [`capture`] with an explicit timestamp for deterministic file names.
pub fn capture_with_timestamp(
    surface: &Mutex<RasterSurface>,
    cam_key: &str,
    unix_ts: u64,
) -> Result<Artifact> {
    let pixels = {
        let surface = surface.lock().expect("surface lock poisoned");
        surface.snapshot().ok_or(FeedError::NoFrameAvailable)?
    };

    let jpeg = encode_jpeg(&pixels, CAPTURE_JPEG_QUALITY)?;
    let artifact = Artifact::new(Artifact::capture_filename(cam_key, unix_ts), jpeg);
    info!(cam_key, filename = %artifact.filename, bytes = artifact.data.len(), "frame captured");
    Ok(artifact)
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{FrameRenderer, test_jpeg_frame};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn capture_before_any_render_fails_with_no_frame() {
        let surface = Mutex::new(RasterSurface::new(32, 24));
        let err = capture(&surface, "front-door").unwrap_err();
        assert!(matches!(err, FeedError::NoFrameAvailable));
        assert!(err.is_transient());
    }

    #[test]
    fn capture_after_one_render_returns_a_jpeg_artifact() {
        let surface = Arc::new(Mutex::new(RasterSurface::new(32, 24)));
        let renderer = FrameRenderer::new(Arc::clone(&surface), CancellationToken::new());
        assert!(renderer.render(&test_jpeg_frame(32, 24, 0)));

        let artifact = capture_with_timestamp(&surface, "front-door", 1717171717).unwrap();
        assert_eq!(artifact.filename, "capture-front-door-1717171717.jpg");
        assert!(!artifact.data.is_empty());
        // JPEG magic bytes.
        assert_eq!(&artifact.data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn zero_dimension_surface_never_captures() {
        let surface = Mutex::new(RasterSurface::new(0, 0));
        let err = capture(&surface, "cam").unwrap_err();
        assert!(matches!(err, FeedError::NoFrameAvailable));
    }
}
