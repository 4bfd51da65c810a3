//! Raster surface and frame renderer.
//!
//! The surface is the single rendering target for decoded frames and the
//! read source for capture and record. It has fixed dimensions for the life
//! of a session; every decoded frame is scaled to fit and fully overwrites
//! the previous contents.
//!
//! Writer/reader discipline: the driver task is the only writer, capture
//! and the recording loop are readers, and every access happens inside a
//! short mutex critical section. A draw is therefore atomic with respect to
//! readers; nothing ever observes a partially drawn frame.

use std::sync::{Arc, Mutex};

use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{FeedError, Result};
use crate::types::StillFrame;

/// Fixed-size RGB pixel buffer shared between the renderer and readers.
#[derive(Debug)]
pub struct RasterSurface {
    pixels: RgbImage,
    frames_rendered: u64,
}

impl RasterSurface {
    /// Create a surface with the given fixed dimensions. Contents start
    /// black; [`has_frame`](Self::has_frame) is false until the first
    /// successful render.
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbImage::new(width, height), frames_rendered: 0 }
    }

    /// Surface dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether at least one frame has been successfully drawn.
    pub fn has_frame(&self) -> bool {
        self.frames_rendered > 0
    }

    /// Count of successfully drawn frames.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Copy out the current pixel contents, or `None` before the first
    /// render or when dimensions are zero.
    pub fn snapshot(&self) -> Option<RgbImage> {
        if !self.has_frame() || self.pixels.width() == 0 || self.pixels.height() == 0 {
            return None;
        }
        Some(self.pixels.clone())
    }

    fn draw(&mut self, pixels: RgbImage) {
        self.pixels = pixels;
        self.frames_rendered += 1;
    }
}

/// Draws extracted frames onto a shared [`RasterSurface`].
///
/// Decoding happens outside the surface lock; only the final overwrite
/// holds it. Malformed frames are dropped silently and the surface keeps
/// its last good contents.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    surface: Arc<Mutex<RasterSurface>>,
    cancel: CancellationToken,
}

impl FrameRenderer {
    /// Create a renderer targeting `surface`. The token is the session's
    /// liveness guard: a decode that completes after cancellation mutates
    /// nothing.
    pub fn new(surface: Arc<Mutex<RasterSurface>>, cancel: CancellationToken) -> Self {
        Self { surface, cancel }
    }

    /// Decode and draw one frame. Returns whether the surface was updated;
    /// decode failures and post-cancellation draws both return `false` and
    /// are never errors.
    pub fn render(&self, frame: &StillFrame) -> bool {
        let decoded = match decode_jpeg(frame) {
            Ok(img) => img,
            Err(err) => {
                debug!(frame_number = frame.frame_number, %err, "dropping undecodable frame");
                return false;
            }
        };

        let (width, height) = {
            let surface = self.surface.lock().expect("surface lock poisoned");
            surface.dimensions()
        };
        let scaled = if decoded.dimensions() == (width, height) {
            decoded
        } else {
            image::imageops::resize(&decoded, width, height, FilterType::Triangle)
        };

        // Liveness check directly before the mutation; a render landing
        // after teardown is discarded.
        if self.cancel.is_cancelled() {
            trace!(frame_number = frame.frame_number, "discarding render after teardown");
            return false;
        }

        let mut surface = self.surface.lock().expect("surface lock poisoned");
        surface.draw(scaled);
        trace!(frame_number = frame.frame_number, "frame drawn");
        true
    }
}

fn decode_jpeg(frame: &StillFrame) -> Result<RgbImage> {
    let dynamic = image::load_from_memory_with_format(&frame.data, ImageFormat::Jpeg)
        .map_err(|e| FeedError::frame_decode(e.to_string()))?;
    Ok(dynamic.to_rgb8())
}

/// Encode pixel contents as JPEG at the given quality.
pub(crate) fn encode_jpeg(pixels: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(pixels)
        .map_err(|e| FeedError::frame_decode(format!("jpeg encode: {e}")))?;
    Ok(out)
}

/// A real decodable JPEG frame for tests across the crate.
#[cfg(test)]
pub(crate) fn test_jpeg_frame(width: u32, height: u32, frame_number: u64) -> StillFrame {
    let mut pixels = RgbImage::new(width, height);
    for (x, y, px) in pixels.enumerate_pixels_mut() {
        *px = image::Rgb([(x * 7) as u8, (y * 13) as u8, 128]);
    }
    let data = encode_jpeg(&pixels, 85).expect("encode test jpeg");
    StillFrame::new(data, frame_number)
}
