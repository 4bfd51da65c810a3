//! Downloadable artifacts produced by capture and record.

use bytes::Bytes;
use std::path::Path;

/// A one-shot downloadable file: a captured still or a finished recording.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Deterministic file name, e.g. `capture-front-door-1717171717.jpg`
    /// or `video-front-door-1717171717.avi`.
    pub filename: String,

    /// Encoded file contents.
    pub data: Bytes,
}

impl Artifact {
    /// Create a new artifact.
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { filename: filename.into(), data: data.into() }
    }

    /// Build the capture file name for a camera at a given unix timestamp.
    pub fn capture_filename(cam_key: &str, unix_ts: u64) -> String {
        format!("capture-{cam_key}-{unix_ts}.jpg")
    }

    /// Build the video file name for a camera at a given unix timestamp.
    pub fn video_filename(cam_key: &str, unix_ts: u64) -> String {
        format!("video-{cam_key}-{unix_ts}.avi")
    }

    /// Write the artifact into `dir` under its own file name.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<std::path::PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.data)?;
        Ok(path)
    }
}
