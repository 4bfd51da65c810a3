//! Error types for the feed pipeline.
//!
//! Errors fall into two tiers, mirroring how they are surfaced:
//!
//! - **Session-level** errors (`NotAuthenticated`, `CameraNotFound`,
//!   `StreamUnavailable`) are terminal: the session renders one error state
//!   and the operator re-navigates to retry. Nothing is retried
//!   automatically.
//! - **Transient** errors (`NoFrameAvailable`, `RecorderUnavailable`) are
//!   surfaced as self-clearing notices; the session keeps running.
//!
//! Frame decode failures are recovered silently inside the renderer and
//! never reach the public API; the `FrameDecode` variant exists only for
//! internal propagation between the decoder and the render step.

use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T, E = FeedError> = std::result::Result<T, E>;

/// Main error type for feed operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FeedError {
    #[error("no session credential present; log in before opening a stream")]
    NotAuthenticated,

    #[error("camera '{cam_key}' not found in the local directory")]
    CameraNotFound { cam_key: String },

    #[error("stream unavailable: {reason}")]
    StreamUnavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("frame decode failed: {details}")]
    FrameDecode { details: String },

    #[error("no frame has been rendered yet")]
    NoFrameAvailable,

    #[error("recorder unavailable: {reason}")]
    RecorderUnavailable { reason: String },

    #[error("directory file error: {context}")]
    Directory {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FeedError {
    /// Returns whether this error ends the session.
    ///
    /// Terminal errors are rendered once as a final state; the caller must
    /// open a new session to retry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FeedError::NotAuthenticated
                | FeedError::CameraNotFound { .. }
                | FeedError::StreamUnavailable { .. }
                | FeedError::Directory { .. }
        )
    }

    /// Returns whether this error should be surfaced as a transient,
    /// self-clearing notice rather than a failure state.
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::NoFrameAvailable | FeedError::RecorderUnavailable { .. })
    }

    /// Helper constructor for stream failures.
    pub fn stream_unavailable(reason: impl Into<String>) -> Self {
        FeedError::StreamUnavailable { reason: reason.into(), source: None }
    }

    /// Helper constructor for stream failures with an underlying cause.
    pub fn stream_unavailable_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        FeedError::StreamUnavailable { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for camera lookup misses.
    pub fn camera_not_found(cam_key: impl Into<String>) -> Self {
        FeedError::CameraNotFound { cam_key: cam_key.into() }
    }

    /// Helper constructor for recorder construction failures.
    pub fn recorder_unavailable(reason: impl Into<String>) -> Self {
        FeedError::RecorderUnavailable { reason: reason.into() }
    }

    /// Helper constructor for decode failures (internal use).
    pub fn frame_decode(details: impl Into<String>) -> Self {
        FeedError::FrameDecode { details: details.into() }
    }

    /// Helper constructor for directory file errors.
    pub fn directory(
        context: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        FeedError::Directory { context: context.into(), source: Some(source) }
    }
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Directory { context: "I/O error".to_string(), source: Some(Box::new(err)) }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::StreamUnavailable { reason: err.to_string(), source: Some(Box::new(err)) }
    }
}
