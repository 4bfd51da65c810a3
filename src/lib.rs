//! Async MJPEG camera feed client with capture and recording.
//!
//! Camfeed demultiplexes multipart MJPEG streams into individual JPEG
//! frames, renders them to an in-memory raster surface, and exposes
//! still capture and clip recording on top of a live session.
//!
//! # Features
//!
//! - **Live Streaming**: Authenticated HTTP feeds, frame delivery over
//!   watch channels
//! - **Robust Demuxing**: Marker scanning that survives arbitrary chunk
//!   boundaries and garbage between frames
//! - **Capture & Record**: Single-frame JPEG snapshots and MJPEG-in-AVI
//!   clip recording from the rendered surface
//! - **Replay**: Canned byte sources that behave identically to live
//!   feeds, for tests and offline tooling
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use camfeed::{Camfeed, CameraDirectory, FeedConfig, SurfaceSize};
//! use futures::StreamExt;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> camfeed::Result<()> {
//!     let config = FeedConfig::new(
//!         Url::parse("https://cams.example.net/api/").unwrap(),
//!         "service-key",
//!     )
//!     .with_token("session-token");
//!     let directory = CameraDirectory::load("cameras.yaml")?;
//!
//!     let session =
//!         Camfeed::connect(&config, &directory, "front-door", SurfaceSize::default()).await?;
//!
//!     let mut frames = session.frames();
//!     while let Some(frame) = frames.next().await {
//!         println!("frame {} ({} bytes)", frame.frame_number, frame.len());
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Feed pipeline
pub mod driver;
pub mod extractor;
pub mod session;
pub mod source;
pub mod sources;
pub mod stream;
pub mod surface;

// Capture and recording
pub mod capture;
pub mod record;

// Configuration and camera directory
pub mod config;
pub mod directory;

// Out-of-band notifications
pub mod events;

// Core exports
pub use error::*;
pub use types::*;

pub use config::{Credentials, FeedConfig};
pub use directory::{Camera, CameraDirectory};
pub use driver::SessionState;
pub use events::{Notification, NotificationHub, Subscription};
pub use extractor::FrameExtractor;
pub use record::Recorder;
pub use session::{StreamSession, SurfaceSize};
pub use source::ByteSource;
pub use sources::{HttpSource, ReplaySource};
pub use stream::{Throttle, ThrottleExt};
pub use surface::{FrameRenderer, RasterSurface};

/// Unified entry point for camera feed sessions.
///
/// This factory provides a consistent API for opening sessions against
/// both live HTTP feeds and canned replay bytes.
///
/// # Examples
///
/// ## Live feed
/// ```rust,no_run
/// use camfeed::{Camfeed, CameraDirectory, FeedConfig, SurfaceSize};
/// use url::Url;
///
/// #[tokio::main]
/// async fn main() -> camfeed::Result<()> {
///     let config = FeedConfig::new(
///         Url::parse("https://cams.example.net/api/").unwrap(),
///         "service-key",
///     )
///     .with_token("session-token");
///     let directory = CameraDirectory::load("cameras.yaml")?;
///     let session =
///         Camfeed::connect(&config, &directory, "front-door", SurfaceSize::default()).await?;
///     // Use session...
///     Ok(())
/// }
/// ```
///
/// ## Replay
/// ```rust,no_run
/// use camfeed::{Camera, Camfeed, ReplaySource, SurfaceSize};
///
/// #[tokio::main]
/// async fn main() -> camfeed::Result<()> {
///     let camera = Camera { id: 1, name: "Front door".into(), cam_key: "front-door".into() };
///     let source = ReplaySource::new(std::fs::read("feed.mjpeg")?, 4096);
///     let session = Camfeed::replay(camera, source, SurfaceSize::default());
///     // Use session...
///     Ok(())
/// }
/// ```
pub struct Camfeed;

impl Camfeed {
    /// Open a live session for a camera in the directory.
    ///
    /// Resolves the camera through the local directory, builds the stream
    /// endpoint from the config, and opens the feed with the configured
    /// credentials attached.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session token is configured (`NotAuthenticated`)
    /// - The camera key is not in the directory (`CameraNotFound`)
    /// - The endpoint refuses or drops the connection (`StreamUnavailable`)
    pub async fn connect(
        config: &FeedConfig,
        directory: &CameraDirectory,
        cam_key: &str,
        size: SurfaceSize,
    ) -> Result<StreamSession> {
        StreamSession::open(config, directory, cam_key, size).await
    }

    /// Open a session over canned bytes instead of the network.
    ///
    /// The session behaves identically to a live one from the extractor
    /// onward: frames flow, capture and recording work, teardown is the
    /// same.
    pub fn replay(camera: Camera, source: ReplaySource, size: SurfaceSize) -> StreamSession {
        StreamSession::replay(camera, source, size)
    }
}
