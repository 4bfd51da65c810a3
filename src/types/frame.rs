//! Still-frame type for the stream-based architecture.

use bytes::Bytes;

/// One complete JPEG still image extracted from the feed.
///
/// The byte range is inclusive of both the start marker (`FF D8`) and the
/// end marker (`FF D9`). Frames are emitted in end-marker order and are
/// consumed immediately by the renderer; nothing retains them afterward.
#[derive(Debug, Clone)]
pub struct StillFrame {
    /// JPEG-encoded image data, markers included (zero-copy via `Bytes`).
    pub data: Bytes,

    /// Monotonic frame counter, assigned at extraction time.
    pub frame_number: u64,
}

impl StillFrame {
    /// Create a new still frame.
    pub fn new(data: impl Into<Bytes>, frame_number: u64) -> Self {
        Self { data: data.into(), frame_number }
    }

    /// Length of the encoded image in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame carries no bytes. Never true for extracted frames,
    /// which always contain at least both markers.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
