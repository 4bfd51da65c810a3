//! Byte-source trait for feed transports.

use bytes::Bytes;

use crate::Result;

/// Trait for ordered byte-chunk sources feeding the extractor.
///
/// Sources abstract over transports (live HTTP, canned replay) and own
/// their pacing internally. Chunk sizes are transport-determined and carry
/// no meaning; arrival order is the only guarantee the pipeline relies on.
#[async_trait::async_trait]
pub trait ByteSource: Send + 'static {
    /// Get the next chunk of feed bytes.
    ///
    /// Returns:
    /// - `Ok(Some(chunk))` - more bytes arrived
    /// - `Ok(None)` - the stream ended normally
    /// - `Err(e)` - transport failure; the session renders a terminal state
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}
