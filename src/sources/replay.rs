//! Replay byte source for canned feed bytes.
//!
//! Replays a pre-recorded byte stream in fixed-size chunks, optionally
//! paced to simulate live arrival. Used by tests and offline tooling; the
//! pipeline behaves identically to a live source.

use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

use crate::Result;
use crate::source::ByteSource;

/// Byte source that replays an in-memory byte stream.
pub struct ReplaySource {
    data: Bytes,
    pos: usize,
    chunk_size: usize,
    pacing: Option<Duration>,
}

impl ReplaySource {
    /// Replay `data` in chunks of `chunk_size` bytes, as fast as the
    /// consumer pulls them.
    pub fn new(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self { data: data.into(), pos: 0, chunk_size: chunk_size.max(1), pacing: None }
    }

    /// Delay each chunk by `interval` to simulate live arrival.
    pub fn with_pacing(mut self, interval: Duration) -> Self {
        self.pacing = Some(interval);
        self
    }

    /// Bytes remaining to be replayed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

#[async_trait::async_trait]
impl ByteSource for ReplaySource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.pos >= self.data.len() {
            debug!("replay source exhausted");
            return Ok(None);
        }

        if let Some(interval) = self.pacing {
            tokio::time::sleep(interval).await;
        }

        let end = (self.pos + self.chunk_size).min(self.data.len());
        let chunk = self.data.slice(self.pos..end);
        self.pos = end;
        Ok(Some(chunk))
    }
}
