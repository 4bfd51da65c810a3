//! Driver spawns and manages the feed pump task.
//!
//! The task owns the byte source, the extractor, and the renderer: chunks
//! are processed strictly in arrival order, extracted frames are rendered
//! strictly in extraction order, and the render for frame *n+1* never
//! starts before frame *n*'s draw has completed. Rendered frames fan out
//! through a watch channel; lagging subscribers simply observe the latest.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::extractor::FrameExtractor;
use crate::source::ByteSource;
use crate::surface::FrameRenderer;
use crate::types::StillFrame;

/// Observable lifecycle of a feed session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Stream open, frames flowing (or about to).
    Live,
    /// Stream ended normally or the session was torn down.
    Ended,
    /// Stream-level failure; terminal, never retried automatically.
    Failed(String),
}

/// Result of spawning the driver task.
pub struct DriverChannels {
    /// Receiver for extracted frames. Carries `None` until the first frame;
    /// once the stream ends the sender is dropped, which closes the channel
    /// with the final frame still observable.
    pub frames: watch::Receiver<Option<Arc<StillFrame>>>,
    /// Receiver for session lifecycle changes.
    pub state: watch::Receiver<SessionState>,
}

/// Driver spawns and manages the feed pump task.
pub struct Driver;

impl Driver {
    /// Spawn the pump task for the given source.
    ///
    /// Returns watch receivers for frames and session state. The caller
    /// owns `cancel`; cancelling it tears the task down.
    pub fn spawn<S>(
        source: S,
        extractor: FrameExtractor,
        renderer: FrameRenderer,
        cancel: CancellationToken,
    ) -> DriverChannels
    where
        S: ByteSource,
    {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(SessionState::Live);

        tokio::spawn(async move {
            Self::pump_task(source, extractor, renderer, frame_tx, state_tx, cancel).await;
        });

        DriverChannels { frames: frame_rx, state: state_rx }
    }

    /// Pump task: read chunks, extract frames, render, publish.
    async fn pump_task<S>(
        mut source: S,
        mut extractor: FrameExtractor,
        renderer: FrameRenderer,
        frame_tx: watch::Sender<Option<Arc<StillFrame>>>,
        state_tx: watch::Sender<SessionState>,
        cancel: CancellationToken,
    ) where
        S: ByteSource,
    {
        info!("feed pump task started");
        let mut frame_count = 0u64;

        loop {
            // Allow cancellation during an in-flight chunk read.
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("feed pump cancelled during read");
                    let _ = state_tx.send(SessionState::Ended);
                    break;
                }
                result = source.next_chunk() => result,
            };

            match result {
                Ok(Some(chunk)) => {
                    trace!(len = chunk.len(), "chunk received");
                    for frame in extractor.consume(&chunk) {
                        if cancel.is_cancelled() {
                            debug!("discarding extracted frames after cancellation");
                            let _ = state_tx.send(SessionState::Ended);
                            return;
                        }

                        // Sequential render keeps frame order and makes
                        // each draw complete before the next begins.
                        renderer.render(&frame);
                        frame_count += 1;

                        if frame_tx.send(Some(Arc::new(frame))).is_err() {
                            debug!("frame receiver dropped, shutting down");
                            return;
                        }
                    }
                }
                Ok(None) => {
                    // No end sentinel on the frame channel: overwriting the
                    // watch value here would erase a final frame nobody has
                    // polled yet. Dropping the sender closes the channel
                    // with that frame still observable.
                    info!("feed ended after {} frames", frame_count);
                    let _ = state_tx.send(SessionState::Ended);
                    break;
                }
                Err(err) => {
                    // Terminal state; a retry needs a fresh session.
                    warn!(%err, "feed transport failed");
                    let _ = state_tx.send(SessionState::Failed(err.to_string()));
                    break;
                }
            }
        }

        info!("feed pump task ended ({} frames)", frame_count);
    }
}
