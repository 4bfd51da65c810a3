//! Display pacing for frame streams.
//!
//! A feed can deliver frames faster than a consumer wants to repaint.
//! Pacing a stream to a [`SampleRate`] with latest-wins semantics keeps
//! the picture current: when several frames land inside one tick, only
//! the newest survives and the rest are dropped.

use crate::types::SampleRate;
use futures::stream::Fuse;
use futures::{Stream, StreamExt, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to add latest-wins pacing to any stream.
pub trait ThrottleExt: Stream {
    /// Emit at most one item per `duration`, keeping the latest.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }

    /// Emit at most one item per tick of `rate`, keeping the latest.
    fn paced(self, rate: SampleRate) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, rate.interval())
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Stream combinator that limits emission rate, latest item wins.
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: Fuse<S>,
        interval: Interval,
        pending: Option<S::Item>,
    }
}

impl<S: Stream> Throttle<S> {
    /// Create a paced stream emitting at most once per `duration`.
    pub fn new(stream: S, duration: Duration) -> Self {
        let mut interval = interval(duration);
        // Delay missed ticks rather than bursting to catch up.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream: stream.fuse(), interval, pending: None }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        ready!(this.interval.poll_tick(cx));

        // Drain whatever queued up during the tick, keeping the newest.
        loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    *this.pending = Some(item);
                }
                Poll::Ready(None) => {
                    return Poll::Ready(this.pending.take());
                }
                Poll::Pending => {
                    // An empty tick on a still-live stream must not end it;
                    // the inner stream has registered the waker, so stay
                    // pending until something arrives.
                    return match this.pending.take() {
                        Some(item) => Poll::Ready(Some(item)),
                        None => Poll::Pending,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn burst_collapses_to_latest() {
        let burst = futures::stream::iter(vec![1u32, 2, 3, 4, 5]);
        let mut paced = burst.throttle(Duration::from_millis(5));

        // All five are available on the first tick; only the newest
        // survives the drain.
        assert_eq!(paced.next().await, Some(5));
        assert_eq!(paced.next().await, None);
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        let empty = futures::stream::iter(Vec::<u32>::new());
        let mut paced = empty.throttle(Duration::from_millis(1));
        assert_eq!(paced.next().await, None);
    }

    #[tokio::test]
    async fn empty_ticks_do_not_end_a_live_stream() {
        // Items arrive slower than the pacing interval, so several ticks
        // fire with nothing buffered before each item.
        let sparse = futures::stream::unfold(0u32, |n| async move {
            if n >= 2 {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(30)).await;
            Some((n, n + 1))
        });

        let paced: Vec<_> = sparse.throttle(Duration::from_millis(5)).collect().await;
        assert_eq!(paced, vec![0, 1]);
    }

    #[tokio::test]
    async fn paced_uses_sample_rate_interval() {
        let frames = futures::stream::iter(vec![10u32, 20]);
        let mut paced = frames.paced(SampleRate::Fixed(1000));
        assert_eq!(paced.next().await, Some(20));
        assert_eq!(paced.next().await, None);
    }
}
