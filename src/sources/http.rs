//! Live HTTP byte source.
//!
//! Opens the camera's stream endpoint as one long-lived response and
//! yields its body chunks. No request timeout is applied: a healthy feed
//! runs indefinitely and session teardown is the only termination path.

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, info};
use url::Url;

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::source::ByteSource;

/// Media type of an MJPEG feed response.
const STREAM_MEDIA_TYPE: &str = "multipart/x-mixed-replace";

/// Byte source backed by a streaming HTTP response.
pub struct HttpSource {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    url: Url,
}

impl HttpSource {
    /// Open the stream endpoint with the session credentials attached.
    ///
    /// Fails with [`FeedError::NotAuthenticated`] before any request when
    /// no credential is present, and [`FeedError::StreamUnavailable`] on a
    /// non-success status or transport error.
    pub async fn open(config: &FeedConfig, url: Url) -> Result<Self> {
        let credentials = config.credentials().ok_or(FeedError::NotAuthenticated)?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FeedError::stream_unavailable_with_source("http client", Box::new(e)))?;

        debug!(%url, "opening feed stream");
        let req = credentials
            .apply(client.get(url.clone()))
            .header("Accept", STREAM_MEDIA_TYPE);
        // No timeout: the feed is expected to run until teardown.
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::stream_unavailable(format!(
                "stream endpoint returned status {status}"
            )));
        }

        info!(%url, "feed stream open");
        Ok(Self { body: resp.bytes_stream().boxed(), url })
    }

    /// The resolved endpoint this source reads from.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait::async_trait]
impl ByteSource for HttpSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        match self.body.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(err)) => Err(FeedError::stream_unavailable_with_source(
                "feed transport failed mid-stream",
                Box::new(err),
            )),
            None => Ok(None),
        }
    }
}
