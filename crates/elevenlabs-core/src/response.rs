use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt, stream::BoxStream};
use reqwest::{StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;
use tokio_util::{
    io::StreamReader,
    sync::{CancellationToken, WaitForCancellationFutureOwned},
};

use crate::error::{ElevenLabsError, Result};

/// A 2xx response from the API
///
/// Non-2xx responses never reach this type; they are classified into an
/// [`ApiError`](crate::ApiError) by the transport. Reading the body keeps
/// honouring the cancellation token the request was sent with.
pub struct ApiResponse {
    inner: reqwest::Response,
    cancel: CancellationToken,
    timeout: Duration,
}

impl ApiResponse {
    pub(crate) const fn new(inner: reqwest::Response, cancel: CancellationToken, timeout: Duration) -> Self {
        Self { inner, cancel, timeout }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// `Content-Type` of the body, if present and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.inner
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Read the whole body, within the request timeout
    pub async fn bytes(self) -> Result<Bytes> {
        let Self { inner, cancel, timeout } = self;

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ElevenLabsError::Cancelled),
            read = tokio::time::timeout(timeout, inner.bytes()) => match read {
                Ok(body) => body.map_err(|e| ElevenLabsError::from_transport(e, timeout)),
                Err(_) => Err(ElevenLabsError::Timeout { after: timeout }),
            },
        }
    }

    /// Read the body and decode it as JSON
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!("failed to decode ElevenLabs response: {e}");
            ElevenLabsError::Decode(format!("{e}"))
        })
    }

    /// Hand the body over as a lazily consumed byte stream
    ///
    /// Chunks are yielded as they arrive from the network; nothing is
    /// buffered ahead of the consumer.
    pub fn into_stream(self) -> AudioStream {
        let content_type = self.content_type().map(str::to_owned);

        AudioStream {
            body: Some(self.inner.bytes_stream().boxed()),
            cancelled: Box::pin(self.cancel.cancelled_owned()),
            timeout: self.timeout,
            content_type,
        }
    }
}

impl fmt::Debug for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("status", &self.inner.status())
            .field("url", &self.inner.url().as_str())
            .finish_non_exhaustive()
    }
}

/// Audio returned by a download or streaming endpoint
///
/// Owns the underlying connection: dropping the stream at any point closes
/// it. Once the request's cancellation token fires the stream yields a
/// single [`ElevenLabsError::Cancelled`] and ends.
pub struct AudioStream {
    body: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    timeout: Duration,
    content_type: Option<String>,
}

impl AudioStream {
    /// `Content-Type` reported by the API (e.g. `audio/mpeg`)
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Collect the remaining audio into memory
    pub async fn into_bytes(mut self) -> Result<Bytes> {
        let mut audio = BytesMut::new();

        while let Some(chunk) = self.next().await {
            audio.extend_from_slice(&chunk?);
        }

        Ok(audio.freeze())
    }

    /// Adapt into an [`AsyncRead`] for use with `tokio::io::copy` and friends
    ///
    /// Errors surface as `std::io::Error` wrapping the [`ElevenLabsError`].
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.map_err(std::io::Error::other))
    }
}

impl Stream for AudioStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if this.body.is_none() {
            return Poll::Ready(None);
        }

        if this.cancelled.as_mut().poll(cx).is_ready() {
            this.body = None;
            return Poll::Ready(Some(Err(ElevenLabsError::Cancelled)));
        }

        let Some(body) = this.body.as_mut() else {
            return Poll::Ready(None);
        };

        let polled = body.as_mut().poll_next(cx);

        match polled {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(e))) => {
                this.body = None;
                Poll::Ready(Some(Err(ElevenLabsError::from_transport(e, this.timeout))))
            }
            Poll::Ready(None) => {
                this.body = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioStream")
            .field("content_type", &self.content_type)
            .field("finished", &self.body.is_none())
            .finish_non_exhaustive()
    }
}
