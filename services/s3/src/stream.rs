// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, StatusCode};
use log::debug;
use s3lean_core::HttpBody;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// ResponseStream is the body of a downloaded object.
///
/// It owns the response the body comes from, so the connection stays
/// reserved for exactly as long as the stream is alive. [`close`](Self::close)
/// and `Drop` both release it, whichever comes first.
///
/// Read it as a [`Stream`] of chunks or through [`AsyncRead`]. Network bodies
/// are forward only, seeking is not supported.
pub struct ResponseStream {
    status: StatusCode,
    headers: HeaderMap,
    content_length: Option<u64>,
    body: Option<HttpBody>,
    // Unread rest of the last chunk, for `AsyncRead`.
    chunk: Bytes,
}

impl ResponseStream {
    pub(crate) fn new(resp: http::Response<HttpBody>) -> Self {
        let (parts, body) = resp.into_parts();
        let content_length = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .or_else(|| body.known_len());

        Self {
            status: parts.status,
            headers: parts.headers,
            content_length,
            body: Some(body),
            chunk: Bytes::new(),
        }
    }

    /// Length of the object, from `Content-Length` if present.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Release the body and its connection. Reads after close see the end of
    /// the stream.
    pub fn close(&mut self) {
        if let Some(body) = self.body.take() {
            debug!("response stream closed");
            self.chunk = Bytes::new();
            drop(body);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.body.is_none()
    }
}

impl Stream for ResponseStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if !this.chunk.is_empty() {
            return Poll::Ready(Some(Ok(std::mem::take(&mut this.chunk))));
        }
        match this.body.as_mut() {
            Some(body) => body.poll_next_unpin(cx),
            None => Poll::Ready(None),
        }
    }
}

impl AsyncRead for ResponseStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            if !this.chunk.is_empty() {
                let n = buf.remaining().min(this.chunk.len());
                buf.put_slice(&this.chunk.split_to(n));
                return Poll::Ready(Ok(()));
            }

            let Some(body) = this.body.as_mut() else {
                return Poll::Ready(Ok(()));
            };
            match ready!(body.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => this.chunk = chunk,
                Some(Err(err)) => return Poll::Ready(Err(err)),
                None => return Poll::Ready(Ok(())),
            }
        }
    }
}

impl std::fmt::Debug for ResponseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseStream")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::DropCounter;
    use futures::stream;
    use futures::TryStreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    fn response(
        chunks: &[&'static [u8]],
        len: Option<u64>,
        drops: &Arc<AtomicUsize>,
    ) -> http::Response<HttpBody> {
        let guard = DropCounter(drops.clone());
        let chunks: Vec<io::Result<Bytes>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
        let stream = stream::iter(chunks).map(move |c| {
            let _ = &guard;
            c
        });
        http::Response::new(HttpBody::new(stream, len))
    }

    #[tokio::test]
    async fn test_read_to_end() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut resp = response(&[b"hello ", b"world"], None, &drops);
        resp.headers_mut()
            .insert(CONTENT_LENGTH, "11".parse().unwrap());

        let mut stream = ResponseStream::new(resp);
        assert_eq!(stream.content_length(), Some(11));

        let mut content = Vec::new();
        stream.read_to_end(&mut content).await.unwrap();
        assert_eq!(content, b"hello world");

        // Reaching the end does not release the response.
        assert!(!stream.is_closed());
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        stream.close();
        assert!(stream.is_closed());
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        stream.close();
        drop(stream);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_small_reads() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut stream = ResponseStream::new(response(&[b"abcdef"], Some(6), &drops));

        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        // The rest of the chunk comes first when switching to the stream.
        assert_eq!(stream.try_next().await.unwrap(), Some(Bytes::from_static(b"ef")));
        assert_eq!(stream.try_next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_length_from_body() {
        let drops = Arc::new(AtomicUsize::new(0));
        let stream = ResponseStream::new(response(&[b"abc"], Some(3), &drops));
        assert_eq!(stream.content_length(), Some(3));

        let stream = ResponseStream::new(response(&[b"abc"], None, &drops));
        assert_eq!(stream.content_length(), None);
    }

    #[tokio::test]
    async fn test_drop_releases_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut stream = ResponseStream::new(response(&[b"abc"], None, &drops));
        assert_eq!(stream.try_next().await.unwrap(), Some(Bytes::from_static(b"abc")));

        drop(stream);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_read_after_close() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut stream = ResponseStream::new(response(&[b"abc"], None, &drops));
        stream.close();

        let mut content = Vec::new();
        assert_eq!(stream.read_to_end(&mut content).await.unwrap(), 0);
        assert!(stream.next().await.is_none());
    }
}
