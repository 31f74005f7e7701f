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

use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use std::fmt::{Debug, Formatter};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Largest body [`HttpBody::read_all`] buffers.
pub const MAX_READ_ALL_LEN: usize = 64 * 1024;

/// Stream of body chunks as produced by a transport.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// HttpBody is the streaming body of a response.
///
/// The body owns whatever keeps the underlying connection alive, dropping it
/// releases the connection.
pub struct HttpBody {
    stream: ByteStream,
    len: Option<u64>,
}

impl HttpBody {
    /// Create a new body from a chunk stream and its length if known.
    pub fn new(
        stream: impl Stream<Item = io::Result<Bytes>> + Send + 'static,
        len: Option<u64>,
    ) -> Self {
        Self {
            stream: stream.boxed(),
            len,
        }
    }

    /// Create an empty body.
    pub fn empty() -> Self {
        Self::new(stream::empty(), Some(0))
    }

    /// Length reported by the transport, if any.
    pub fn known_len(&self) -> Option<u64> {
        self.len
    }

    /// Read the whole body into memory.
    ///
    /// Only meant for the small XML documents returned by control requests,
    /// bodies longer than [`MAX_READ_ALL_LEN`] fail with `MalformedResponse`.
    pub async fn read_all(mut self) -> Result<Bytes> {
        if let Some(len) = self.len.filter(|len| *len > MAX_READ_ALL_LEN as u64) {
            return Err(Error::malformed_response(format!(
                "response body of {len} bytes is too large to buffer"
            )));
        }

        let capacity = self.len.unwrap_or(512) as usize;
        let mut buf = BytesMut::with_capacity(capacity);
        while let Some(chunk) = self.stream.next().await {
            let chunk = chunk.map_err(|e| {
                Error::transport("failed to read response body").with_source(e)
            })?;
            if buf.len() + chunk.len() > MAX_READ_ALL_LEN {
                return Err(Error::malformed_response(format!(
                    "response body exceeds {MAX_READ_ALL_LEN} bytes"
                )));
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }
}

impl From<Bytes> for HttpBody {
    fn from(bs: Bytes) -> Self {
        let len = bs.len() as u64;
        Self::new(stream::once(async move { Ok(bs) }), Some(len))
    }
}

impl Stream for HttpBody {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().stream.poll_next_unpin(cx)
    }
}

impl Debug for HttpBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBody").field("len", &self.len).finish()
    }
}

/// HttpSend is used to send signed requests to the storage service.
///
/// Implementations own connection pooling, TLS and socket I/O. The response
/// body must be streamed: a download may be far larger than memory.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<HttpBody>>;
}

/// NoopHttpSend is a no-op implementation that always returns an error.
///
/// This is used when no HTTP client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<HttpBody>> {
        Err(Error::transport(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect() {
        let chunks = vec![Ok(Bytes::from_static(b"<a>")), Ok(Bytes::from_static(b"</a>"))];
        let body = HttpBody::new(stream::iter(chunks), None);
        assert_eq!(body.known_len(), None);
        assert_eq!(body.read_all().await.unwrap(), Bytes::from_static(b"<a></a>"));
    }

    #[tokio::test]
    async fn test_collect_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"<a>")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = HttpBody::new(stream::iter(chunks), None);
        let err = body.read_all().await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_collect_too_large() {
        let chunk = Bytes::from(vec![b'a'; 1024]);
        let chunks = (0..65).map(move |_| Ok(chunk.clone()));
        let body = HttpBody::new(stream::iter(chunks), None);
        let err = body.read_all().await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedResponse);

        let body = HttpBody::new(stream::empty(), Some(MAX_READ_ALL_LEN as u64 + 1));
        let err = body.read_all().await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedResponse);

        let body = HttpBody::from(Bytes::from(vec![b'a'; MAX_READ_ALL_LEN]));
        assert_eq!(body.read_all().await.unwrap().len(), MAX_READ_ALL_LEN);
    }

    #[tokio::test]
    async fn test_noop() {
        let req = http::Request::new(Bytes::new());
        let err = NoopHttpSend.http_send(req).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Transport);
    }
}
