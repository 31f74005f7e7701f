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

//! Scripted transport for tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use http::{HeaderMap, Method, StatusCode, Uri};
use s3lean_core::{Error, HttpBody, HttpSend, Result};
use std::fmt::{Debug, Formatter};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> &str {
        self.uri.query().unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Part number of an upload part request.
    pub fn part_number(&self) -> Option<u32> {
        self.query()
            .strip_prefix("partNumber=")
            .and_then(|q| q.split('&').next())
            .and_then(|n| n.parse().ok())
    }
}

pub enum Reply {
    Response(http::Response<HttpBody>),
    /// Fail with a transport error.
    Fail,
    /// Cancel the token, then never answer.
    CancelAndHang(CancellationToken),
}

impl Reply {
    pub fn status(status: StatusCode) -> Self {
        Reply::Response(response(status, HttpBody::empty()))
    }
}

type Handler = dyn Fn(&Recorded) -> Reply + Send + Sync;

#[derive(Clone)]
pub struct MockHttpSend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    handler: Arc<Handler>,
}

impl MockHttpSend {
    pub fn new(handler: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            requests: Arc::default(),
            handler: Arc::new(handler),
        }
    }

    /// Answer every request with `status`.
    pub fn with_status(status: StatusCode) -> Self {
        Self::new(move |_| Reply::status(status))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Debug for MockHttpSend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpSend").finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<HttpBody>> {
        let (parts, body) = req.into_parts();
        // Copy the body so the caller gets its buffer back.
        let recorded = Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: Bytes::copy_from_slice(&body),
        };
        drop(body);

        let reply = (self.handler)(&recorded);
        self.requests.lock().unwrap().push(recorded);

        match reply {
            Reply::Response(resp) => Ok(resp),
            Reply::Fail => Err(Error::transport("connection reset by peer")),
            Reply::CancelAndHang(token) => {
                token.cancel();
                std::future::pending().await
            }
        }
    }
}

pub fn response(status: StatusCode, body: HttpBody) -> http::Response<HttpBody> {
    let mut resp = http::Response::new(body);
    *resp.status_mut() = status;
    resp
}

/// Counts how often it is dropped.
pub struct DropCounter(pub Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A body that bumps `drops` when released.
pub fn counted_body(content: &'static [u8], drops: &Arc<AtomicUsize>) -> HttpBody {
    let guard = DropCounter(drops.clone());
    let stream = stream::iter([Ok::<_, io::Error>(Bytes::from_static(content))]).map(move |c| {
        let _ = &guard;
        c
    });
    HttpBody::new(stream, Some(content.len() as u64))
}
