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

use crate::config::Config;
use crate::constants::X_MINIO_FORCE_DELETE;
use crate::request::{bucket_path, object_path, RequestBuilder, RequestDescriptor};
use crate::stream::ResponseStream;
use crate::types::{FileQuery, UploadFileCommand};
use bytes::{BufMut, Bytes, BytesMut};
use http::{Method, StatusCode};
use log::debug;
use s3lean_core::hash::hex_sha256;
use s3lean_core::{Context, Error, HttpBody, Pool, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

/// Client for one S3-compatible endpoint.
///
/// The client is cheap to share behind an `Arc`: every call works on its own
/// buffers checked out from internal pools. All operations take a
/// [`CancellationToken`], a cancelled call fails with
/// [`ErrorKind::Cancelled`](s3lean_core::ErrorKind::Cancelled).
///
/// ```no_run
/// # async fn example(ctx: s3lean_core::Context) -> s3lean_core::Result<()> {
/// use s3lean_s3::{Client, Config};
/// use tokio_util::sync::CancellationToken;
///
/// let client = Client::new(ctx, Config::new("127.0.0.1:9000", "minioadmin", "minioadmin"))?;
/// let cancel = CancellationToken::new();
/// if !client.bucket_exists("photos", &cancel).await? {
///     client.create_bucket("photos", &cancel).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    ctx: Context,
    builder: RequestBuilder,
    pub(crate) threshold: usize,
    pub(crate) buffers: Pool<BytesMut>,
    pub(crate) etags: Pool<Vec<String>>,
}

impl Client {
    /// Create a client, failing with `ConfigInvalid` if `config` is invalid.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let builder = RequestBuilder::new(&config)?;
        let threshold = config.multipart_threshold;

        Ok(Self {
            ctx,
            builder,
            threshold,
            buffers: Pool::new(
                config.max_idle_buffers,
                move || BytesMut::with_capacity(threshold),
                move |buf| {
                    buf.clear();
                    buf.capacity() >= threshold
                },
            ),
            etags: Pool::new(config.max_idle_buffers, Vec::new, |etags| {
                etags.clear();
                true
            }),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_time(mut self, time: s3lean_core::time::DateTime) -> Self {
        self.builder = self.builder.with_time(time);
        self
    }

    /// Check if a bucket exists.
    pub async fn bucket_exists(&self, bucket: &str, cancel: &CancellationToken) -> Result<bool> {
        let path = bucket_path(bucket)?;
        let desc = RequestDescriptor::new(Method::HEAD, path.as_str());

        let resp = self.execute(&desc, Bytes::new(), cancel).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::protocol(status)),
        }
    }

    /// Create a bucket, succeeding if it already exists.
    pub async fn create_bucket(&self, bucket: &str, cancel: &CancellationToken) -> Result<()> {
        let path = bucket_path(bucket)?;
        let desc = RequestDescriptor::new(Method::PUT, path.as_str());

        let resp = self.execute(&desc, Bytes::new(), cancel).await?;
        match resp.status() {
            StatusCode::OK | StatusCode::CONFLICT => Ok(()),
            status => Err(Error::protocol(status)),
        }
    }

    /// Delete an empty bucket, succeeding if it doesn't exist.
    pub async fn delete_bucket(&self, bucket: &str, cancel: &CancellationToken) -> Result<()> {
        self.remove_bucket(bucket, false, cancel).await
    }

    /// Delete a bucket together with its objects.
    ///
    /// Relies on the `x-minio-force-delete` extension, services without it
    /// treat this like [`delete_bucket`](Self::delete_bucket).
    pub async fn force_delete_bucket(
        &self,
        bucket: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.remove_bucket(bucket, true, cancel).await
    }

    async fn remove_bucket(
        &self,
        bucket: &str,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = bucket_path(bucket)?;
        let mut desc = RequestDescriptor::new(Method::DELETE, path.as_str());
        if force {
            desc = desc.with_header(X_MINIO_FORCE_DELETE, "true");
        }

        let resp = self.execute(&desc, Bytes::new(), cancel).await?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
            status => Err(Error::protocol(status)),
        }
    }

    /// Check if an object exists.
    pub async fn file_exists(&self, query: FileQuery<'_>, cancel: &CancellationToken) -> Result<bool> {
        let path = object_path(query.bucket, query.file_name)?;
        let desc = RequestDescriptor::new(Method::HEAD, path.as_str());

        let resp = self.execute(&desc, Bytes::new(), cancel).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::protocol(status)),
        }
    }

    /// Delete an object.
    pub async fn delete_file(&self, query: FileQuery<'_>, cancel: &CancellationToken) -> Result<()> {
        let path = object_path(query.bucket, query.file_name)?;
        let desc = RequestDescriptor::new(Method::DELETE, path.as_str());

        let resp = self.execute(&desc, Bytes::new(), cancel).await?;
        match resp.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(Error::protocol(status)),
        }
    }

    /// Open an object for reading.
    ///
    /// The returned stream holds the connection until it is closed or dropped.
    pub async fn get_file_stream(
        &self,
        query: FileQuery<'_>,
        cancel: &CancellationToken,
    ) -> Result<ResponseStream> {
        let path = object_path(query.bucket, query.file_name)?;
        let desc = RequestDescriptor::new(Method::GET, path.as_str());

        let resp = self.execute(&desc, Bytes::new(), cancel).await?;
        let status = resp.status();
        if status != StatusCode::OK {
            drop(resp);
            return Err(Error::protocol(status));
        }
        Ok(ResponseStream::new(resp))
    }

    /// Upload an object from `cmd.source`.
    ///
    /// Payloads up to the multipart threshold go out in a single request,
    /// larger ones as a multipart upload that is aborted if any step fails.
    pub async fn upload_file<R>(
        &self,
        cmd: UploadFileCommand<'_, R>,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let path = object_path(cmd.bucket, cmd.file_name)?;
        if cmd.size > self.threshold as u64 {
            return self
                .upload_multipart(
                    path.as_str(),
                    cmd.size,
                    cmd.content_type,
                    cmd.source,
                    cancel,
                )
                .await;
        }

        let mut source = cmd.source;
        let mut buf = self.buffers.checkout();
        let read = read_chunk(&mut source, &mut buf, cmd.size as usize, cancel).await?;
        if (read as u64) < cmd.size {
            debug!("source ended after {read} of {} declared bytes", cmd.size);
        }

        let resp = self
            .send_buffer(
                Method::PUT,
                path.as_str(),
                None,
                cmd.content_type,
                &mut buf,
                cancel,
            )
            .await?;
        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(Error::protocol(status)),
        }
    }

    /// Build, sign and send a request.
    pub(crate) async fn execute(
        &self,
        desc: &RequestDescriptor<'_>,
        body: Bytes,
        cancel: &CancellationToken,
    ) -> Result<http::Response<HttpBody>> {
        let req = self.builder.build(desc, body)?;
        debug!("sending request: {} {}", req.method(), req.uri());

        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled("operation cancelled")),
            resp = self.ctx.http_send(req) => resp,
        }?;
        debug!("got response: {} {}", desc.method, resp.status());
        Ok(resp)
    }

    /// Like [`execute`](Self::execute), but polls the transport before
    /// checking `cancel`, so the request is handed over even when the call is
    /// already cancelled.
    pub(crate) async fn execute_best_effort(
        &self,
        desc: &RequestDescriptor<'_>,
        cancel: &CancellationToken,
    ) -> Result<http::Response<HttpBody>> {
        let req = self.builder.build(desc, Bytes::new())?;
        debug!("sending request: {} {}", req.method(), req.uri());

        tokio::select! {
            biased;
            resp = self.ctx.http_send(req) => resp,
            _ = cancel.cancelled() => Err(Error::cancelled("operation cancelled")),
        }
    }

    /// Send the content of `buf` as body, taking the allocation back
    /// once the transport is done with it.
    pub(crate) async fn send_buffer(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        content_type: Option<&str>,
        buf: &mut BytesMut,
        cancel: &CancellationToken,
    ) -> Result<http::Response<HttpBody>> {
        // Hash what is actually sent, not what was declared.
        let payload_hash = hex_sha256(buf);
        let mut desc = RequestDescriptor::new(method, path)
            .with_payload_hash(payload_hash.as_str())
            .with_content_type(content_type);
        if let Some(query) = query {
            desc = desc.with_query(query);
        }

        let body = std::mem::take(buf).freeze();
        let resp = self.execute(&desc, body.clone(), cancel).await;
        if let Ok(reclaimed) = body.try_into_mut() {
            *buf = reclaimed;
            buf.clear();
        }
        resp
    }

    /// Read a whole small response body.
    pub(crate) async fn read_body(
        &self,
        resp: http::Response<HttpBody>,
        cancel: &CancellationToken,
    ) -> Result<Bytes> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled("operation cancelled")),
            body = resp.into_body().read_all() => body,
        }
    }
}

/// Fill `buf` with up to `want` bytes from `source`.
///
/// Returns fewer bytes only when the source ends first.
pub(crate) async fn read_chunk<R>(
    source: &mut R,
    buf: &mut BytesMut,
    want: usize,
    cancel: &CancellationToken,
) -> Result<usize>
where
    R: AsyncRead + Unpin + Send,
{
    buf.clear();
    buf.reserve(want);

    while buf.len() < want {
        let remaining = want - buf.len();
        let mut limited = (&mut *buf).limit(remaining);
        let n = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::cancelled("operation cancelled")),
            n = source.read_buf(&mut limited) => n.map_err(|e| {
                Error::unexpected("failed to read upload source").with_source(e)
            })?,
        };
        if n == 0 {
            break;
        }
    }
    Ok(buf.len())
}
