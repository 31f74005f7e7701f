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

//! Multipart upload for objects above the multipart threshold.
//!
//! ```text
//! start ──> Active ──upload_part*──> complete ──> Completed
//!             │
//!             └── any failure ──> abort ──> Aborted
//! ```

use crate::client::{read_chunk, Client};
use crate::request::{multipart_query, RequestDescriptor};
use crate::xml;
use http::header::ETAG;
use http::{Method, StatusCode};
use log::{debug, warn};
use s3lean_core::{Error, Pooled, Result};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// State of an [`UploadSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    Active,
    Completed,
    Aborted,
}

/// A started multipart upload.
#[derive(Debug)]
pub(crate) struct UploadSession<'a> {
    path: &'a str,
    upload_id: String,
    part_number: u32,
    // ETag of part `n` lives at index `n - 1`.
    etags: Pooled<'a, Vec<String>>,
    state: SessionState,
}

impl UploadSession<'_> {
    #[cfg(test)]
    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    fn ensure_active(&self) -> Result<()> {
        match self.state {
            SessionState::Active => Ok(()),
            state => Err(Error::unexpected(format!(
                "upload {} is {state:?}, no more requests allowed",
                self.upload_id
            ))),
        }
    }
}

impl Client {
    pub(crate) async fn upload_multipart<R>(
        &self,
        path: &str,
        size: u64,
        content_type: Option<&str>,
        mut source: R,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut session = self.start_upload(path, content_type, cancel).await?;
        debug!("started multipart upload {} for {path}", session.upload_id);

        match self.upload_parts(&mut session, &mut source, size, cancel).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.abort_after(&mut session, err, cancel).await),
        }
    }

    pub(crate) async fn start_upload<'a>(
        &'a self,
        path: &'a str,
        content_type: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<UploadSession<'a>> {
        let desc = RequestDescriptor::new(Method::POST, path)
            .with_query("uploads")
            .with_content_type(content_type);

        let resp = self.execute(&desc, bytes::Bytes::new(), cancel).await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::protocol(resp.status()));
        }
        let body = self.read_body(resp, cancel).await?;
        let upload_id = xml::read_value(&body, "UploadId")?;

        Ok(UploadSession {
            path,
            upload_id,
            part_number: 0,
            etags: self.etags.checkout(),
            state: SessionState::Active,
        })
    }

    async fn upload_parts<R>(
        &self,
        session: &mut UploadSession<'_>,
        source: &mut R,
        size: u64,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buf = self.buffers.checkout();

        let mut position = 0u64;
        while position < size {
            let want = (size - position).min(self.threshold as u64) as usize;
            let read = read_chunk(source, &mut buf, want, cancel).await?;
            if read < want {
                return Err(Error::unexpected(format!(
                    "upload source ended after {} of {size} declared bytes",
                    position + read as u64
                )));
            }

            self.upload_part(session, &mut buf, cancel).await?;
            position += read as u64;
        }

        self.complete_upload(session, &mut buf, cancel).await
    }

    /// Upload the content of `buf` as the next part.
    pub(crate) async fn upload_part(
        &self,
        session: &mut UploadSession<'_>,
        buf: &mut bytes::BytesMut,
        cancel: &CancellationToken,
    ) -> Result<()> {
        session.ensure_active()?;
        session.part_number += 1;
        let query = multipart_query(Some(session.part_number), &session.upload_id)?;

        let resp = self
            .send_buffer(
                Method::PUT,
                session.path,
                Some(query.as_str()),
                None,
                buf,
                cancel,
            )
            .await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::protocol(resp.status()));
        }

        let etag = resp.headers().get(ETAG).ok_or_else(|| {
            Error::malformed_response(format!(
                "ETag is missing in response of part {}",
                session.part_number
            ))
        })?;
        session.etags.push(etag.to_str()?.to_string());
        debug!(
            "uploaded part {} of upload {}",
            session.part_number, session.upload_id
        );
        Ok(())
    }

    /// Commit all uploaded parts, `buf` is reused for the request body.
    pub(crate) async fn complete_upload(
        &self,
        session: &mut UploadSession<'_>,
        buf: &mut bytes::BytesMut,
        cancel: &CancellationToken,
    ) -> Result<()> {
        session.ensure_active()?;
        xml::write_complete_body(buf, &session.etags)?;
        let query = multipart_query(None, &session.upload_id)?;

        let resp = self
            .send_buffer(
                Method::POST,
                session.path,
                Some(query.as_str()),
                None,
                buf,
                cancel,
            )
            .await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::protocol(resp.status()));
        }

        session.state = SessionState::Completed;
        debug!(
            "completed upload {} with {} parts",
            session.upload_id,
            session.etags.len()
        );
        Ok(())
    }

    /// Abort the upload, releasing the parts stored so far.
    ///
    /// Raced against `cancel` like every request, but the request is always
    /// handed to the transport before cancellation is checked.
    pub(crate) async fn abort_upload(
        &self,
        session: &mut UploadSession<'_>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        session.ensure_active()?;
        session.state = SessionState::Aborted;

        let query = multipart_query(None, &session.upload_id)?;
        let desc = RequestDescriptor::new(Method::DELETE, session.path).with_query(query.as_str());

        let resp = self.execute_best_effort(&desc, cancel).await?;
        if !resp.status().is_success() {
            return Err(Error::protocol(resp.status()));
        }
        Ok(())
    }

    /// Abort after `err` and return the error to report.
    async fn abort_after(
        &self,
        session: &mut UploadSession<'_>,
        err: Error,
        cancel: &CancellationToken,
    ) -> Error {
        warn!(
            "multipart upload {} failed, aborting: {err}",
            session.upload_id
        );

        match self.abort_upload(session, cancel).await {
            Ok(()) => err,
            Err(abort_err) => {
                warn!(
                    "abort of multipart upload {} failed: {abort_err}",
                    session.upload_id
                );
                err.with_abort_error(abort_err)
            }
        }
    }
}
