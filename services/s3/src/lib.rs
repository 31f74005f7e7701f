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

//! S3-compatible object storage client.
//!
//! Requests are signed with AWS SigV4 and sent through the
//! [`HttpSend`](s3lean_core::HttpSend) held by a [`Context`](s3lean_core::Context).
//! Uploads above [`Config::multipart_threshold`] are split into parts, and a
//! failed multipart upload is always aborted before the error is returned.

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod client;
pub use client::Client;

mod multipart;

mod stream;
pub use stream::ResponseStream;

mod types;
pub use types::FileQuery;
pub use types::UploadFileCommand;

mod request;
pub use request::{HeaderValues, RequestBuilder, RequestDescriptor};

mod sign_request;
pub use sign_request::RequestSigner;

pub mod canonical;
pub mod xml;

mod constants;
pub use constants::{DEFAULT_REGION, MULTIPART_THRESHOLD};

#[cfg(test)]
mod mock;
