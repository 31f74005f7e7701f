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

use s3lean_core::{Context, Error, Result};
use s3lean_http_send_reqwest::ReqwestHttpSend;
use s3lean_s3::{Client, Config};
use std::time::Duration;

/// Idle connections are closed after this long, so long running clients
/// pick up DNS and load balancer changes.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Create a [`Context`] sending requests through a fresh `reqwest::Client`.
pub fn default_context() -> Result<Context> {
    let client = reqwest::Client::builder()
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .build()
        .map_err(|e| Error::unexpected("failed to build http client").with_source(e))?;

    Ok(Context::new().with_http_send(ReqwestHttpSend::new(client)))
}

/// Create a [`Client`] for `config` with the default context.
///
/// # Example
///
/// ```no_run
/// use s3lean::s3::Config;
///
/// let client = s3lean::default_client(Config::new("127.0.0.1:9000", "minioadmin", "minioadmin"))
///     .expect("config must be valid");
/// ```
pub fn default_client(config: Config) -> Result<Client> {
    Client::new(default_context()?, config)
}
