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

//! Send a request through a reqwest client tuned for object storage.
//!
//! ```shell
//! cargo run --example custom_client -- http://127.0.0.1:9000/
//! ```

use bytes::Bytes;
use futures::StreamExt;
use s3lean_core::Context;
use s3lean_http_send_reqwest::ReqwestHttpSend;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:9000/".to_string());

    let client = reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(16)
        .build()?;
    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri(url.as_str())
        .body(Bytes::new())?;

    let resp = ctx.http_send(req).await?;
    println!("status: {}", resp.status());
    for (name, value) in resp.headers() {
        println!("  {name}: {value:?}");
    }

    let mut body = resp.into_body();
    let mut total = 0;
    while let Some(chunk) = body.next().await {
        total += chunk?.len();
    }
    println!("read {total} bytes");

    Ok(())
}
