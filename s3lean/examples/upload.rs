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

//! Upload a local file and read it back.
//!
//! ```shell
//! S3LEAN_ENDPOINT=127.0.0.1:9000 S3LEAN_ACCESS_KEY=minioadmin S3LEAN_SECRET_KEY=minioadmin \
//!     cargo run --example upload -- ./Cargo.toml
//! ```

use s3lean::s3::{Config, FileQuery, UploadFileCommand};
use std::env;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = env::args().nth(1).ok_or("usage: upload <file>")?;
    let config = Config::new(
        env::var("S3LEAN_ENDPOINT")?,
        env::var("S3LEAN_ACCESS_KEY")?,
        env::var("S3LEAN_SECRET_KEY")?,
    );
    let client = s3lean::default_client(config)?;

    // Cancel everything on ctrl-c.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        on_signal.cancel();
    });

    let bucket = "s3lean-example";
    client.create_bucket(bucket, &cancel).await?;

    let file = tokio::fs::File::open(&path).await?;
    let size = file.metadata().await?.len();
    let file_name = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("path must end with a file name")?;

    client
        .upload_file(
            UploadFileCommand {
                bucket,
                file_name,
                size,
                content_type: None,
                source: file,
            },
            &cancel,
        )
        .await?;
    println!("uploaded {file_name} ({size} bytes)");

    let mut stream = client
        .get_file_stream(FileQuery::new(bucket, file_name), &cancel)
        .await?;
    let mut downloaded = Vec::new();
    stream.read_to_end(&mut downloaded).await?;
    stream.close();
    println!("downloaded {} bytes", downloaded.len());

    Ok(())
}
