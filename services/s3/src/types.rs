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

/// Arguments of [`Client::upload_file`](crate::Client::upload_file).
#[derive(Debug)]
pub struct UploadFileCommand<'a, R> {
    pub bucket: &'a str,
    pub file_name: &'a str,
    /// Declared size of the payload, decides between a single request and
    /// a multipart upload.
    pub size: u64,
    pub content_type: Option<&'a str>,
    pub source: R,
}

/// Identifies an object.
#[derive(Debug, Clone, Copy)]
pub struct FileQuery<'a> {
    pub bucket: &'a str,
    pub file_name: &'a str,
}

impl<'a> FileQuery<'a> {
    pub fn new(bucket: &'a str, file_name: &'a str) -> Self {
        Self { bucket, file_name }
    }
}
