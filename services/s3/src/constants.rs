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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Headers used in s3 requests.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_MINIO_FORCE_DELETE: &str = "x-minio-force-delete";

/// Names of the headers covered by the signature, sorted and `;` separated.
pub const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

pub const SIGNING_ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SERVICE: &str = "s3";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Objects larger than this are uploaded in parts of this size.
pub const MULTIPART_THRESHOLD: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_IDLE_BUFFERS: usize = 16;

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - `/` is encoded as well, object keys always travel as a single path segment.
pub static URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// Capacities of the fixed buffers used while building a request.
//
// An object key is at most 1024 bytes, 3072 once every byte is escaped.
pub const PATH_CAPACITY: usize = 4096;
pub const QUERY_CAPACITY: usize = 1024;
pub const MAX_QUERY_PAIRS: usize = 8;
pub const CANONICAL_REQUEST_CAPACITY: usize = 6144;
pub const STRING_TO_SIGN_CAPACITY: usize = 256;
pub const AUTHORIZATION_CAPACITY: usize = 512;
pub const SCOPE_CAPACITY: usize = 128;
pub const MAX_SECRET_KEY_LEN: usize = 128;
