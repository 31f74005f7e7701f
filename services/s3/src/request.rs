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

use crate::canonical::encode_into;
use crate::config::Config;
use crate::constants::*;
use crate::credential::Credential;
use crate::sign_request::RequestSigner;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use http::uri::{Authority, Scheme};
use http::{Method, Uri};
use s3lean_core::hash::EMPTY_PAYLOAD_SHA256;
use s3lean_core::time::{write_iso8601, DateTime};
use s3lean_core::{Error, FixedBuf, Result};
use std::fmt::Write;

/// Everything needed to build one request, valid for a single call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor<'a> {
    pub method: Method,
    /// Absolute, already encoded path.
    pub path: &'a str,
    /// Raw query without the leading `?`.
    pub query: Option<&'a str>,
    /// Hex SHA-256 of the body.
    pub payload_hash: &'a str,
    pub content_type: Option<&'a str>,
    pub extra_header: Option<(&'static str, &'static str)>,
}

impl<'a> RequestDescriptor<'a> {
    /// Create a descriptor for a request without body.
    pub fn new(method: Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            query: None,
            payload_hash: EMPTY_PAYLOAD_SHA256,
            content_type: None,
            extra_header: None,
        }
    }

    pub fn with_query(mut self, query: &'a str) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_payload_hash(mut self, payload_hash: &'a str) -> Self {
        self.payload_hash = payload_hash;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&'a str>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.extra_header = Some((name, value));
        self
    }
}

/// The signed header values of one request.
///
/// Built once and read by both the signer and the request, so what is sent
/// is always what was signed.
#[derive(Debug)]
pub struct HeaderValues<'a> {
    pub host: &'a str,
    pub content_sha256: &'a str,
    /// `YYYYMMDDThhmmssZ`
    pub amz_date: FixedBuf<16>,
}

impl<'a> HeaderValues<'a> {
    pub fn new(host: &'a str, content_sha256: &'a str, time: DateTime) -> Result<Self> {
        let mut amz_date = FixedBuf::new();
        write_iso8601(&mut amz_date, time)
            .map_err(|_| Error::request_invalid("request time can't be formatted"))?;

        Ok(Self {
            host,
            content_sha256,
            amz_date,
        })
    }

    /// The `YYYYMMDD` part of the request time.
    pub fn date(&self) -> &str {
        &self.amz_date.as_str()[..8]
    }
}

/// RequestBuilder turns descriptors into signed requests for one endpoint.
#[derive(Debug)]
pub struct RequestBuilder {
    scheme: Scheme,
    endpoint: Authority,
    credential: Credential,
    signer: RequestSigner,
}

impl RequestBuilder {
    /// Create a builder from a config, failing if the config is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config.validate()?;
        let scheme = if config.use_tls {
            Scheme::HTTPS
        } else {
            Scheme::HTTP
        };

        Ok(Self {
            scheme,
            endpoint,
            credential: Credential::new(&config.access_key, &config.secret_key),
            signer: RequestSigner::new(&config.region),
        })
    }

    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.signer = self.signer.with_time(time);
        self
    }

    /// Build a signed request.
    pub fn build(&self, desc: &RequestDescriptor<'_>, body: Bytes) -> Result<http::Request<Bytes>> {
        let headers = HeaderValues::new(
            self.endpoint.as_str(),
            desc.payload_hash,
            self.signer.time(),
        )?;
        let authorization = self.signer.sign(&self.credential, desc, &headers)?;

        let mut path_and_query = FixedBuf::<{ PATH_CAPACITY + QUERY_CAPACITY }>::new();
        path_and_query.push_str(desc.path)?;
        if let Some(query) = desc.query {
            path_and_query.push('?')?;
            path_and_query.push_str(query)?;
        }
        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.endpoint.clone())
            .path_and_query(path_and_query.as_str())
            .build()?;

        let mut req = http::Request::builder()
            .method(desc.method.clone())
            .uri(uri)
            .header(HOST, headers.host)
            .header(X_AMZ_CONTENT_SHA_256, headers.content_sha256)
            .header(X_AMZ_DATE, headers.amz_date.as_str())
            .header(AUTHORIZATION, authorization);
        if let Some(content_type) = desc.content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        if let Some((name, value)) = desc.extra_header {
            req = req.header(name, value);
        }

        Ok(req.body(body)?)
    }
}

/// Build `/{bucket}`.
pub fn bucket_path(bucket: &str) -> Result<FixedBuf<PATH_CAPACITY>> {
    if bucket.is_empty() {
        return Err(Error::request_invalid("bucket name must not be empty"));
    }

    let mut path = FixedBuf::new();
    path.push('/')?;
    encode_into(&mut path, bucket)?;
    Ok(path)
}

/// Build `/{bucket}/{encoded key}`.
pub fn object_path(bucket: &str, key: &str) -> Result<FixedBuf<PATH_CAPACITY>> {
    if key.is_empty() {
        return Err(Error::request_invalid("file name must not be empty"));
    }

    let mut path = bucket_path(bucket)?;
    path.push('/')?;
    encode_into(&mut path, key)?;
    Ok(path)
}

/// Build `partNumber={n}&uploadId={id}`, or `uploadId={id}` without a part.
pub fn multipart_query(part_number: Option<u32>, upload_id: &str) -> Result<FixedBuf<QUERY_CAPACITY>> {
    let mut query = FixedBuf::new();
    if let Some(n) = part_number {
        write!(query, "partNumber={n}&").map_err(|_| Error::request_invalid("query is too long"))?;
    }
    query.push_str("uploadId=")?;
    encode_into(&mut query, upload_id)?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use s3lean_core::ErrorKind;

    fn test_builder() -> RequestBuilder {
        let config = Config::new("127.0.0.1:9000", "minioadmin", "minioadmin");
        let time = Utc
            .with_ymd_and_hms(2023, 5, 9, 17, 46, 43)
            .single()
            .expect("must be valid time");
        RequestBuilder::new(&config).unwrap().with_time(time)
    }

    #[test]
    fn test_build_bucket_request() {
        let builder = test_builder();
        let path = bucket_path("s3kira").unwrap();
        let req = builder
            .build(&RequestDescriptor::new(Method::HEAD, path.as_str()), Bytes::new())
            .unwrap();

        assert_eq!(req.method(), Method::HEAD);
        assert_eq!(req.uri().to_string(), "http://127.0.0.1:9000/s3kira");
        assert_eq!(req.headers()[HOST], "127.0.0.1:9000");
        assert_eq!(req.headers()[X_AMZ_DATE], "20230509T174643Z");
        assert_eq!(req.headers()[X_AMZ_CONTENT_SHA_256], EMPTY_PAYLOAD_SHA256);

        let authorization = req.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(authorization.contains("Credential=minioadmin/20230509/us-east-1/s3/aws4_request"));
    }

    #[test]
    fn test_build_with_query_and_headers() {
        let builder = test_builder();
        let path = object_path("bucket", "dir/file name.txt").unwrap();
        let query = multipart_query(Some(3), "id+/=").unwrap();
        let desc = RequestDescriptor::new(Method::PUT, path.as_str())
            .with_query(query.as_str())
            .with_content_type(Some("text/plain"))
            .with_header(X_MINIO_FORCE_DELETE, "true");

        let req = builder.build(&desc, Bytes::from_static(b"data")).unwrap();
        assert_eq!(
            req.uri().to_string(),
            "http://127.0.0.1:9000/bucket/dir%2Ffile%20name.txt?partNumber=3&uploadId=id%2B%2F%3D"
        );
        assert_eq!(req.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(req.headers()[X_MINIO_FORCE_DELETE], "true");
        assert_eq!(&req.body()[..], b"data");
    }

    #[test]
    fn test_build_with_tls() {
        let config = Config::new("s3.example.com", "access", "secret").with_tls(true);
        let builder = RequestBuilder::new(&config).unwrap();
        let req = builder
            .build(&RequestDescriptor::new(Method::GET, "/bucket"), Bytes::new())
            .unwrap();
        assert_eq!(req.uri().to_string(), "https://s3.example.com/bucket");
    }

    #[test]
    fn test_invalid_config() {
        let config = Config::new("127.0.0.1:9000", "", "secret");
        let err = RequestBuilder::new(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_paths() {
        assert_eq!(bucket_path("bucket").unwrap().as_str(), "/bucket");
        assert_eq!(object_path("bucket", "a b").unwrap().as_str(), "/bucket/a%20b");
        assert_eq!(
            multipart_query(None, "abc").unwrap().as_str(),
            "uploadId=abc"
        );

        assert_eq!(bucket_path("").unwrap_err().kind(), ErrorKind::RequestInvalid);
        assert_eq!(
            object_path("bucket", "").unwrap_err().kind(),
            ErrorKind::RequestInvalid
        );
        let long_key = "ключ".repeat(1024);
        assert_eq!(
            object_path("bucket", &long_key).unwrap_err().kind(),
            ErrorKind::RequestInvalid
        );
    }

    #[test]
    fn test_header_values_share_date() {
        let time = Utc
            .with_ymd_and_hms(2035, 12, 31, 14, 5, 5)
            .single()
            .expect("must be valid time");
        let headers = HeaderValues::new("host", EMPTY_PAYLOAD_SHA256, time).unwrap();
        assert_eq!(headers.amz_date.as_str(), "20351231T140505Z");
        assert_eq!(headers.date(), "20351231");
    }
}
