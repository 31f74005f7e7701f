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

use crate::canonical::canonical_query;
use crate::constants::*;
use crate::credential::Credential;
use crate::request::{HeaderValues, RequestDescriptor};
use http::HeaderValue;
use log::debug;
use s3lean_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use s3lean_core::time::{now, DateTime};
use s3lean_core::{Error, FixedBuf, Result};
use std::fmt::Write;

/// RequestSigner that implements AWS SigV4 for s3.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// All signing text is built in fixed buffers on the stack, the signing key
/// is derived again for every request.
#[derive(Debug)]
pub struct RequestSigner {
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given region.
    pub fn new(region: &str) -> Self {
        Self {
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Time to stamp the next request with.
    pub fn time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// Compute the `Authorization` header for a request.
    ///
    /// `headers` must be the exact values sent on the wire.
    pub fn sign(
        &self,
        cred: &Credential,
        desc: &RequestDescriptor<'_>,
        headers: &HeaderValues<'_>,
    ) -> Result<HeaderValue> {
        let creq = canonical_request_string(desc, headers)?;
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/s3/aws4_request"
        let mut scope = FixedBuf::<SCOPE_CAPACITY>::new();
        write!(
            scope,
            "{}/{}/{SERVICE}/aws4_request",
            headers.date(),
            self.region
        )
        .map_err(|_| Error::request_invalid("credential scope is too long"))?;
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/s3/aws4_request
        // <hashed_canonical_request>
        let mut string_to_sign = FixedBuf::<STRING_TO_SIGN_CAPACITY>::new();
        writeln!(string_to_sign, "{SIGNING_ALGORITHM}")
            .and_then(|_| writeln!(string_to_sign, "{}", headers.amz_date))
            .and_then(|_| writeln!(string_to_sign, "{scope}"))
            .and_then(|_| write!(string_to_sign, "{encoded_req}"))
            .map_err(|_| Error::request_invalid("string to sign is too long"))?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_key, headers.date(), &self.region, SERVICE)?;
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut value = FixedBuf::<AUTHORIZATION_CAPACITY>::new();
        write!(
            value,
            "{SIGNING_ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            cred.access_key,
        )
        .map_err(|_| Error::request_invalid("authorization header is too long"))?;

        let mut authorization = HeaderValue::from_str(value.as_str())?;
        authorization.set_sensitive(true);
        Ok(authorization)
    }
}

/// Build the canonical request:
///
/// ```text
/// <method>\n
/// <path>\n
/// <canonical query>\n
/// host:<host>\n
/// x-amz-content-sha256:<payload hash>\n
/// x-amz-date:<date>\n
/// \n
/// host;x-amz-content-sha256;x-amz-date\n
/// <payload hash>
/// ```
fn canonical_request_string(
    desc: &RequestDescriptor<'_>,
    headers: &HeaderValues<'_>,
) -> Result<FixedBuf<CANONICAL_REQUEST_CAPACITY>> {
    let mut f = FixedBuf::new();

    f.push_str(desc.method.as_str())?;
    f.push('\n')?;
    f.push_str(desc.path)?;
    f.push('\n')?;
    if let Some(query) = desc.query {
        canonical_query(&mut f, query)?;
    }
    f.push('\n')?;

    for (name, value) in [
        ("host", headers.host),
        (X_AMZ_CONTENT_SHA_256, headers.content_sha256),
        (X_AMZ_DATE, headers.amz_date.as_str()),
    ] {
        f.push_str(name)?;
        f.push(':')?;
        f.push_str(value)?;
        f.push('\n')?;
    }
    f.push('\n')?;

    f.push_str(SIGNED_HEADERS)?;
    f.push('\n')?;
    f.push_str(headers.content_sha256)?;

    Ok(f)
}

/// Derive the signing key: `HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")`.
fn generate_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<[u8; 32]> {
    // Sign secret
    let mut secret_key = FixedBuf::<{ MAX_SECRET_KEY_LEN + 4 }>::new();
    secret_key.push_str("AWS4")?;
    secret_key.push_str(secret)?;
    // Sign date
    let sign_date = hmac_sha256(secret_key.as_bytes(), date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(&sign_date, region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(&sign_region, service.as_bytes());
    // Sign request
    Ok(hmac_sha256(&sign_service, b"aws4_request"))
}
