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

//! Hash related utils.

use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;
use std::fmt;

/// Hex encoded SHA256 of the empty payload.
///
/// Used as `x-amz-content-sha256` for every request without a body.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Lowercase hex rendering of a 32 byte digest, kept on the stack.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HexDigest([u8; 64]);

impl HexDigest {
    /// Render the given digest as lowercase hex.
    pub fn new(digest: &[u8; 32]) -> Self {
        let mut buf = [0u8; 64];
        // SAFETY: 64 output bytes always fit the hex form of 32 input bytes.
        hex::encode_to_slice(digest, &mut buf).expect("hex output must fit");
        Self(buf)
    }

    /// View the digest as `&str`.
    pub fn as_str(&self) -> &str {
        // hex::encode_to_slice only writes ASCII.
        std::str::from_utf8(&self.0).expect("hex digest must be ascii")
    }
}

impl fmt::Debug for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SHA256 hash.
pub fn sha256(content: &[u8]) -> [u8; 32] {
    Sha256::digest(content).into()
}

/// Hex encoded SHA256 hash.
///
/// The result lives on the stack, use [`HexDigest::as_str`] to borrow it.
pub fn hex_sha256(content: &[u8]) -> HexDigest {
    HexDigest::new(&sha256(content))
}

/// HMAC with SHA256 hash.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> [u8; 32] {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut h = Hmac::<Sha256>::new_from_slice(key).unwrap();
    h.update(content);

    h.finalize().into_bytes().into()
}

/// Hex encoded HMAC with SHA256 hash.
///
/// Use this function instead of `hex::encode(hmac_sha256(key, content))` can
/// reduce extra copy.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> HexDigest {
    HexDigest::new(&hmac_sha256(key, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"", EMPTY_PAYLOAD_SHA256; "empty")]
    #[test_case(&[1, 2, 3], "039058c6f2c0cb492c533b0a4d14ef77cc0f78abccced5287d84a1a2011cfb81"; "bytes")]
    #[test_case(b"Hello world", "64ec88ca00b268e5ba1a35678a1b5316d212f4f366b2477232534a8aeca37f3c"; "text")]
    fn test_hex_sha256(input: &[u8], expected: &str) {
        assert_eq!(hex_sha256(input).as_str(), expected);
    }

    #[test]
    fn test_hex_sha256_canonical_request() {
        let creq = "HEAD\n/s3kira\n\nhost:127.0.0.1:9000\nx-amz-content-sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\nx-amz-date:20230509T174643Z\n\nhost;x-amz-content-sha256;x-amz-date\ne3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(
            hex_sha256(creq.as_bytes()).as_str(),
            "4a2d1bc6763fbff7ec45196b6997e4b209620f6f645be18249dc5198ab1b07a8"
        );
    }

    #[test]
    fn test_hmac_sha256_rfc4231() {
        // RFC 4231 test case 2.
        assert_eq!(
            hex_hmac_sha256(b"Jefe", b"what do ya want for nothing?").as_str(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
