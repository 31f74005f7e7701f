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

//! Canonical forms used by both the request line and the signature.

use crate::constants::{MAX_QUERY_PAIRS, URI_ENCODE_SET};
use percent_encoding::utf8_percent_encode;
use s3lean_core::{Error, FixedBuf, Result};

/// Percent-encode `input` into `out`.
///
/// Every byte outside `A-Za-z0-9-_.~` is written as `%XX` with uppercase hex,
/// multi-byte chars turn into one triplet per UTF-8 byte.
pub fn encode_into<const N: usize>(out: &mut FixedBuf<N>, input: &str) -> Result<()> {
    for chunk in utf8_percent_encode(input, &URI_ENCODE_SET) {
        out.push_str(chunk)?;
    }
    Ok(())
}

/// Write the canonical form of a raw query string into `out`.
///
/// - A leading `?` is skipped and empty segments are dropped.
/// - Leading whitespace is trimmed from keys.
/// - A bare `key` becomes `key=`.
/// - Pairs are sorted by key then value and joined by `&`.
///
/// Values are copied verbatim: callers build queries from already encoded
/// parts, so the request line and the signature see the same bytes.
pub fn canonical_query<const N: usize>(out: &mut FixedBuf<N>, raw: &str) -> Result<()> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);

    let mut pairs: [(&str, &str); MAX_QUERY_PAIRS] = [("", ""); MAX_QUERY_PAIRS];
    let mut count = 0;
    for segment in raw.split('&') {
        if segment.is_empty() {
            continue;
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = key.trim_start();

        if count == MAX_QUERY_PAIRS {
            return Err(Error::request_invalid(format!(
                "query has more than {MAX_QUERY_PAIRS} parameters"
            )));
        }
        pairs[count] = (key, value);
        count += 1;
    }

    let pairs = &mut pairs[..count];
    pairs.sort_unstable();

    for (idx, (key, value)) in pairs.iter().enumerate() {
        if idx > 0 {
            out.push('&')?;
        }
        out.push_str(key)?;
        out.push('=')?;
        out.push_str(value)?;
    }
    Ok(())
}
