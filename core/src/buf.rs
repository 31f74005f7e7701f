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

use crate::{Error, Result};
use std::fmt;

/// FixedBuf is a text buffer with a fixed capacity of `N` bytes.
///
/// The storage lives inline (usually on the stack) and is never reallocated.
/// Pushing more than the remaining capacity fails with
/// [`ErrorKind::RequestInvalid`](crate::ErrorKind::RequestInvalid) and leaves
/// the buffer untouched, so the content is always valid UTF-8.
///
/// Implements [`fmt::Write`], overflow is reported as [`fmt::Error`] there.
pub struct FixedBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuf<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Append a string, failing if it doesn't fit.
    pub fn push_str(&mut self, s: &str) -> Result<()> {
        let end = self.len + s.len();
        if end > N {
            return Err(Error::request_invalid(format!(
                "buffer capacity exceeded: {} bytes needed, {N} available",
                end
            )));
        }

        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }

    /// Append a single char, failing if it doesn't fit.
    pub fn push(&mut self, c: char) -> Result<()> {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp))
    }

    /// View the content as `&str`.
    pub fn as_str(&self) -> &str {
        // Only whole `&str` values are ever copied in.
        std::str::from_utf8(&self.buf[..self.len]).expect("FixedBuf must hold valid utf-8")
    }

    /// View the content as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Length of the content in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop all content, keeping the storage.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for FixedBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for FixedBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s).map_err(|_| fmt::Error)
    }
}

impl<const N: usize> fmt::Debug for FixedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> AsRef<str> for FixedBuf<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::fmt::Write;

    #[test]
    fn test_push() {
        let mut buf = FixedBuf::<16>::new();
        buf.push_str("abc").unwrap();
        buf.push('/').unwrap();
        buf.push('é').unwrap();

        assert_eq!(buf.as_str(), "abc/é");
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_overflow_keeps_content() {
        let mut buf = FixedBuf::<4>::new();
        buf.push_str("abc").unwrap();

        let err = buf.push_str("de").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert_eq!(buf.as_str(), "abc");

        // A multi-byte char must not be split.
        assert!(buf.push('é').is_err());
        assert_eq!(buf.as_str(), "abc");

        buf.push('d').unwrap();
        assert_eq!(buf.as_str(), "abcd");
    }

    #[test]
    fn test_fmt_write() {
        let mut buf = FixedBuf::<8>::new();
        write!(buf, "n={}", 42).unwrap();
        assert_eq!(buf.as_str(), "n=42");

        assert!(write!(buf, "{}", 123456).is_err());

        buf.clear();
        assert!(buf.is_empty());
    }
}
