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

//! Core components for the s3lean object storage client.
//!
//! This crate holds the pieces that do not depend on any particular storage
//! service: the error type, hashing and time helpers, the low-allocation
//! buffer primitives and the transport seam used to send requests.
//!
//! ## Overview
//!
//! - **Context**: A container that holds the [`HttpSend`] implementation used by a client
//! - **FixedBuf**: A fixed-capacity text buffer that refuses to grow
//! - **Pool**: A thread-safe object pool whose checkouts return themselves on drop
//!
//! ## Example
//!
//! ```
//! use s3lean_core::{FixedBuf, Pool};
//!
//! let mut path = FixedBuf::<64>::new();
//! path.push_str("/bucket/").unwrap();
//! path.push_str("key").unwrap();
//! assert_eq!(path.as_str(), "/bucket/key");
//!
//! let pool = Pool::new(4, || Vec::<u8>::with_capacity(16), |v| {
//!     v.clear();
//!     true
//! });
//! {
//!     let mut buf = pool.checkout();
//!     buf.extend_from_slice(b"hello");
//! }
//! assert_eq!(pool.idle(), 1);
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod buf;
pub use buf::FixedBuf;
mod pool;
pub use pool::{Pool, Pooled};

mod context;
pub use context::Context;
mod http;
pub use http::{ByteStream, HttpBody, HttpSend, NoopHttpSend, MAX_READ_ALL_LEN};

mod error;
pub use error::{Error, ErrorKind, Result};
