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

//! Just enough XML for the multipart protocol.
//!
//! Responses are only ever searched for a single scalar element, and the
//! only document sent is the list of uploaded parts.

use bytes::BytesMut;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use s3lean_core::{Error, Result};
use std::fmt::Write;

/// Read the text of the first element named `name` in `body`.
///
/// Entities are unescaped. A missing element, an empty value or a value
/// with non-ASCII or control characters is a malformed response.
pub fn read_value(body: &[u8], name: &str) -> Result<String> {
    let mut reader = Reader::from_reader(body);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut inside = false;
    let mut value = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == name.as_bytes() => inside = true,
            Ok(Event::Text(e)) if inside => {
                let text = e.unescape().map_err(|err| {
                    Error::malformed_response(format!("{name} can't be unescaped"))
                        .with_source(err)
                })?;
                value.push_str(&text);
            }
            Ok(Event::End(e)) if inside && e.local_name().as_ref() == name.as_bytes() => break,
            Ok(Event::Eof) => {
                return Err(Error::malformed_response(format!(
                    "{name} is missing in response"
                )))
            }
            Err(err) => {
                return Err(
                    Error::malformed_response("response is not valid xml").with_source(err)
                )
            }
            _ => {}
        }
    }

    if value.is_empty() {
        return Err(Error::malformed_response(format!(
            "{name} is empty in response"
        )));
    }
    if !value.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(Error::malformed_response(format!(
            "{name} contains unsupported characters"
        )));
    }
    Ok(value)
}

/// Write the body of a complete multipart upload request into `buf`.
///
/// Parts are numbered from 1 in the order of `etags`.
pub fn write_complete_body(buf: &mut BytesMut, etags: &[String]) -> Result<()> {
    buf.clear();
    buf.write_str("<CompleteMultipartUpload>")?;
    for (idx, etag) in etags.iter().enumerate() {
        write!(
            buf,
            "<Part><PartNumber>{}</PartNumber><ETag>{}</ETag></Part>",
            idx + 1,
            escape(etag.as_str())
        )?;
    }
    buf.write_str("</CompleteMultipartUpload>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use s3lean_core::ErrorKind;
    use test_case::test_case;

    const INITIATE_RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Bucket>bucket</Bucket>
  <Key>key</Key>
  <UploadId>VXBsb2FkIElEIGZvciA2aWWpbmcncyBteS1tb3ZpZS5tMnRzIHVwbG9hZA</UploadId>
</InitiateMultipartUploadResult>"#;

    #[test]
    fn test_read_value() {
        let value = read_value(INITIATE_RESPONSE.as_bytes(), "UploadId").unwrap();
        assert_eq!(
            value,
            "VXBsb2FkIElEIGZvciA2aWWpbmcncyBteS1tb3ZpZS5tMnRzIHVwbG9hZA"
        );
        assert_eq!(read_value(INITIATE_RESPONSE.as_bytes(), "Key").unwrap(), "key");
    }

    #[test]
    fn test_read_value_unescapes() {
        let body = b"<Result><UploadId>a&amp;b</UploadId></Result>";
        assert_eq!(read_value(body, "UploadId").unwrap(), "a&b");
    }

    #[test]
    fn test_read_value_prefixed() {
        let body = b"<s3:Result xmlns:s3=\"x\"><s3:UploadId>abc</s3:UploadId></s3:Result>";
        assert_eq!(read_value(body, "UploadId").unwrap(), "abc");
    }

    #[test_case(b"<Result><Bucket>b</Bucket></Result>"; "missing")]
    #[test_case(b"<Result><UploadId></UploadId></Result>"; "empty")]
    #[test_case(b"<Result><UploadId/></Result>"; "self closing")]
    #[test_case("<Result><UploadId>ключ</UploadId></Result>".as_bytes(); "non ascii")]
    #[test_case(b"<Result><UploadId>a\x01b</UploadId></Result>"; "control char")]
    #[test_case(b"<Result><UploadId>abc</Bucket></Result>"; "mismatched tags")]
    #[test_case(b""; "empty body")]
    fn test_read_value_malformed(body: &[u8]) {
        let err = read_value(body, "UploadId").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_write_complete_body() {
        let mut buf = BytesMut::with_capacity(256);
        let etags = vec![
            "\"a54357aff0632cce46d942af68356b38\"".to_string(),
            "\"0c78aef83f66abc1fa1e8477f296d394\"".to_string(),
        ];
        write_complete_body(&mut buf, &etags).unwrap();

        assert_eq!(
            std::str::from_utf8(&buf).unwrap(),
            "<CompleteMultipartUpload>\
             <Part><PartNumber>1</PartNumber><ETag>&quot;a54357aff0632cce46d942af68356b38&quot;</ETag></Part>\
             <Part><PartNumber>2</PartNumber><ETag>&quot;0c78aef83f66abc1fa1e8477f296d394&quot;</ETag></Part>\
             </CompleteMultipartUpload>"
        );
    }
}
