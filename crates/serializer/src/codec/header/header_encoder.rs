//! HTTP header encoder implementation for serializing HTTP message heads
//!
//! This module provides functionality for encoding HTTP request and response heads into raw
//! bytes. It handles serialization of the request or status line and the header fields, and
//! manages the content length or transfer encoding headers according to HTTP/1.1.
//!
//! # Features
//!
//! - Efficient header serialization
//! - Automatic handling of Content-Length and Transfer-Encoding headers
//! - Support for HTTP/1.0 and HTTP/1.1 requests and responses
//! - Chunked transfer encoding support

use crate::protocol::{MessageHead, PayloadSize, RequestHead, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{HeaderMap, HeaderValue, Method, Version, header};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
pub const INIT_HEADER_SIZE: usize = 4 * 1024;

const CHUNKED: HeaderValue = HeaderValue::from_static("chunked");
const ZERO_VALUE: HeaderValue = HeaderValue::from_static("0");

/// Encoder for HTTP message heads implementing the [`Encoder`] trait.
///
/// This encoder serializes a [`MessageHead`] and [`PayloadSize`] into raw bytes,
/// automatically handling Content-Length or Transfer-Encoding headers based on the
/// payload size.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(MessageHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the message head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not supported (only HTTP/1.0 and HTTP/1.1 are supported)
    /// - Writing to buffer fails
    fn encode(&mut self, item: (MessageHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, payload_size) = item;

        dst.reserve(INIT_HEADER_SIZE);
        match &head {
            MessageHead::Request(request) => write_request_line(request, dst)?,
            MessageHead::Response(response) => write_status_line(response, dst)?,
        }

        let skip_empty_length = match &head {
            MessageHead::Request(request) => !method_has_payload(request.method()),
            MessageHead::Response(_) => false,
        };
        set_payload_headers(head.headers_mut(), payload_size, skip_empty_length);

        // Write all headers
        for (header_name, header_value) in head.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

fn version_str(version: Version) -> Result<&'static str, SendError> {
    match version {
        Version::HTTP_11 => Ok("HTTP/1.1"),
        Version::HTTP_10 => Ok("HTTP/1.0"),
        v => {
            error!(http_version = ?v, "unsupported http version");
            Err(SendError::invalid_head(format!("unsupported http version: {v:?}")))
        }
    }
}

fn write_request_line(request: &RequestHead, dst: &mut BytesMut) -> Result<(), SendError> {
    let version = version_str(request.version())?;
    let uri = request.uri();

    dst.put_slice(request.method().as_str().as_bytes());
    dst.put_u8(b' ');
    if request.method() == Method::CONNECT {
        // authority-form
        let authority = uri.authority().ok_or_else(|| SendError::invalid_head("CONNECT request without authority"))?;
        dst.put_slice(authority.as_str().as_bytes());
    } else if uri.scheme().is_some() {
        // absolute-form
        write!(FastWrite(dst), "{uri}")?;
    } else {
        // origin-form
        let target = uri.path_and_query().map_or("/", |path_and_query| path_and_query.as_str());
        dst.put_slice(target.as_bytes());
    }
    dst.put_u8(b' ');
    dst.put_slice(version.as_bytes());
    dst.put_slice(b"\r\n");
    Ok(())
}

fn write_status_line(response: &ResponseHead, dst: &mut BytesMut) -> Result<(), SendError> {
    let version = version_str(response.version())?;
    write!(
        FastWrite(dst),
        "{} {} {}\r\n",
        version,
        response.status().as_str(),
        response.status().canonical_reason().unwrap_or("")
    )?;
    Ok(())
}

fn method_has_payload(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS | Method::CONNECT)
}

/// Set appropriate content length or transfer encoding header
fn set_payload_headers(headers: &mut HeaderMap, payload_size: PayloadSize, skip_empty_length: bool) {
    match payload_size {
        PayloadSize::Length(n) => {
            headers.remove(header::TRANSFER_ENCODING);
            headers.insert(header::CONTENT_LENGTH, n.into());
        }
        PayloadSize::Chunked => {
            headers.remove(header::CONTENT_LENGTH);
            headers.insert(header::TRANSFER_ENCODING, CHUNKED);
        }
        PayloadSize::Empty => {
            headers.remove(header::TRANSFER_ENCODING);
            if skip_empty_length {
                headers.remove(header::CONTENT_LENGTH);
            } else {
                headers.insert(header::CONTENT_LENGTH, ZERO_VALUE);
            }
        }
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
