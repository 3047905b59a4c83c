use bytes::Bytes;
use http::{HeaderMap, Request, Response, Version};
use http_body::SizeHint;

/// Type alias for HTTP request heads.
///
/// Uses `http::Request<()>` with an empty body placeholder; the body travels separately as a
/// [`BodyWriter`](crate::body::BodyWriter).
pub type RequestHead = Request<()>;

/// Type alias for HTTP response heads.
pub type ResponseHead = Response<()>;

/// The head of an outgoing HTTP message: either a request line or a status line, plus headers.
///
/// The head is read-only input for the duration of one write; the message preparer consumes it
/// when the write is initialized.
#[derive(Debug)]
pub enum MessageHead {
    /// An outgoing request (client side)
    Request(RequestHead),
    /// An outgoing response (server side)
    Response(ResponseHead),
}

impl MessageHead {
    /// Returns true if this head starts with a request line
    #[inline]
    pub fn is_request(&self) -> bool {
        matches!(self, MessageHead::Request(_))
    }

    pub fn version(&self) -> Version {
        match self {
            MessageHead::Request(request) => request.version(),
            MessageHead::Response(response) => response.version(),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        match self {
            MessageHead::Request(request) => request.headers(),
            MessageHead::Response(response) => response.headers(),
        }
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        match self {
            MessageHead::Request(request) => request.headers_mut(),
            MessageHead::Response(response) => response.headers_mut(),
        }
    }
}

impl From<RequestHead> for MessageHead {
    fn from(request: RequestHead) -> Self {
        MessageHead::Request(request)
    }
}

impl From<ResponseHead> for MessageHead {
    fn from(response: ResponseHead) -> Self {
        MessageHead::Response(response)
    }
}

/// Represents the size information of an HTTP payload, as reported by a body writer.
///
/// This enum is used by the message preparer to pick the framing of the message:
/// - Known length: `Content-Length` framing
/// - Chunked: `Transfer-Encoding: chunked` framing
/// - Empty: `Content-Length: 0`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload of unknown length, sent with chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

impl From<SizeHint> for PayloadSize {
    fn from(size_hint: SizeHint) -> Self {
        match size_hint.exact() {
            Some(0) => PayloadSize::Empty,
            Some(length) => PayloadSize::Length(length),
            None => PayloadSize::Chunked,
        }
    }
}

/// How the body of one message is delimited on the wire.
///
/// Fixed for the lifetime of one write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Framing {
    /// Raw body bytes, exactly as many as the declared `Content-Length`
    ContentLength(u64),
    /// `<hex-length>\r\n<data>\r\n` per slice, terminated by `0\r\n\r\n`
    Chunked,
}

impl Framing {
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, Framing::Chunked)
    }
}

impl From<PayloadSize> for Framing {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(length) => Framing::ContentLength(length),
            PayloadSize::Chunked => Framing::Chunked,
            PayloadSize::Empty => Framing::ContentLength(0),
        }
    }
}

/// The output of the message preparer: serialized head bytes plus the framing decisions.
///
/// Callers that serialize heads themselves can build one directly and hand it to
/// [`WriteCoordinator::from_prepared`](crate::connection::WriteCoordinator::from_prepared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHead {
    header: Bytes,
    framing: Framing,
    close_after: bool,
}

impl PreparedHead {
    /// Creates a prepared head.
    ///
    /// `header` must hold the full status/request line and header block, including the blank
    /// line that ends it. `close_after` marks the transport as unusable once this message is sent.
    pub fn new(header: Bytes, framing: Framing, close_after: bool) -> Self {
        Self { header, framing, close_after }
    }

    pub fn header(&self) -> &Bytes {
        &self.header
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn close_after(&self) -> bool {
        self.close_after
    }

    pub(crate) fn into_parts(self) -> (Bytes, Framing, bool) {
        (self.header, self.framing, self.close_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_size_from_size_hint() {
        assert_eq!(PayloadSize::from(SizeHint::with_exact(0)), PayloadSize::Empty);
        assert_eq!(PayloadSize::from(SizeHint::with_exact(12)), PayloadSize::Length(12));
        assert_eq!(PayloadSize::from(SizeHint::new()), PayloadSize::Chunked);
    }

    #[test]
    fn test_framing_from_payload_size() {
        assert_eq!(Framing::from(PayloadSize::Empty), Framing::ContentLength(0));
        assert_eq!(Framing::from(PayloadSize::Length(7)), Framing::ContentLength(7));
        assert!(Framing::from(PayloadSize::Chunked).is_chunked());
    }

    #[test]
    fn test_message_head_accessors() {
        let head: MessageHead = Request::builder().version(Version::HTTP_10).body(()).unwrap().into();
        assert!(head.is_request());
        assert_eq!(head.version(), Version::HTTP_10);

        let head: MessageHead = Response::builder().header("x-id", "1").body(()).unwrap().into();
        assert!(!head.is_request());
        assert_eq!(head.headers()["x-id"], "1");
    }
}
