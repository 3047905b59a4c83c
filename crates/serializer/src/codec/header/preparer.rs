use crate::codec::header::HeaderEncoder;
use crate::protocol::{Framing, MessageHead, PayloadSize, PreparedHead, SendError};
use bytes::BytesMut;
use http::{HeaderMap, Version, header};
use tokio_util::codec::Encoder;
use tracing::{debug, error};

/// Serializes `head` and decides how its body is framed.
///
/// The framing follows `payload_size`: a known length becomes `Content-Length`, an unknown one
/// becomes `Transfer-Encoding: chunked`. The connection is closed after the message unless
/// [`should_keep_alive`] says otherwise.
///
/// # Errors
///
/// - the HTTP version is neither 1.0 nor 1.1
/// - chunked framing is requested for an HTTP/1.0 message
pub fn prepare(head: MessageHead, payload_size: PayloadSize) -> Result<PreparedHead, SendError> {
    let version = head.version();
    if payload_size.is_chunked() && version == Version::HTTP_10 {
        error!("chunked transfer-encoding requires HTTP/1.1");
        return Err(SendError::invalid_head("chunked transfer-encoding requires HTTP/1.1"));
    }

    let close_after = !should_keep_alive(version, head.headers());
    let framing = Framing::from(payload_size);

    let mut dst = BytesMut::new();
    HeaderEncoder.encode((head, payload_size), &mut dst)?;

    debug!(header_len = dst.len(), ?framing, close_after, "prepared message head");
    Ok(PreparedHead::new(dst.freeze(), framing, close_after))
}

/// Checks if a connection should be kept alive after a message with these headers.
///
/// HTTP/1.1 keeps the connection unless `Connection: close` is present, HTTP/1.0 closes it
/// unless `Connection: keep-alive` is present.
pub fn should_keep_alive(version: Version, headers: &HeaderMap) -> bool {
    if version == Version::HTTP_10 {
        connection_has(headers, "keep-alive")
    } else {
        !connection_has(headers, "close")
    }
}

fn connection_has(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|t| t.trim().eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, Request, Response};

    #[test]
    fn test_should_keep_alive() {
        let mut headers = HeaderMap::new();

        assert!(!should_keep_alive(Version::HTTP_10, &headers));
        assert!(should_keep_alive(Version::HTTP_11, &headers));

        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        assert!(!should_keep_alive(Version::HTTP_10, &headers));
        assert!(!should_keep_alive(Version::HTTP_11, &headers));

        headers.insert(header::CONNECTION, HeaderValue::from_static("Upgrade, Keep-Alive"));
        assert!(should_keep_alive(Version::HTTP_10, &headers));
        assert!(should_keep_alive(Version::HTTP_11, &headers));
    }

    #[test]
    fn test_prepare_chunked_response() {
        let head = Response::builder().body(()).unwrap();
        let prepared = prepare(head.into(), PayloadSize::Chunked).unwrap();

        assert_eq!(prepared.framing(), Framing::Chunked);
        assert!(!prepared.close_after());
        assert_eq!(&prepared.header()[..], b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n");
    }

    #[test]
    fn test_prepare_close_after() {
        let head = Response::builder().header(header::CONNECTION, "close").body(()).unwrap();
        let prepared = prepare(head.into(), PayloadSize::Length(3)).unwrap();
        assert_eq!(prepared.framing(), Framing::ContentLength(3));
        assert!(prepared.close_after());

        let head = Request::builder().version(Version::HTTP_10).uri("/").body(()).unwrap();
        let prepared = prepare(head.into(), PayloadSize::Empty).unwrap();
        assert_eq!(prepared.framing(), Framing::ContentLength(0));
        assert!(prepared.close_after());
    }

    #[test]
    fn test_prepare_rejects_chunked_http10() {
        let head = Response::builder().version(Version::HTTP_10).body(()).unwrap();
        let result = prepare(head.into(), PayloadSize::Chunked);
        assert!(matches!(result, Err(SendError::InvalidHead { .. })));
    }
}
