//! Chunked transfer-encoding framer, as defined in
//! [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1).
//!
//! Framing only prepends and appends small buffers around the body slices; body bytes are
//! never copied. Trailers are not supported, so the last chunk is always `0\r\n\r\n`.

use crate::protocol::WriteBufs;
use bytes::Bytes;
use tracing::trace;

const CRLF: &[u8] = b"\r\n";
const LAST_CHUNK: &[u8] = b"0\r\n\r\n";
const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Frames `bufs` as one chunk: `<hex-length>\r\n<data>\r\n`.
///
/// An empty input is still framed, which yields the same bytes as [`final_chunk`].
pub fn encode(bufs: WriteBufs) -> WriteBufs {
    let mut framed = WriteBufs::with_capacity(bufs.slice_count() + 2);
    framed.push(size_line(bufs.len()));
    framed.append(bufs);
    framed.push(Bytes::from_static(CRLF));
    framed
}

/// The zero-length chunk that terminates a chunked body.
pub fn final_chunk() -> WriteBufs {
    WriteBufs::from(LAST_CHUNK)
}

fn size_line(size: usize) -> Bytes {
    let mut line = [0u8; 2 * size_of::<usize>() + 2];
    let mut pos = line.len() - CRLF.len();
    line[pos..].copy_from_slice(CRLF);

    let mut rest = size;
    loop {
        pos -= 1;
        line[pos] = HEX_DIGITS[rest & 0xF];
        rest >>= 4;
        if rest == 0 {
            break;
        }
    }

    Bytes::copy_from_slice(&line[pos..])
}

/// Stateful chunked framer used by the [`PayloadEncoder`](super::PayloadEncoder).
///
/// Unlike [`encode`], empty slices produce nothing: a framed empty slice would terminate the
/// body early. The last chunk is handed out exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn encode(&mut self, bufs: WriteBufs) -> WriteBufs {
        if self.eof || bufs.is_empty() {
            return WriteBufs::new();
        }
        trace!(chunk_size = bufs.len(), "encode chunk");
        encode(bufs)
    }

    pub fn finish(&mut self) -> Option<WriteBufs> {
        if self.eof {
            return None;
        }
        self.eof = true;
        Some(final_chunk())
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}
