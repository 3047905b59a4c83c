use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{Framing, SendError, WriteBufs};

/// Applies the message framing to body slices as they leave the write coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),
}

impl PayloadEncoder {
    pub fn new(framing: Framing) -> Self {
        match framing {
            Framing::ContentLength(length) => Self::fix_length(length),
            Framing::Chunked => Self::chunked(),
        }
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    /// create a fixed length `PayloadEncoder`
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthEncoder::new(size)) }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Length(encoder) => encoder.is_finish(),
            Kind::Chunked(encoder) => encoder.is_finish(),
        }
    }

    /// Frames one body slice.
    pub fn encode(&mut self, bufs: WriteBufs) -> Result<WriteBufs, SendError> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(bufs),
            Kind::Chunked(encoder) => Ok(encoder.encode(bufs)),
        }
    }

    /// Ends the body: validates the length for content-length framing, or hands out the last
    /// chunk for chunked framing.
    pub fn finish(&mut self) -> Result<Option<WriteBufs>, SendError> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.finish().map(|()| None),
            Kind::Chunked(encoder) => Ok(encoder.finish()),
        }
    }
}
