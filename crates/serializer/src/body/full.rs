use crate::body::{BodyWriter, Produced};
use crate::protocol::{PayloadSize, SendError, WriteBufs};
use crate::resume::ResumeToken;
use bytes::Bytes;

/// Default upper bound on the slice size a [`FullBody`] emits per `produce` call.
pub const DEFAULT_MAX_SLICE: usize = 16 * 1024;

/// A message without a body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBody;

impl BodyWriter for EmptyBody {
    fn size_hint(&self) -> PayloadSize {
        PayloadSize::Empty
    }

    fn produce(&mut self, _token: ResumeToken) -> Result<Produced, SendError> {
        Ok(Produced::Last(WriteBufs::new()))
    }
}

/// An in-memory body.
///
/// The body is handed out in slices of at most `max_slice` bytes; slicing shares the
/// underlying buffer.
#[derive(Debug, Clone)]
pub struct FullBody {
    data: Bytes,
    max_slice: usize,
}

impl FullBody {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into(), max_slice: DEFAULT_MAX_SLICE }
    }

    /// Sets the largest slice emitted per `produce` call; zero is treated as one.
    #[must_use]
    pub fn with_max_slice(mut self, max_slice: usize) -> Self {
        self.max_slice = max_slice.max(1);
        self
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl BodyWriter for FullBody {
    fn size_hint(&self) -> PayloadSize {
        match self.data.len() {
            0 => PayloadSize::Empty,
            len => PayloadSize::Length(len as u64),
        }
    }

    fn produce(&mut self, _token: ResumeToken) -> Result<Produced, SendError> {
        let len = self.data.len().min(self.max_slice);
        let slice = WriteBufs::from(self.data.split_to(len));

        if self.data.is_empty() { Ok(Produced::Last(slice)) } else { Ok(Produced::More(slice)) }
    }
}

impl From<Bytes> for FullBody {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<&'static str> for FullBody {
    fn from(data: &'static str) -> Self {
        Self::new(data)
    }
}

impl From<String> for FullBody {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for FullBody {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
