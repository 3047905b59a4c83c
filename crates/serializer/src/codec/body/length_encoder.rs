use crate::ensure;
use crate::protocol::{SendError, WriteBufs};
use tracing::error;

/// Passes body slices through unframed while holding the body to its declared
/// `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    /// bytes still expected
    length: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn encode(&mut self, bufs: WriteBufs) -> Result<WriteBufs, SendError> {
        let size = bufs.len() as u64;
        if size > self.length {
            error!(remaining = self.length, slice = size, "body exceeds declared content-length");
            return Err(SendError::invalid_body(format!(
                "body slice of {size} bytes exceeds remaining content-length {}",
                self.length
            )));
        }

        self.length -= size;
        Ok(bufs)
    }

    pub fn finish(&mut self) -> Result<(), SendError> {
        ensure!(
            self.length == 0,
            SendError::invalid_body(format!("body ended {} bytes short of declared content-length", self.length))
        );
        Ok(())
    }

    pub fn is_finish(&self) -> bool {
        self.length == 0
    }
}
