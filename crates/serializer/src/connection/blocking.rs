//! The synchronous write engine.
//!
//! Drives a [`WriteCoordinator`] to completion on the calling thread. Transport writes block,
//! and a suspended body writer blocks the thread on a condition variable until its token is
//! invoked, typically from another thread.

use crate::body::BodyWriter;
use crate::connection::{Step, WriteCoordinator};
use crate::protocol::{SendError, WriteBufs};
use crate::resume::{ResumeToken, Signal, Status};
use bytes::Buf;
use std::io;
use std::io::{IoSlice, Write};
use std::sync::Arc;
use tracing::trace;

/// Maximum number of slices handed to one vectored write.
const MAX_IOV: usize = 64;

/// Blocking transport capability: writes every byte of `bufs` or fails.
pub trait BlockingTransport {
    fn write_bufs(&mut self, bufs: &mut WriteBufs) -> io::Result<()>;
}

impl<W: Write + ?Sized> BlockingTransport for W {
    fn write_bufs(&mut self, bufs: &mut WriteBufs) -> io::Result<()> {
        while bufs.has_remaining() {
            let mut slices = [IoSlice::new(&[]); MAX_IOV];
            let n = bufs.chunks_vectored(&mut slices);
            match self.write_vectored(&slices[..n]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(written) => bufs.advance(written),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Writes the whole message described by `coordinator` to `transport`.
///
/// # Errors
///
/// - body-source and transport errors, surfaced unchanged
/// - [`SendError::EndOfStream`] when the message was sent and the transport must be closed
/// - [`SendError::InvalidBody`] when a suspended body writer dropped its token
pub fn write_blocking<T, B>(transport: &mut T, coordinator: &mut WriteCoordinator<B>) -> Result<(), SendError>
where
    T: BlockingTransport + ?Sized,
    B: BodyWriter,
{
    loop {
        let signal = Arc::new(Signal::new());
        match coordinator.advance(ResumeToken::from_signal(&signal))? {
            Step::NeedWrite(mut bufs) => {
                if bufs.is_empty() {
                    continue;
                }
                trace!(len = bufs.len(), "blocking write");
                if let Err(e) = transport.write_bufs(&mut bufs) {
                    return Err(coordinator.fail_write(e));
                }
            }
            Step::Suspended => match signal.wait() {
                Status::Resumed => trace!("body writer resumed"),
                Status::Abandoned | Status::Pending => {
                    return Err(coordinator.fail(SendError::invalid_body("body writer dropped its resume token")));
                }
            },
            Step::Complete => return Ok(()),
        }
    }
}
