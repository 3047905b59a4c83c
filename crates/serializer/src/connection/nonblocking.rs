//! The asynchronous write engine.
//!
//! [`WriteMessage`] is an explicit state machine implementing [`Future`]. The executor is the
//! scheduler: every re-entry is a `poll` call, possibly on a different thread, with no stack
//! continuity between calls. A suspended body writer resumes the write by waking the task, so
//! resumption is always dispatched through the executor rather than run on the resuming thread.
//! A token invoked before the engine gets to park (for example, inside `produce`) is detected
//! on the spot and the write continues inline.

use crate::body::BodyWriter;
use crate::connection::{Step, WriteCoordinator};
use crate::protocol::{SendError, WriteBufs};
use crate::resume::{ResumeToken, Signal, Status};
use bytes::Buf;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tokio::io::AsyncWrite;
use tracing::trace;

/// Non-blocking transport capability: writes every byte of `bufs` or fails.
///
/// A `Pending` result means some bytes may have been written already; `bufs` has been advanced
/// past them and the call must be repeated once the task is woken.
pub trait AsyncTransport {
    fn poll_write_bufs(self: Pin<&mut Self>, cx: &mut Context<'_>, bufs: &mut WriteBufs) -> Poll<io::Result<()>>;
}

impl<W: AsyncWrite + ?Sized> AsyncTransport for W {
    fn poll_write_bufs(mut self: Pin<&mut Self>, cx: &mut Context<'_>, bufs: &mut WriteBufs) -> Poll<io::Result<()>> {
        while bufs.has_remaining() {
            let written = ready!(tokio_util::io::poll_write_buf(self.as_mut(), cx, bufs))?;
            if written == 0 {
                return Poll::Ready(Err(io::Error::from(io::ErrorKind::WriteZero)));
            }
        }
        Poll::Ready(Ok(()))
    }
}

/// Creates a future that writes the whole message described by `coordinator` to `transport`.
///
/// The future resolves like [`write_blocking`](super::write_blocking) returns: `Ok(())` when the
/// connection may be reused, [`SendError::EndOfStream`] when it must be closed, any other error
/// when the write failed.
pub fn write_message<'a, T, B>(transport: &'a mut T, coordinator: &'a mut WriteCoordinator<B>) -> WriteMessage<'a, T, B>
where
    T: AsyncTransport + Unpin + ?Sized,
    B: BodyWriter,
{
    WriteMessage { transport, coordinator, state: State::Advance, suspensions: 0 }
}

/// Future returned by [`write_message`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WriteMessage<'a, T: ?Sized, B> {
    transport: &'a mut T,
    coordinator: &'a mut WriteCoordinator<B>,
    state: State,
    suspensions: usize,
}

#[derive(Debug)]
enum State {
    Advance,
    Write(WriteBufs),
    Suspended(Arc<Signal>),
    Finished,
}

impl<T: ?Sized, B> WriteMessage<'_, T, B> {
    /// How many times the body writer suspended so far.
    pub fn suspensions(&self) -> usize {
        self.suspensions
    }
}

impl<T, B> Future for WriteMessage<'_, T, B>
where
    T: AsyncTransport + Unpin + ?Sized,
    B: BodyWriter,
{
    type Output = Result<(), SendError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            match &mut this.state {
                State::Advance => {
                    let signal = Arc::new(Signal::new());
                    match this.coordinator.advance(ResumeToken::from_signal(&signal)) {
                        Ok(Step::NeedWrite(bufs)) => {
                            if !bufs.is_empty() {
                                this.state = State::Write(bufs);
                            }
                        }
                        Ok(Step::Suspended) => {
                            this.suspensions += 1;
                            this.state = State::Suspended(signal);
                        }
                        Ok(Step::Complete) => {
                            this.state = State::Finished;
                            return Poll::Ready(Ok(()));
                        }
                        Err(e) => {
                            this.state = State::Finished;
                            return Poll::Ready(Err(e));
                        }
                    }
                }

                State::Write(bufs) => match Pin::new(&mut *this.transport).poll_write_bufs(cx, bufs) {
                    Poll::Ready(Ok(())) => {
                        trace!("non-blocking write complete");
                        this.state = State::Advance;
                    }
                    Poll::Ready(Err(e)) => {
                        this.state = State::Finished;
                        return Poll::Ready(Err(this.coordinator.fail_write(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                },

                State::Suspended(signal) => match signal.poll_resumed(cx) {
                    Poll::Ready(Status::Resumed) => {
                        trace!("body writer resumed");
                        this.state = State::Advance;
                    }
                    Poll::Ready(Status::Abandoned | Status::Pending) => {
                        this.state = State::Finished;
                        let e = SendError::invalid_body("body writer dropped its resume token");
                        return Poll::Ready(Err(this.coordinator.fail(e)));
                    }
                    Poll::Pending => return Poll::Pending,
                },

                State::Finished => panic!("WriteMessage polled after completion"),
            }
        }
    }
}
