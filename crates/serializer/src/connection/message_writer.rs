use crate::body::BodyWriter;
use crate::connection::{WriteCoordinator, write_blocking, write_message};
use crate::protocol::{MessageHead, PreparedHead, SendError};
use http::{Request, Response};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Sends messages back to back over a non-blocking transport.
///
/// Each send drives the non-blocking engine to completion and flushes the transport. Once a
/// message ends with [`SendError::EndOfStream`], or fails after some of its bytes were written,
/// the writer is closed and every later send returns [`SendError::Closed`] without touching the
/// transport.
#[derive(Debug)]
pub struct MessageWriter<W> {
    writer: W,
    closed: bool,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self { writer, closed: false }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn send_response<B: BodyWriter>(&mut self, response: Response<B>) -> Result<(), SendError> {
        let (parts, body) = response.into_parts();
        self.send(Response::from_parts(parts, ()), body).await
    }

    pub async fn send_request<B: BodyWriter>(&mut self, request: Request<B>) -> Result<(), SendError> {
        let (parts, body) = request.into_parts();
        self.send(Request::from_parts(parts, ()), body).await
    }

    /// Sends a message whose head was serialized by an external preparer.
    pub async fn send_prepared<B: BodyWriter>(&mut self, prepared: PreparedHead, body: B) -> Result<(), SendError> {
        self.run(WriteCoordinator::from_prepared(prepared, body)).await
    }

    pub async fn send<B: BodyWriter>(&mut self, head: impl Into<MessageHead>, body: B) -> Result<(), SendError> {
        self.run(WriteCoordinator::new(head, body)).await
    }

    async fn run<B: BodyWriter>(&mut self, mut coordinator: WriteCoordinator<B>) -> Result<(), SendError> {
        if self.closed {
            warn!("message writer already closed, refuse to send");
            return Err(SendError::Closed);
        }

        let result = write_message(&mut self.writer, &mut coordinator).await;
        let flush = match &result {
            Ok(()) | Err(SendError::EndOfStream) => self.writer.flush().await,
            Err(_) => Ok(()),
        };

        self.closed = close_after(&result, &flush, coordinator.is_started());
        if self.closed {
            debug!("message writer closed");
        }
        flush?;
        result
    }
}

/// Sends messages back to back over a blocking transport.
///
/// Behaves like [`MessageWriter`] but drives the blocking engine on the calling thread.
#[derive(Debug)]
pub struct BlockingMessageWriter<W> {
    writer: W,
    closed: bool,
}

impl<W> BlockingMessageWriter<W>
where
    W: io::Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer, closed: false }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn send_response<B: BodyWriter>(&mut self, response: Response<B>) -> Result<(), SendError> {
        let (parts, body) = response.into_parts();
        self.send(Response::from_parts(parts, ()), body)
    }

    pub fn send_request<B: BodyWriter>(&mut self, request: Request<B>) -> Result<(), SendError> {
        let (parts, body) = request.into_parts();
        self.send(Request::from_parts(parts, ()), body)
    }

    /// Sends a message whose head was serialized by an external preparer.
    pub fn send_prepared<B: BodyWriter>(&mut self, prepared: PreparedHead, body: B) -> Result<(), SendError> {
        self.run(WriteCoordinator::from_prepared(prepared, body))
    }

    pub fn send<B: BodyWriter>(&mut self, head: impl Into<MessageHead>, body: B) -> Result<(), SendError> {
        self.run(WriteCoordinator::new(head, body))
    }

    fn run<B: BodyWriter>(&mut self, mut coordinator: WriteCoordinator<B>) -> Result<(), SendError> {
        if self.closed {
            warn!("message writer already closed, refuse to send");
            return Err(SendError::Closed);
        }

        let result = write_blocking(&mut self.writer, &mut coordinator);
        let flush = match &result {
            Ok(()) | Err(SendError::EndOfStream) => self.writer.flush(),
            Err(_) => Ok(()),
        };

        self.closed = close_after(&result, &flush, coordinator.is_started());
        if self.closed {
            debug!("message writer closed");
        }
        flush?;
        result
    }
}

/// A writer closes after the close-after-write sentinel, a failed flush, or a failure that
/// left a partial message on the transport.
fn close_after(result: &Result<(), SendError>, flush: &io::Result<()>, started: bool) -> bool {
    match result {
        Ok(()) => flush.is_err(),
        Err(SendError::EndOfStream) => true,
        Err(_) => started,
    }
}
