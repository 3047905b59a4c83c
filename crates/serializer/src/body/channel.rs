use crate::body::{BodyWriter, Produced, token_waker};
use crate::protocol::{PayloadSize, SendError, WriteBufs};
use crate::resume::ResumeToken;
use bytes::Bytes;
use futures::StreamExt;
use futures::channel::mpsc;
use std::task::{Context, Poll};
use tracing::{error, trace, warn};

type BodyItem = Result<Bytes, String>;

/// A body filled by a [`BodySender`], possibly from another thread.
///
/// `produce` drains everything queued so far. When nothing is queued the channel keeps a waker
/// holding the resume token and the writer suspends; the next `send`, `finish` or `abort` on the
/// sender resumes it.
#[derive(Debug)]
pub struct ChannelBody {
    receiver: mpsc::UnboundedReceiver<BodyItem>,
    payload_size: PayloadSize,
}

/// The producing half of a [`ChannelBody`].
///
/// Dropping the sender without calling [`BodySender::finish`] aborts the body.
#[derive(Debug)]
pub struct BodySender {
    sender: mpsc::UnboundedSender<BodyItem>,
    finished: bool,
}

impl ChannelBody {
    /// Creates a body of unknown length, sent with chunked framing.
    pub fn channel() -> (BodySender, ChannelBody) {
        Self::with_payload_size(PayloadSize::Chunked)
    }

    /// Creates a body whose total length is declared up front, sent with content-length framing.
    pub fn with_length(length: u64) -> (BodySender, ChannelBody) {
        let payload_size = if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) };
        Self::with_payload_size(payload_size)
    }

    fn with_payload_size(payload_size: PayloadSize) -> (BodySender, ChannelBody) {
        let (sender, receiver) = mpsc::unbounded();
        (BodySender { sender, finished: false }, ChannelBody { receiver, payload_size })
    }
}

impl BodyWriter for ChannelBody {
    fn size_hint(&self) -> PayloadSize {
        self.payload_size
    }

    fn produce(&mut self, token: ResumeToken) -> Result<Produced, SendError> {
        let waker = token_waker(token);
        let mut cx = Context::from_waker(&waker);

        let mut bufs = WriteBufs::new();
        loop {
            match self.receiver.poll_next_unpin(&mut cx) {
                Poll::Ready(Some(Ok(data))) => bufs.push(data),
                Poll::Ready(Some(Err(reason))) => return Err(SendError::invalid_body(reason)),
                Poll::Ready(None) => return Ok(Produced::Last(bufs)),
                Poll::Pending => break,
            }
        }

        if bufs.is_empty() {
            trace!("no body data queued, suspend");
            return Ok(Produced::Suspended);
        }
        Ok(Produced::More(bufs))
    }
}

impl BodySender {
    /// Queues a slice of body data.
    pub fn send(&mut self, data: impl Into<Bytes>) {
        if let Err(e) = self.sender.unbounded_send(Ok(data.into())) {
            warn!(cause = %e, "body receiver dropped, discard body data");
        }
    }

    /// Ends the body.
    pub fn finish(mut self) {
        self.finished = true;
    }

    /// Fails the body; the write stops with [`SendError::InvalidBody`].
    pub fn abort<S: ToString>(mut self, reason: S) {
        self.finished = true;
        // a dropped receiver has nothing left to fail
        let _ = self.sender.unbounded_send(Err(reason.to_string()));
    }
}

impl Drop for BodySender {
    fn drop(&mut self) {
        if !self.finished {
            error!("body sender dropped before the body was finished");
            let _ = self.sender.unbounded_send(Err("body sender dropped before the body was finished".to_string()));
        }
    }
}
