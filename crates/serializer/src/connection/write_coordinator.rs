//! The per-message write state machine shared by both write engines.
//!
//! [`WriteCoordinator::advance`] is a single non-blocking step: it never performs I/O and never
//! waits. Each call either hands back buffers to write, reports that the body writer suspended,
//! or reports that the message is complete.
//!
//! # State Transitions
//!
//! ```text
//! Init ──> SendingHeaderAndBody ──> SendingBodyOnly ──> SendingFinalChunk ──> Done
//!               │    ↺ suspend          │    ↺ suspend                         (chunked only)
//!               └──────────────┬────────┴───────────────────────────────────> Done
//!                              └──> Failed   (from any non-terminal phase)
//! ```
//!
//! The head bytes are written once, coalesced in front of the first body slice.

use crate::body::{BodyWriter, Produced};
use crate::codec::{PayloadEncoder, prepare};
use crate::protocol::{Framing, MessageHead, PreparedHead, SendError, WriteBufs};
use crate::resume::ResumeToken;
use bytes::Bytes;
use std::io;
use tracing::{debug, error, trace};

/// Where a write is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    SendingHeaderAndBody,
    SendingBodyOnly,
    SendingFinalChunk,
    Done,
    Failed,
}

/// The outcome of one successful [`WriteCoordinator::advance`] call.
#[derive(Debug)]
pub enum Step {
    /// These buffers must be fully written before the next `advance` call. May be empty, in
    /// which case there is nothing to write.
    NeedWrite(WriteBufs),
    /// The body writer kept the token; call `advance` again once it is invoked.
    Suspended,
    /// The message has been sent completely and the connection may be reused.
    Complete,
}

/// Per-message write state: framing, close-after-write flag, pending head bytes and the body
/// writer.
#[derive(Debug)]
pub struct WriteCoordinator<B> {
    /// head waiting for the message preparer, consumed at `Init`
    head: Option<MessageHead>,
    pending_header: Option<Bytes>,
    encoder: Option<PayloadEncoder>,
    framing: Option<Framing>,
    close_after: bool,
    started: bool,
    body: B,
    phase: Phase,
}

impl<B: BodyWriter> WriteCoordinator<B> {
    /// Creates a coordinator that runs the message preparer on `head` at initialization.
    pub fn new(head: impl Into<MessageHead>, body: B) -> Self {
        Self {
            head: Some(head.into()),
            pending_header: None,
            encoder: None,
            framing: None,
            close_after: false,
            started: false,
            body,
            phase: Phase::Init,
        }
    }

    /// Creates a coordinator for a head already serialized by an external preparer.
    pub fn from_prepared(prepared: PreparedHead, body: B) -> Self {
        let (header, framing, close_after) = prepared.into_parts();
        Self {
            head: None,
            pending_header: Some(header),
            encoder: Some(PayloadEncoder::new(framing)),
            framing: Some(framing),
            close_after,
            started: false,
            body,
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The framing of the message, known once the message is initialized.
    pub fn framing(&self) -> Option<Framing> {
        self.framing
    }

    /// Whether the transport must be closed after the message, known once the message is
    /// initialized.
    pub fn close_after(&self) -> bool {
        self.close_after
    }

    /// Returns true once any buffers were handed out for writing.
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    /// Runs one step of the write.
    ///
    /// `token` is handed to the body writer; it is only kept when the result is
    /// [`Step::Suspended`].
    ///
    /// # Errors
    ///
    /// - errors from the message preparer, `init` or `produce`, surfaced unchanged; the write
    ///   moves to [`Phase::Failed`]
    /// - [`SendError::EndOfStream`] once the message is complete and the connection must be
    ///   closed, instead of [`Step::Complete`]
    /// - [`SendError::Poisoned`] when called after the write failed
    pub fn advance(&mut self, token: ResumeToken) -> Result<Step, SendError> {
        match self.phase {
            Phase::Init => {
                if let Err(e) = self.initialize() {
                    return Err(self.fail(e));
                }
                self.transition(Phase::SendingHeaderAndBody);
                self.produce(token)
            }
            Phase::SendingHeaderAndBody | Phase::SendingBodyOnly => self.produce(token),
            Phase::SendingFinalChunk => {
                let last_chunk = match self.encoder.as_mut().map(PayloadEncoder::finish) {
                    Some(Ok(last_chunk)) => last_chunk.unwrap_or_default(),
                    Some(Err(e)) => return Err(self.fail(e)),
                    None => return Err(self.fail(uninitialized())),
                };
                self.transition(Phase::Done);
                Ok(self.need_write(last_chunk))
            }
            Phase::Done => {
                if self.close_after {
                    trace!("message complete, connection must be closed");
                    Err(SendError::EndOfStream)
                } else {
                    Ok(Step::Complete)
                }
            }
            Phase::Failed => Err(SendError::Poisoned),
        }
    }

    /// Records a transport write failure. No further writes happen for this message.
    pub fn fail_write(&mut self, e: io::Error) -> SendError {
        self.fail(SendError::io(e))
    }

    /// Moves the write to [`Phase::Failed`] and hands back the error.
    pub fn fail(&mut self, e: SendError) -> SendError {
        error!(phase = ?self.phase, cause = %e, "message write failed");
        self.phase = Phase::Failed;
        e
    }

    fn initialize(&mut self) -> Result<(), SendError> {
        if let Some(head) = self.head.take() {
            let prepared = prepare(head, self.body.size_hint())?;
            let (header, framing, close_after) = prepared.into_parts();
            self.pending_header = Some(header);
            self.encoder = Some(PayloadEncoder::new(framing));
            self.framing = Some(framing);
            self.close_after = close_after;
        }
        self.body.init()
    }

    fn produce(&mut self, token: ResumeToken) -> Result<Step, SendError> {
        let (bufs, last) = match self.body.produce(token) {
            Ok(Produced::More(bufs)) => (bufs, false),
            Ok(Produced::Last(bufs)) => (bufs, true),
            Ok(Produced::Suspended) => {
                trace!(phase = ?self.phase, "body writer suspended");
                return Ok(Step::Suspended);
            }
            Err(e) => return Err(self.fail(e)),
        };

        let Some(encoder) = self.encoder.as_mut() else {
            return Err(self.fail(uninitialized()));
        };
        let mut out = match encoder.encode(bufs) {
            Ok(out) => out,
            Err(e) => return Err(self.fail(e)),
        };

        let next = if !last {
            Phase::SendingBodyOnly
        } else if encoder.is_chunked() {
            Phase::SendingFinalChunk
        } else {
            match encoder.finish() {
                Ok(_) => Phase::Done,
                Err(e) => return Err(self.fail(e)),
            }
        };

        if self.phase == Phase::SendingHeaderAndBody
            && let Some(header) = self.pending_header.take()
        {
            out.push_front(header);
        }

        self.transition(next);
        Ok(self.need_write(out))
    }

    fn need_write(&mut self, bufs: WriteBufs) -> Step {
        trace!(len = bufs.len(), slices = bufs.slice_count(), "need write");
        self.started |= !bufs.is_empty();
        Step::NeedWrite(bufs)
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "write phase transition");
            self.phase = next;
        }
    }
}

fn uninitialized() -> SendError {
    SendError::invalid_head("message head was never prepared")
}
