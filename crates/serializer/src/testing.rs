//! Test doubles: a scripted body writer and a recording transport.

use crate::body::{BodyWriter, Produced};
use crate::protocol::{PayloadSize, SendError, WriteBufs};
use crate::resume::ResumeToken;
use bytes::Bytes;
use std::collections::VecDeque;
use std::io;
use std::io::{IoSlice, Write};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::thread;
use std::time::Duration;
use tokio::io::AsyncWrite;

/// One step of a [`ScriptedBody`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    More(&'static [u8]),
    Last(&'static [u8]),
    /// keep the token in the parked slot until the test resumes it
    Suspend,
    /// resume the token before reporting the suspension
    SuspendInline,
    /// resume the token from another thread after a short sleep
    SuspendOnThread,
    /// drop the token without resuming it
    SuspendAndDrop,
    Fail(&'static str),
}

/// Slot holding the token of the last [`Action::Suspend`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Parked(Arc<Mutex<Option<ResumeToken>>>);

impl Parked {
    pub(crate) fn resume(&self) {
        let token = self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
        token.expect("no parked token").resume();
    }

    fn park(&self, token: ResumeToken) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }
}

/// A body writer that plays back a fixed list of actions.
#[derive(Debug)]
pub(crate) struct ScriptedBody {
    actions: VecDeque<Action>,
    size_hint: PayloadSize,
    init_error: Option<&'static str>,
    produced: usize,
    parked: Parked,
}

impl ScriptedBody {
    pub(crate) fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            size_hint: PayloadSize::Chunked,
            init_error: None,
            produced: 0,
            parked: Parked::default(),
        }
    }

    pub(crate) fn fail_init(mut self, reason: &'static str) -> Self {
        self.init_error = Some(reason);
        self
    }

    pub(crate) fn with_size_hint(mut self, size_hint: PayloadSize) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// Number of `produce` calls so far.
    pub(crate) fn produced(&self) -> usize {
        self.produced
    }

    pub(crate) fn parked(&self) -> Parked {
        self.parked.clone()
    }
}

impl BodyWriter for ScriptedBody {
    fn size_hint(&self) -> PayloadSize {
        self.size_hint
    }

    fn init(&mut self) -> Result<(), SendError> {
        match self.init_error {
            Some(reason) => Err(SendError::invalid_body(reason)),
            None => Ok(()),
        }
    }

    fn produce(&mut self, token: ResumeToken) -> Result<Produced, SendError> {
        self.produced += 1;
        let Some(action) = self.actions.pop_front() else {
            return Err(SendError::invalid_body("script exhausted"));
        };

        match action {
            Action::More(data) => Ok(Produced::More(WriteBufs::from(Bytes::from_static(data)))),
            Action::Last(data) => Ok(Produced::Last(WriteBufs::from(Bytes::from_static(data)))),
            Action::Suspend => {
                self.parked.park(token);
                Ok(Produced::Suspended)
            }
            Action::SuspendInline => {
                token.resume();
                Ok(Produced::Suspended)
            }
            Action::SuspendOnThread => {
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(5));
                    token.resume();
                });
                Ok(Produced::Suspended)
            }
            Action::SuspendAndDrop => {
                drop(token);
                Ok(Produced::Suspended)
            }
            Action::Fail(reason) => Err(SendError::invalid_body(reason)),
        }
    }
}

/// Shared view of what a [`RecordingTransport`] received.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteLog {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    flushes: Arc<AtomicUsize>,
}

impl WriteLog {
    /// Each successful write call, in order.
    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn concat(&self) -> Vec<u8> {
        self.writes().concat()
    }

    pub(crate) fn count(&self) -> usize {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    fn push(&self, write: Vec<u8>) {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).push(write);
    }
}

/// A transport that records every write call, for both engines.
#[derive(Debug)]
pub(crate) struct RecordingTransport {
    log: WriteLog,
    fail_at: Option<usize>,
    max_write: usize,
    stall: bool,
    stalled: bool,
    attempts: usize,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self { log: WriteLog::default(), fail_at: None, max_write: usize::MAX, stall: false, stalled: false, attempts: 0 }
    }

    /// Fails the write attempt with this zero-based index with `BrokenPipe`.
    pub(crate) fn fail_at(mut self, attempt: usize) -> Self {
        self.fail_at = Some(attempt);
        self
    }

    /// Accepts at most `max_write` bytes per write call.
    pub(crate) fn max_write(mut self, max_write: usize) -> Self {
        self.max_write = max_write;
        self
    }

    /// Returns `Pending` once before every non-blocking write.
    pub(crate) fn stall(mut self) -> Self {
        self.stall = true;
        self
    }

    pub(crate) fn log(&self) -> WriteLog {
        self.log.clone()
    }

    fn record(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "recording transport closed"));
        }

        let mut write = Vec::new();
        for buf in bufs {
            let take = buf.len().min(self.max_write - write.len());
            write.extend_from_slice(&buf[..take]);
            if write.len() == self.max_write {
                break;
            }
        }

        let written = write.len();
        if written > 0 {
            self.log.push(write);
        }
        Ok(written)
    }

    fn poll_record(&mut self, cx: &mut Context<'_>, bufs: &[IoSlice<'_>]) -> Poll<io::Result<usize>> {
        if self.stall {
            self.stalled = !self.stalled;
            if self.stalled {
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
        }
        Poll::Ready(self.record(bufs))
    }
}

impl Write for RecordingTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.record(&[IoSlice::new(buf)])
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        self.record(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.log.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl AsyncWrite for RecordingTransport {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.get_mut().poll_record(cx, &[IoSlice::new(buf)])
    }

    fn poll_write_vectored(self: Pin<&mut Self>, cx: &mut Context<'_>, bufs: &[IoSlice<'_>]) -> Poll<io::Result<usize>> {
        self.get_mut().poll_record(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        true
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.log.flushes.fetch_add(1, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
