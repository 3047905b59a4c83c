//! One-shot resumption handles for suspended writes.
//!
//! When a body writer has no data ready it keeps the [`ResumeToken`] it was handed and reports
//! itself suspended. Invoking the token later is the only way to resume the write. Because
//! [`ResumeToken::resume`] consumes the token it can run at most once.
//!
//! Tokens created by the write engines hold a non-owning reference to a [`Signal`]. Resuming
//! after the engine is gone is a no-op, and dropping a token without resuming it marks the
//! suspension as abandoned so the engine fails instead of waiting forever.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll, Waker};
use tracing::{trace, warn};

/// A one-shot handle that resumes a suspended write.
#[must_use = "a suspended write only resumes when its token is invoked"]
pub struct ResumeToken {
    target: Option<Target>,
}

enum Target {
    Callback(Box<dyn FnOnce() + Send>),
    Signal(Weak<Signal>),
}

impl ResumeToken {
    /// Creates a token that runs `f` when resumed.
    ///
    /// Useful to drive a [`WriteCoordinator`](crate::connection::WriteCoordinator) from a
    /// custom scheduler.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { target: Some(Target::Callback(Box::new(f))) }
    }

    /// Creates a token that does nothing when resumed.
    pub fn noop() -> Self {
        Self { target: None }
    }

    pub(crate) fn from_signal(signal: &Arc<Signal>) -> Self {
        Self { target: Some(Target::Signal(Arc::downgrade(signal))) }
    }

    /// Resumes the suspended write.
    pub fn resume(mut self) {
        match self.target.take() {
            Some(Target::Callback(f)) => f(),
            Some(Target::Signal(signal)) => match signal.upgrade() {
                Some(signal) => signal.resume(),
                None => trace!("resume token invoked after its write was dropped"),
            },
            None => {}
        }
    }
}

impl Drop for ResumeToken {
    fn drop(&mut self) {
        if let Some(Target::Signal(signal)) = self.target.take()
            && let Some(signal) = signal.upgrade()
        {
            signal.abandon();
        }
    }
}

impl fmt::Debug for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match &self.target {
            Some(Target::Callback(_)) => "callback",
            Some(Target::Signal(_)) => "signal",
            None => "noop",
        };
        f.debug_struct("ResumeToken").field("target", &target).finish()
    }
}

/// What happened to the token of a suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Pending,
    Resumed,
    /// the token was dropped without being invoked
    Abandoned,
}

#[derive(Debug)]
struct State {
    status: Status,
    waker: Option<Waker>,
}

/// Wait/notify primitive behind engine-created tokens.
///
/// The blocking engine parks on the condition variable; the non-blocking engine registers its
/// task waker, so resumption is dispatched through the executor instead of re-entering the
/// engine on the resuming thread.
#[derive(Debug)]
pub(crate) struct Signal {
    state: Mutex<State>,
    condvar: Condvar,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self { state: Mutex::new(State { status: Status::Pending, waker: None }), condvar: Condvar::new() }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resume(&self) {
        self.complete(Status::Resumed);
    }

    fn abandon(&self) {
        self.complete(Status::Abandoned);
    }

    fn complete(&self, status: Status) {
        let waker = {
            let mut state = self.lock();
            if state.status != Status::Pending {
                warn!(current = ?state.status, "suspension completed twice");
                return;
            }
            state.status = status;
            self.condvar.notify_one();
            state.waker.take()
        };

        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Blocks the calling thread until the token is resumed or abandoned.
    pub(crate) fn wait(&self) -> Status {
        let mut state = self.lock();
        while state.status == Status::Pending {
            state = self.condvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.status
    }

    /// Returns `Ready` once the token is resumed or abandoned, otherwise registers the task
    /// waker for the resumption.
    pub(crate) fn poll_resumed(&self, cx: &mut Context<'_>) -> Poll<Status> {
        let mut state = self.lock();
        match state.status {
            Status::Pending => {
                match &mut state.waker {
                    Some(waker) => waker.clone_from(cx.waker()),
                    None => state.waker = Some(cx.waker().clone()),
                }
                Poll::Pending
            }
            status => Poll::Ready(status),
        }
    }
}
