//! Body writers: the pluggable source of body data driven by the write coordinator.
//!
//! A [`BodyWriter`] is bound to one message body. The coordinator calls [`BodyWriter::init`]
//! once, then [`BodyWriter::produce`] until it returns [`Produced::Last`] or an error.
//!
//! # Implementations
//!
//! The set is closed; every body this crate writes comes from one of:
//!
//! - [`EmptyBody`]: no body at all
//! - [`FullBody`]: an in-memory body, emitted in bounded slices without copying
//! - [`ChannelBody`]: a body filled from another thread or task through a [`BodySender`]
//! - [`BodyAdapter`]: any `http_body::Body`
//!
//! # Suspension
//!
//! A writer that has no data ready keeps the [`ResumeToken`] it was handed, returns
//! [`Produced::Suspended`] and later invokes the token exactly once when data is available.
//! Writers that return data simply drop the token.

mod adapter;
mod channel;
mod full;

pub use adapter::BodyAdapter;
pub use channel::{BodySender, ChannelBody};
pub use full::{DEFAULT_MAX_SLICE, EmptyBody, FullBody};

use crate::protocol::{PayloadSize, SendError, WriteBufs};
use crate::resume::ResumeToken;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Wake, Waker};

/// The result of one successful [`BodyWriter::produce`] call.
#[derive(Debug)]
pub enum Produced {
    /// The next slice of body data; more follows in a later call.
    More(WriteBufs),
    /// The last slice of body data, possibly empty.
    Last(WriteBufs),
    /// No data is ready; the writer kept the token and will invoke it.
    Suspended,
}

/// The capability the write coordinator uses to pull body data.
pub trait BodyWriter {
    /// The size of the whole body, used to pick the message framing.
    fn size_hint(&self) -> PayloadSize;

    /// Validates and prepares the body source. Called once, before the first `produce`.
    fn init(&mut self) -> Result<(), SendError> {
        Ok(())
    }

    /// Produces the next slice of body data, or suspends.
    fn produce(&mut self, token: ResumeToken) -> Result<Produced, SendError>;
}

impl<B: BodyWriter + ?Sized> BodyWriter for Box<B> {
    fn size_hint(&self) -> PayloadSize {
        (**self).size_hint()
    }

    fn init(&mut self) -> Result<(), SendError> {
        (**self).init()
    }

    fn produce(&mut self, token: ResumeToken) -> Result<Produced, SendError> {
        (**self).produce(token)
    }
}

/// Builds a waker whose first wake invokes `token`.
///
/// Lets body writers poll futures-based sources: a `Poll::Pending` from the source becomes a
/// suspension that resumes when the source wakes its waker.
pub(crate) fn token_waker(token: ResumeToken) -> Waker {
    Waker::from(Arc::new(TokenWaker { token: Mutex::new(Some(token)) }))
}

struct TokenWaker {
    token: Mutex<Option<ResumeToken>>,
}

impl Wake for TokenWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let token = self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(token) = token {
            token.resume();
        }
    }
}
