use crate::body::{BodyWriter, Produced, token_waker};
use crate::protocol::{PayloadSize, SendError, WriteBufs};
use crate::resume::ResumeToken;
use bytes::Buf;
use http_body::Body;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, error};

/// Drives any [`http_body::Body`] as a body writer.
///
/// Frames are polled with a waker that invokes the resume token, so a body returning
/// `Poll::Pending` suspends the write until it wakes its waker. Trailer frames are dropped.
#[derive(Debug)]
pub struct BodyAdapter<B> {
    body: B,
}

impl<B> BodyAdapter<B> {
    pub fn new(body: B) -> Self {
        Self { body }
    }

    pub fn into_inner(self) -> B {
        self.body
    }
}

impl<B> BodyWriter for BodyAdapter<B>
where
    B: Body + Unpin,
    B::Error: Display,
{
    fn size_hint(&self) -> PayloadSize {
        self.body.size_hint().into()
    }

    fn produce(&mut self, token: ResumeToken) -> Result<Produced, SendError> {
        let waker = token_waker(token);
        let mut cx = Context::from_waker(&waker);

        loop {
            match Pin::new(&mut self.body).poll_frame(&mut cx) {
                Poll::Ready(Some(Ok(frame))) => match frame.into_data() {
                    Ok(mut data) => {
                        let bufs = WriteBufs::from(data.copy_to_bytes(data.remaining()));
                        if self.body.is_end_stream() {
                            return Ok(Produced::Last(bufs));
                        }
                        return Ok(Produced::More(bufs));
                    }
                    Err(_frame) => {
                        debug!("drop non-data frame, trailers are not supported");
                    }
                },
                Poll::Ready(Some(Err(e))) => {
                    error!(cause = %e, "resolve response body error");
                    return Err(SendError::invalid_body(format!("resolve body error: {e}")));
                }
                Poll::Ready(None) => return Ok(Produced::Last(WriteBufs::new())),
                Poll::Pending => return Ok(Produced::Suspended),
            }
        }
    }
}
