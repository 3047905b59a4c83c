//! Message writing over a connection
//!
//! This module drives serialized messages onto a transport. One write state machine is shared
//! by a blocking and a non-blocking engine, so both produce the same bytes in the same writes.
//!
//! # Components
//!
//! - [`WriteCoordinator`]: per-message state machine, one non-blocking [`advance`] step at a time:
//!   - Coalesces the message head with the first body slice
//!   - Frames the body with content-length or chunked encoding
//!   - Tracks suspensions of the body writer
//!   - Reports the close-after-write decision as [`SendError::EndOfStream`]
//! - [`write_blocking`]: drives a coordinator on the calling thread over any [`BlockingTransport`]
//! - [`write_message`]: a [`WriteMessage`] future driving a coordinator over any [`AsyncTransport`]
//! - [`MessageWriter`] / [`BlockingMessageWriter`]: send messages back to back over one transport
//!
//! [`advance`]: WriteCoordinator::advance
//! [`SendError::EndOfStream`]: crate::protocol::SendError::EndOfStream

mod blocking;
mod message_writer;
mod nonblocking;
mod write_coordinator;

pub use blocking::{BlockingTransport, write_blocking};
pub use message_writer::{BlockingMessageWriter, MessageWriter};
pub use nonblocking::{AsyncTransport, WriteMessage, write_message};
pub use write_coordinator::{Phase, Step, WriteCoordinator};
