//! Core types shared by the write path.
//!
//! # Architecture
//!
//! - **Message** ([`message`]): what gets written
//!   - [`MessageHead`]: request or response head, built on the `http` crate types
//!   - [`PayloadSize`]: the size a body writer reports for its body
//!   - [`Framing`]: content-length or chunked, decided once per message
//!   - [`PreparedHead`]: serialized head bytes plus the framing and close decisions
//!
//! - **Buffers** ([`bufs`]): [`WriteBufs`], the owned scatter-gather sequence handed to
//!   transports
//!
//! - **Error Handling** ([`error`]): [`SendError`], including the
//!   [`SendError::EndOfStream`] close-after-write sentinel

mod message;
pub use message::Framing;
pub use message::MessageHead;
pub use message::PayloadSize;
pub use message::PreparedHead;
pub use message::RequestHead;
pub use message::ResponseHead;

mod bufs;
pub use bufs::WriteBufs;

mod error;
pub use error::SendError;
