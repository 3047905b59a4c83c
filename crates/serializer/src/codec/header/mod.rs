//! HTTP head serialization and message preparation
//!
//! # Components
//!
//! - [`HeaderEncoder`]: Encodes request and response heads to bytes
//!   - Implements standard HTTP/1.x request/status line formatting
//!   - Handles header field serialization
//!   - Manages content-length and transfer-encoding headers
//!
//! - [`prepare`]: the message preparer, turning a head and a payload size into a
//!   [`PreparedHead`](crate::protocol::PreparedHead)
//!   - Decides the framing of the body
//!   - Decides whether the connection must be closed after the message

mod header_encoder;
mod preparer;

pub use header_encoder::HeaderEncoder;
pub use header_encoder::INIT_HEADER_SIZE;
pub use preparer::{prepare, should_keep_alive};
