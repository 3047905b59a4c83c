//! HTTP codec module for serializing outgoing HTTP messages
//!
//! This module turns message heads into bytes and frames body slices. It performs no I/O; the
//! write engines in [`connection`](crate::connection) hand its output to a transport.
//!
//! # Architecture
//!
//! - Head handling via the `header` module:
//!   - [`HeaderEncoder`]: serializes request and status lines plus header fields
//!   - [`prepare`]: the message preparer, deciding framing and close-after-write
//!
//! - Body handling via the `body` module:
//!   - [`chunked`]: the chunk framer (`encode`, `final_chunk`)
//!   - [`PayloadEncoder`]: applies the message framing to each body slice
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use micro_serializer::codec::chunked;
//! use micro_serializer::protocol::WriteBufs;
//!
//! let framed = chunked::encode(WriteBufs::from(Bytes::from_static(b"hello")));
//! assert_eq!(framed.to_vec(), b"5\r\nhello\r\n");
//! assert_eq!(chunked::final_chunk().to_vec(), b"0\r\n\r\n");
//! ```

mod body;
mod header;

pub use body::chunked_encoder as chunked;
pub use body::{LengthEncoder, PayloadEncoder};
pub use header::{HeaderEncoder, INIT_HEADER_SIZE, prepare, should_keep_alive};
