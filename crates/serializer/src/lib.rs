//! An HTTP/1.x message serializer with blocking and non-blocking write engines
//!
//! This crate turns HTTP requests and responses into bytes on a transport. A message head is
//! serialized once, the body is pulled slice by slice from a pluggable body writer, framed with
//! content-length or chunked encoding, and written with scatter-gather writes. The same write
//! state machine is driven either on the calling thread or as a future, and both produce the
//! same bytes in the same writes.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 requests and responses
//! - Content-Length and chunked transfer encoding, with content-length enforcement
//! - Zero-copy scatter-gather writes over [`bytes::Bytes`]
//! - Body writers that suspend until data is ready and resume through a one-shot token
//! - Blocking engine over [`std::io::Write`], non-blocking engine over tokio's `AsyncWrite`
//! - Keep-alive decision reported as a close-after-write sentinel
//!
//! # Example
//!
//! ```no_run
//! use http::{Response, StatusCode, header};
//! use micro_serializer::body::{ChannelBody, FullBody};
//! use micro_serializer::connection::MessageWriter;
//! use tokio::net::TcpStream;
//! use tracing::{error, info, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let stream = match TcpStream::connect("127.0.0.1:8080").await {
//!         Ok(stream) => stream,
//!         Err(e) => {
//!             error!(cause = %e, "connect error");
//!             return;
//!         }
//!     };
//!     let mut writer = MessageWriter::new(stream);
//!
//!     let response = Response::builder()
//!         .status(StatusCode::OK)
//!         .header(header::CONTENT_TYPE, "text/plain")
//!         .body(FullBody::from("Hello World!\r\n"))
//!         .unwrap();
//!     if let Err(e) = writer.send_response(response).await {
//!         error!(cause = %e, "send response error");
//!         return;
//!     }
//!
//!     // a body of unknown length is sent chunked, filled from another task
//!     let (mut sender, body) = ChannelBody::channel();
//!     tokio::spawn(async move {
//!         for part in ["streamed ", "response ", "body"] {
//!             sender.send(part);
//!         }
//!         sender.finish();
//!     });
//!
//!     let response = Response::builder()
//!         .header(header::CONNECTION, "close")
//!         .body(body)
//!         .unwrap();
//!     match writer.send_response(response).await {
//!         Err(e) if e.is_end_of_stream() => info!("message sent, closing connection"),
//!         Err(e) => error!(cause = %e, "send response error"),
//!         Ok(()) => info!("message sent"),
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: Message heads, framing, write buffers and errors
//! - [`codec`]: Head serialization, the message preparer and body framing
//! - [`body`]: The [`body::BodyWriter`] capability and its implementations
//! - [`resume`]: The one-shot [`ResumeToken`] a suspended body writer invokes
//! - [`connection`]: The write coordinator, both write engines and the message writers
//!
//! # Core Components
//!
//! ## Write Coordination
//!
//! [`connection::WriteCoordinator`] holds the state of one message write. Each call to
//! [`connection::WriteCoordinator::advance`] is one non-blocking step returning the buffers to
//! write next, a suspension, or completion. It never performs I/O itself.
//!
//! ## Write Engines
//!
//! [`connection::write_blocking`] drives a coordinator on the calling thread and blocks while the
//! body writer is suspended. [`connection::write_message`] returns a future that yields to the
//! executor instead and is woken when the body writer resumes.
//!
//! ## Error Handling
//!
//! All operations report [`protocol::SendError`]. Body-source and transport errors are surfaced
//! unchanged. A message that requires the connection to be closed completes with
//! [`protocol::SendError::EndOfStream`] instead of `Ok(())`.
//!
//! # Limitations
//!
//! - HTTP/1.x only (HTTP/2 and HTTP/3 are not supported)
//! - Chunk extensions and trailers are never written
//! - No request parsing or reading of any kind

pub mod body;
pub mod codec;
pub mod connection;
pub mod protocol;
pub mod resume;

pub use resume::ResumeToken;

mod utils;
pub(crate) use utils::ensure;

#[cfg(test)]
mod testing;
