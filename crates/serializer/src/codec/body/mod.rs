//! HTTP body framing for outgoing payloads
//!
//! # Components
//!
//! - [`chunked_encoder`]: chunked transfer-encoding framer (`encode`, `final_chunk`)
//! - [`LengthEncoder`]: passes fixed-length payloads through and checks their length
//! - [`PayloadEncoder`]: picks one of the above from the message [`Framing`](crate::protocol::Framing)
//!
//! # Features
//!
//! - Support for chunked transfer encoding (RFC 7230)
//! - Content-Length based payload handling
//! - Zero-copy: body slices are framed by reference

pub mod chunked_encoder;
mod length_encoder;
mod payload_encoder;

pub use length_encoder::LengthEncoder;
pub use payload_encoder::PayloadEncoder;
